//! Cast authorization
//!
//! An attempt runs an ordered list of checks where the first failing one
//! ends it: stun, silence, unlocked, cooldown, mana. Only then is the
//! behavior consulted, and only a behavior that actually fired starts the
//! cooldown and spends mana.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use super::ledger::ProgressionLedger;
use crate::catalog::{Ability, AbilityFault, AbilityKind, CastContext, CastScope};
use crate::core::error::{LedgerError, Result};
use crate::core::types::{AbilityId, SlotId};
use crate::services::{LedgerContext, Notification, Status};

/// Why a cast attempt was refused, with what the player needs to be told
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Stunned { remaining: u64 },
    Silenced { remaining: u64 },
    /// Not held, or held without any points invested
    NotUnlocked,
    OnCooldown { remaining: u64 },
    InsufficientMana { missing: u32, current: u32, cost: u32 },
}

/// Result of a cast attempt
///
/// Only [`CastOutcome::Cast`] changes state: the cooldown starts and mana is
/// spent. Every other outcome leaves the ledger and the timers untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    Cast,
    /// The behavior chose not to fire
    Declined,
    /// A pre-cast listener vetoed the attempt
    Vetoed,
    /// The behavior failed or panicked
    Faulted,
    /// No eligible target in range
    NoTarget,
    Rejected(Rejection),
}

impl CastOutcome {
    pub fn is_cast(&self) -> bool {
        matches!(self, CastOutcome::Cast)
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            CastOutcome::Rejected(rejection) => Some(*rejection),
            _ => None,
        }
    }
}

impl ProgressionLedger {
    /// Attempt to cast `ability_id`
    ///
    /// Errors only on caller mistakes: an ability missing from the catalog,
    /// or a passive ability.
    pub fn cast(&mut self, ctx: &mut LedgerContext<'_>, ability_id: &AbilityId) -> Result<CastOutcome> {
        let catalog = ctx.catalog;
        let ability = catalog
            .ability(ability_id)
            .ok_or_else(|| LedgerError::UnknownAbility(ability_id.clone()))?;

        if let Some(rejection) = self.check_cast(ctx, ability) {
            debug!("{} cannot cast {}: {:?}", self.character, ability_id, rejection);
            return Ok(CastOutcome::Rejected(rejection));
        }
        let level = self.skills.level(ability_id).unwrap_or(0);

        let outcome = match &ability.kind {
            AbilityKind::Passive { .. } => {
                return Err(LedgerError::NotCastable(ability_id.clone()));
            }
            AbilityKind::Shot { behavior } => {
                self.fire(ctx, ability, level, |cast| behavior.cast(cast))
            }
            AbilityKind::Targeted { range, behavior } => {
                let range = range.eval(level).max(0.0);
                let Some(target) = ctx.host.find_target(self.character, range) else {
                    debug!("{} found no target for {} within {}", self.character, ability_id, range);
                    return Ok(CastOutcome::NoTarget);
                };
                let ally = ctx.host.is_ally(self.character, target);
                self.fire(ctx, ability, level, |cast| behavior.cast(cast, target, ally))
            }
        };
        Ok(outcome)
    }

    /// Cast whatever is bound to `slot`; `None` when nothing is
    pub fn cast_slot(&mut self, ctx: &mut LedgerContext<'_>, slot: &SlotId) -> Result<Option<CastOutcome>> {
        let Some(ability) = self.skills.bound(slot).cloned() else {
            return Ok(None);
        };
        self.cast(ctx, &ability).map(Some)
    }

    fn check_cast(&self, ctx: &LedgerContext<'_>, ability: &Ability) -> Option<Rejection> {
        let stunned = ctx.statuses.time_remaining(self.character, Status::Stun);
        if stunned > 0 {
            return Some(Rejection::Stunned { remaining: stunned });
        }
        let silenced = ctx.statuses.time_remaining(self.character, Status::Silence);
        if silenced > 0 {
            return Some(Rejection::Silenced { remaining: silenced });
        }

        let level = self.skills.level(&ability.id).unwrap_or(0);
        if level == 0 {
            return Some(Rejection::NotUnlocked);
        }

        let cooldown = ctx.cooldowns.time_remaining(self.character, &ability.id);
        if cooldown > 0 {
            return Some(Rejection::OnCooldown { remaining: cooldown });
        }

        if ctx.config.mana_enabled {
            let cost = ability.mana_cost_at(level);
            let current = self.mana.current();
            if current < cost {
                return Some(Rejection::InsufficientMana {
                    missing: cost - current,
                    current,
                    cost,
                });
            }
        }
        None
    }

    /// Pre-cast publication, the behavior itself, then charging on success
    fn fire<F>(&mut self, ctx: &mut LedgerContext<'_>, ability: &Ability, level: u32, invoke: F) -> CastOutcome
    where
        F: FnOnce(&CastContext<'_>) -> std::result::Result<bool, AbilityFault>,
    {
        let scope = CastScope::new(ability.id.clone());
        if ctx.bus.pre_cast(self.character, &ability.id).is_vetoed() {
            debug!("{} cast of {} vetoed", self.character, ability.id);
            return CastOutcome::Vetoed;
        }

        let cast = CastContext {
            caster: self.character,
            ability: &ability.id,
            level,
            scope: &scope,
        };
        match panic::catch_unwind(AssertUnwindSafe(|| invoke(&cast))) {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => return CastOutcome::Declined,
            Ok(Err(fault)) => {
                error!("Ability {} failed for {}: {}", ability.id, self.character, fault);
                return CastOutcome::Faulted;
            }
            Err(payload) => {
                error!(
                    "Ability {} panicked for {}: {}",
                    ability.id,
                    self.character,
                    panic_message(payload.as_ref())
                );
                return CastOutcome::Faulted;
            }
        }

        ctx.cooldowns
            .start(self.character, &ability.id, ability.cooldown_at(level));
        if ctx.config.mana_enabled {
            self.use_mana(ctx, ability.mana_cost_at(level));
        }

        debug!("{} cast {} at level {}", self.character, ability.id, level);
        ctx.bus.notify(
            self.character,
            Notification::AbilityCast {
                ability: ability.id.clone(),
                level,
            },
        );
        CastOutcome::Cast
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
