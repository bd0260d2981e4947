//! Archetype changes and professions
//!
//! Leaving for no archetype always wipes progression. Otherwise the policy
//! decides between a full reset and reconciling only the abilities the new
//! archetype no longer grants: their effects stop, every invested level is
//! refunded, their bindings go and then the abilities themselves.

use tracing::debug;

use super::ledger::ProgressionLedger;
use crate::catalog::{Archetype, Catalog};
use crate::core::error::{LedgerError, Result};
use crate::core::types::{AbilityId, ArchetypeId};
use crate::services::{LedgerContext, Notification};

impl ProgressionLedger {
    /// Switch to `archetype`, or to none
    ///
    /// Fails with [`LedgerError::UnknownArchetype`] before touching anything
    /// if the archetype is not in the catalog.
    pub fn set_archetype(
        &mut self,
        ctx: &mut LedgerContext<'_>,
        archetype: Option<ArchetypeId>,
    ) -> Result<()> {
        let catalog = ctx.catalog;
        let target = match &archetype {
            Some(id) => Some(
                catalog
                    .archetype(id)
                    .ok_or_else(|| LedgerError::UnknownArchetype(id.clone()))?,
            ),
            None => None,
        };
        let previous = self.archetype.take();

        let Some(target) = target else {
            self.reset_progression(ctx);
            self.mana.set(0, 0);
            ctx.host.clear_name_tag(self.character);
            self.update_health(ctx);
            self.refresh_level_display(ctx);

            debug!("{} left archetype {:?}", self.character, previous);
            ctx.bus.notify(
                self.character,
                Notification::ArchetypeChanged {
                    previous,
                    current: None,
                },
            );
            return Ok(());
        };

        if ctx.config.professions_reset {
            self.reset_progression(ctx);
        } else {
            self.drop_ungranted(catalog, target);
        }

        self.archetype = Some(target.id.clone());
        for ability in target.granted_abilities() {
            self.skills.grant(ability.clone());
        }

        let max_mana = target.mana_at(self.level);
        if previous.is_none() {
            self.mana.fill(max_mana);
        } else {
            self.mana.set(self.mana.current(), max_mana);
        }

        self.update_health(ctx);
        self.refresh_level_display(ctx);
        ctx.host.decorate_name_tag(self.character, &target.prefix);

        debug!(
            "{} changed archetype {:?} -> {}",
            self.character, previous, target.id
        );
        ctx.bus.notify(
            self.character,
            Notification::ArchetypeChanged {
                previous,
                current: Some(target.id.clone()),
            },
        );
        Ok(())
    }

    /// Whether the character may profess into `target` right now
    pub fn can_profess(&self, ctx: &LedgerContext<'_>, target: &ArchetypeId) -> bool {
        let catalog = ctx.catalog;
        let Some(target) = catalog.archetype(target) else {
            return false;
        };
        let Some(current) = self.archetype.as_ref().and_then(|id| catalog.archetype(id)) else {
            return target.is_root();
        };
        if current.profess_level < 1 {
            return false;
        }
        if !ctx.host.authorize(self.character, &target.id) {
            return false;
        }
        target.parent.as_ref() == Some(&current.id) && current.profess_level <= self.level
    }

    /// Profess into `target` if allowed; `Ok(false)` when not
    pub fn profess(&mut self, ctx: &mut LedgerContext<'_>, target: &ArchetypeId) -> Result<bool> {
        if !self.can_profess(ctx, target) {
            return Ok(false);
        }
        self.set_archetype(ctx, Some(target.clone()))?;
        Ok(true)
    }

    /// Back to level 1 with starting points and no abilities
    fn reset_progression(&mut self, ctx: &LedgerContext<'_>) {
        self.stop_passives(ctx.catalog);
        self.level = 1;
        self.points = ctx.config.starting_points;
        self.experience = 0;
        self.skills.clear();
    }

    /// Refund and remove every held ability `target` does not grant
    fn drop_ungranted(&mut self, catalog: &Catalog, target: &Archetype) {
        let mut stale: Vec<(AbilityId, u32)> = self
            .skills
            .iter()
            .filter(|(id, _)| !target.grants(id))
            .map(|(id, level)| (id.clone(), level))
            .collect();
        stale.sort();

        for (id, level) in stale {
            if let Some(ability) = catalog.ability(&id) {
                if level > 0 {
                    if let Some(passive) = ability.passive() {
                        passive.stop(self.character, level);
                    }
                }
                let refund = ability.total_cost(level);
                self.points = self.points.saturating_add(refund);
                debug!(
                    "{} loses {} (level {}), refunding {} points",
                    self.character, id, level, refund
                );
            }
            self.skills.remove(&id);
        }
    }
}
