//! Health and status conditions
//!
//! Health itself lives on the host; the ledger only decides the maximum
//! and applies heals through it.

use tracing::debug;

use super::ledger::ProgressionLedger;
use crate::catalog::Catalog;
use crate::core::config::ProgressionConfig;
use crate::services::{LedgerContext, Status, Verdict};

impl ProgressionLedger {
    /// Archetype health at the current level (base health without one) plus
    /// bonuses, never below 1
    pub fn max_health(&self, config: &ProgressionConfig, catalog: &Catalog) -> f64 {
        let base = self
            .archetype
            .as_ref()
            .and_then(|id| catalog.archetype(id))
            .map_or(config.base_health, |archetype| archetype.health_at(self.level));
        (base + self.bonus_health as f64).max(1.0)
    }

    /// Push max health to the host, clamping current health down to it
    ///
    /// No-op while the character is not in the world.
    pub fn update_health(&self, ctx: &mut LedgerContext<'_>) {
        let Some(health) = ctx.host.health(self.character) else {
            return;
        };
        let max = self.max_health(ctx.config, ctx.catalog);
        ctx.host.set_max_health(self.character, max);
        if health > max {
            ctx.host.set_health(self.character, max);
        }
    }

    /// Additive max-health bonus; lost on reload
    pub fn add_max_health(&mut self, ctx: &mut LedgerContext<'_>, amount: u32) {
        self.bonus_health = self.bonus_health.saturating_add(amount);
        self.update_health(ctx);
    }

    /// Drop every bonus without touching the host until the next update
    pub fn clear_health_bonuses(&mut self) {
        self.bonus_health = 0;
    }

    /// Heal (or, cursed, hurt) the character
    ///
    /// Invincible characters ignore anything that would hurt them.
    pub fn heal(&mut self, ctx: &mut LedgerContext<'_>, amount: f64) {
        let mut amount = amount;
        if self.has_status(ctx, Status::Curse) {
            amount = -amount;
        }
        if amount < 0.0 && self.has_status(ctx, Status::Invincible) {
            return;
        }
        let amount = match ctx.bus.heal(self.character, amount) {
            Verdict::Proceed(amount) => amount,
            Verdict::Vetoed => return,
        };
        let Some(health) = ctx.host.health(self.character) else {
            return;
        };
        let max = self.max_health(ctx.config, ctx.catalog);
        ctx.host
            .set_health(self.character, (health + amount).clamp(0.0, max));
    }

    // === STATUS ===

    /// Apply `status` for `seconds`; listeners may veto or change the duration
    pub fn apply_status(&self, ctx: &mut LedgerContext<'_>, status: Status, seconds: f64) {
        let seconds = match ctx.bus.status_apply(self.character, status, seconds) {
            Verdict::Proceed(seconds) => seconds,
            Verdict::Vetoed => return,
        };
        debug!("{} gains {:?} for {}s", self.character, status, seconds);
        ctx.statuses.apply(self.character, status, seconds);
    }

    pub fn remove_status(&self, ctx: &mut LedgerContext<'_>, status: Status) {
        ctx.statuses.remove(self.character, status);
    }

    pub fn has_status(&self, ctx: &LedgerContext<'_>, status: Status) -> bool {
        self.status_time_left(ctx, status) > 0
    }

    /// Whole seconds left on `status`, 0 if inactive
    pub fn status_time_left(&self, ctx: &LedgerContext<'_>, status: Status) -> u64 {
        ctx.statuses.time_remaining(self.character, status)
    }
}
