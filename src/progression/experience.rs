//! Experience and level-ups
//!
//! Every threshold paid out of one grant is the one for the level the grant
//! started at; the curve only moves on the next grant. A character at its
//! archetype's max level keeps no experience.

use tracing::debug;

use super::ledger::ProgressionLedger;
use crate::core::config::ProgressionConfig;
use crate::core::error::{LedgerError, Result};
use crate::services::{LedgerContext, Notification, Verdict};

impl ProgressionLedger {
    /// Experience needed to leave the current level
    pub fn required_experience(&self, config: &ProgressionConfig) -> u64 {
        config.required_experience(self.level)
    }

    pub fn exp_to_next_level(&self, config: &ProgressionConfig) -> u64 {
        self.required_experience(config)
            .saturating_sub(self.experience)
    }

    /// Add experience and apply any level-ups it pays for
    ///
    /// No-op without an archetype or when a listener vetoes the gain.
    pub fn grant_experience(&mut self, ctx: &mut LedgerContext<'_>, amount: u64) -> Result<()> {
        let catalog = ctx.catalog;
        let Some(archetype) = self.current_archetype(catalog)? else {
            return Ok(());
        };

        let proposed = amount.min(i64::MAX as u64) as i64;
        let amount = match ctx.bus.experience_gain(self.character, proposed) {
            Verdict::Proceed(amount) => amount,
            Verdict::Vetoed => return Ok(()),
        };
        self.experience = (self.experience.min(i64::MAX as u64) as i64)
            .saturating_add(amount)
            .max(0) as u64;

        if self.level >= archetype.max_level {
            self.experience = 0;
            self.refresh_level_display(ctx);
            return Ok(());
        }

        let required = ctx.config.required_experience(self.level);
        let pending = (self.experience / required).min(u32::MAX as u64) as u32;
        self.experience -= pending as u64 * required;

        if pending > 0 {
            self.level_up(ctx, pending)
        } else {
            self.refresh_level_display(ctx);
            Ok(())
        }
    }

    /// Raise the level by up to `amount`, never past the archetype's max
    pub fn level_up(&mut self, ctx: &mut LedgerContext<'_>, amount: u32) -> Result<()> {
        let catalog = ctx.catalog;
        let archetype = self
            .current_archetype(catalog)?
            .ok_or(LedgerError::NoArchetype)?;

        let amount = amount.min(archetype.max_level.saturating_sub(self.level));
        if amount == 0 {
            return Ok(());
        }

        self.level += amount;
        self.points = self
            .points
            .saturating_add(amount.saturating_mul(ctx.config.points_per_level));
        self.update_health(ctx);

        debug!(
            "{} leveled up {} time(s) to level {} ({} points)",
            self.character, amount, self.level, self.points
        );
        ctx.bus.notify(
            self.character,
            Notification::LevelUp {
                levels: amount,
                level: self.level,
                points: self.points,
            },
        );

        if self.level >= archetype.max_level {
            self.experience = 0;
            ctx.bus.notify(
                self.character,
                Notification::MaxLevelReached { level: self.level },
            );
        }

        self.refresh_level_display(ctx);
        Ok(())
    }

    /// Push level and progress to the host's level bar
    pub fn refresh_level_display(&self, ctx: &mut LedgerContext<'_>) {
        if !ctx.config.use_level_bar {
            return;
        }
        if self.archetype.is_none() {
            ctx.host.show_level(self.character, 0, 0.0);
            return;
        }
        let required = self.required_experience(ctx.config);
        let progress = (self.experience as f64 / required as f64).min(1.0) as f32;
        ctx.host.show_level(self.character, self.level, progress);
    }
}
