//! Mana pool
//!
//! The pool only stores the current amount. The maximum comes from the
//! archetype's mana formula at the character's level and is passed in
//! whenever the pool changes.

use super::ledger::ProgressionLedger;
use crate::catalog::Catalog;
use crate::services::{LedgerContext, Verdict};

/// Current mana, kept within `[0, max]` by every mutation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourcePool {
    current: u32,
}

impl ResourcePool {
    pub fn new(current: u32) -> Self {
        Self { current }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// Apply a signed change, clamped to `[0, max]`
    pub fn apply(&mut self, delta: i64, max: u32) {
        let next = (self.current as i64).saturating_add(delta);
        self.current = next.clamp(0, max as i64) as u32;
    }

    pub fn set(&mut self, value: u32, max: u32) {
        self.current = value.min(max);
    }

    pub fn fill(&mut self, max: u32) {
        self.current = max;
    }
}

impl ProgressionLedger {
    /// 0 without an archetype, else the archetype's mana at the current level
    pub fn max_mana(&self, catalog: &Catalog) -> u32 {
        self.archetype
            .as_ref()
            .and_then(|id| catalog.archetype(id))
            .map_or(0, |archetype| archetype.mana_at(self.level))
    }

    /// Spend mana; listeners may veto or change the amount
    pub fn use_mana(&mut self, ctx: &mut LedgerContext<'_>, amount: u32) {
        let amount = match ctx.bus.mana_use(self.character, amount as i64) {
            Verdict::Proceed(amount) => amount,
            Verdict::Vetoed => return,
        };
        let max = self.max_mana(ctx.catalog);
        self.mana.apply(amount.saturating_neg(), max);
    }

    /// Regain mana; no-op without an archetype
    pub fn gain_mana(&mut self, ctx: &mut LedgerContext<'_>, amount: u32) {
        if self.archetype.is_none() {
            return;
        }
        let amount = match ctx.bus.mana_gain(self.character, amount as i64) {
            Verdict::Proceed(amount) => amount,
            Verdict::Vetoed => return,
        };
        let max = self.max_mana(ctx.catalog);
        self.mana.apply(amount, max);
    }
}
