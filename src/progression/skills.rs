//! Invested ability levels, slot bindings, and point spending

use ahash::AHashMap;
use tracing::debug;

use super::ledger::ProgressionLedger;
use crate::catalog::Catalog;
use crate::core::types::{AbilityId, SlotId};
use crate::services::{LedgerContext, Notification};

/// Abilities granted by the current archetype and the slots bound to them
///
/// A binding always points at an ability invested at least once; taking the
/// last point out of an ability drops its bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillLedger {
    levels: AHashMap<AbilityId, u32>,
    bindings: AHashMap<SlotId, AbilityId>,
}

impl SkillLedger {
    /// Invested level, `None` if not granted
    pub fn level(&self, ability: &AbilityId) -> Option<u32> {
        self.levels.get(ability).copied()
    }

    pub fn contains(&self, ability: &AbilityId) -> bool {
        self.levels.contains_key(ability)
    }

    pub fn is_unlocked(&self, ability: &AbilityId) -> bool {
        self.level(ability).map_or(false, |level| level > 0)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AbilityId, u32)> {
        self.levels.iter().map(|(id, level)| (id, *level))
    }

    /// Abilities with at least one point, sorted by id
    pub fn invested(&self) -> Vec<(AbilityId, u32)> {
        let mut invested: Vec<_> = self
            .levels
            .iter()
            .filter(|(_, level)| **level > 0)
            .map(|(id, level)| (id.clone(), *level))
            .collect();
        invested.sort();
        invested
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&SlotId, &AbilityId)> {
        self.bindings.iter()
    }

    pub fn bound(&self, slot: &SlotId) -> Option<&AbilityId> {
        self.bindings.get(slot)
    }

    /// Bind `ability` to `slot`; refused unless the ability is unlocked
    pub fn bind(&mut self, slot: SlotId, ability: &AbilityId) -> bool {
        if !self.is_unlocked(ability) {
            return false;
        }
        self.bindings.insert(slot, ability.clone());
        true
    }

    pub fn unbind(&mut self, slot: &SlotId) -> Option<AbilityId> {
        self.bindings.remove(slot)
    }

    /// Drop every binding to `ability`, returning how many there were
    pub(crate) fn unbind_ability(&mut self, ability: &AbilityId) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|_, bound| bound != ability);
        before - self.bindings.len()
    }

    /// Make `ability` available at level 0 unless already present
    pub(crate) fn grant(&mut self, ability: AbilityId) {
        self.levels.entry(ability).or_insert(0);
    }

    pub(crate) fn set_level(&mut self, ability: &AbilityId, level: u32) {
        if let Some(current) = self.levels.get_mut(ability) {
            *current = level;
        }
        if level == 0 {
            self.unbind_ability(ability);
        }
    }

    /// Remove a granted ability and its bindings
    pub(crate) fn remove(&mut self, ability: &AbilityId) -> Option<u32> {
        self.unbind_ability(ability);
        self.levels.remove(ability)
    }

    pub(crate) fn insert(&mut self, ability: AbilityId, level: u32) {
        self.levels.insert(ability, level);
    }

    pub(crate) fn insert_binding(&mut self, slot: SlotId, ability: AbilityId) {
        self.bindings.insert(slot, ability);
    }

    pub(crate) fn clear(&mut self) {
        self.levels.clear();
        self.bindings.clear();
    }
}

impl ProgressionLedger {
    /// Invest one point level into `ability`
    ///
    /// Returns `false` and changes nothing unless the ability is granted,
    /// below its max level, allowed at the character's level, affordable and
    /// its prerequisite is met.
    pub fn upgrade(&mut self, ctx: &mut LedgerContext<'_>, ability_id: &AbilityId) -> bool {
        let catalog = ctx.catalog;
        let Some(current) = self.skills.level(ability_id) else {
            return false;
        };
        let Some(ability) = catalog.ability(ability_id) else {
            return false;
        };
        if current >= ability.max_level {
            return false;
        }
        let next = current + 1;
        if self.level < ability.level_requirement_at(next) {
            return false;
        }
        let cost = ability.cost_at(next);
        if self.points < cost {
            return false;
        }
        if let Some(req) = &ability.prerequisite {
            if self.skills.level(&req.ability).unwrap_or(0) < req.level {
                return false;
            }
        }

        // passive effects are applied before the points are taken
        if let Some(passive) = ability.passive() {
            passive.upgrade(self.character, next);
        }
        self.points -= cost;
        self.skills.set_level(ability_id, next);

        debug!(
            "{} upgraded {} to level {} for {} points",
            self.character, ability_id, next, cost
        );
        if current == 0 {
            ctx.bus.notify(
                self.character,
                Notification::AbilityUnlocked {
                    ability: ability_id.clone(),
                },
            );
        }
        ctx.bus.notify(
            self.character,
            Notification::AbilityUpgraded {
                ability: ability_id.clone(),
                level: next,
            },
        );
        true
    }

    /// Take one level out of `ability` and refund its cost
    pub fn downgrade(&mut self, ctx: &mut LedgerContext<'_>, ability_id: &AbilityId) -> bool {
        let catalog = ctx.catalog;
        let Some(current) = self.skills.level(ability_id) else {
            return false;
        };
        if current == 0 {
            return false;
        }
        let Some(ability) = catalog.ability(ability_id) else {
            return false;
        };

        let next = current - 1;
        if let Some(passive) = ability.passive() {
            passive.stop(self.character, current);
            if next > 0 {
                passive.initialize(self.character, next);
            }
        }
        let refund = ability.cost_at(current);
        self.points = self.points.saturating_add(refund);
        self.skills.set_level(ability_id, next);

        debug!(
            "{} downgraded {} to level {}, refunding {} points",
            self.character, ability_id, next, refund
        );
        ctx.bus.notify(
            self.character,
            Notification::AbilityDowngraded {
                ability: ability_id.clone(),
                level: next,
            },
        );
        true
    }

    /// Start every invested passive at its level (e.g. on login)
    pub fn start_passives(&self, catalog: &Catalog) {
        for (id, level) in self.skills.invested() {
            if let Some(passive) = catalog.ability(&id).and_then(|a| a.passive()) {
                passive.initialize(self.character, level);
            }
        }
    }

    /// Stop every invested passive
    pub fn stop_passives(&self, catalog: &Catalog) {
        for (id, level) in self.skills.invested() {
            if let Some(passive) = catalog.ability(&id).and_then(|a| a.passive()) {
                passive.stop(self.character, level);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_requires_unlocked() {
        let mut skills = SkillLedger::default();
        let slash = AbilityId::new("slash");
        skills.grant(slash.clone());
        assert!(!skills.bind(SlotId::new("stick"), &slash));

        skills.set_level(&slash, 1);
        assert!(skills.bind(SlotId::new("stick"), &slash));
        assert_eq!(skills.bound(&SlotId::new("stick")), Some(&slash));
    }

    #[test]
    fn test_zero_level_drops_bindings() {
        let mut skills = SkillLedger::default();
        let slash = AbilityId::new("slash");
        skills.insert(slash.clone(), 2);
        skills.bind(SlotId::new("a"), &slash);
        skills.bind(SlotId::new("b"), &slash);

        skills.set_level(&slash, 1);
        assert_eq!(skills.bindings().count(), 2);
        skills.set_level(&slash, 0);
        assert_eq!(skills.bindings().count(), 0);
    }

    #[test]
    fn test_grant_keeps_existing_level() {
        let mut skills = SkillLedger::default();
        let slash = AbilityId::new("slash");
        skills.insert(slash.clone(), 3);
        skills.grant(slash.clone());
        assert_eq!(skills.level(&slash), Some(3));
        skills.grant(AbilityId::new("parry"));
        assert_eq!(skills.level(&AbilityId::new("parry")), Some(0));
    }

    #[test]
    fn test_remove_unbinds() {
        let mut skills = SkillLedger::default();
        let slash = AbilityId::new("slash");
        skills.insert(slash.clone(), 1);
        skills.bind(SlotId::new("a"), &slash);
        assert_eq!(skills.remove(&slash), Some(1));
        assert!(skills.bound(&SlotId::new("a")).is_none());
        assert!(!skills.contains(&slash));
    }

    #[test]
    fn test_invested_sorted() {
        let mut skills = SkillLedger::default();
        skills.insert(AbilityId::new("b"), 1);
        skills.insert(AbilityId::new("a"), 2);
        skills.insert(AbilityId::new("c"), 0);
        assert_eq!(
            skills.invested(),
            vec![(AbilityId::new("a"), 2), (AbilityId::new("b"), 1)]
        );
    }
}
