//! The per-character progression aggregate
//!
//! Operations live next to the engine they belong to (`experience`,
//! `mana`, `skills`, `transition`, `cast`, `vitals`, `persist`); this file
//! holds the state and its read-only queries.

use ahash::AHashMap;

use super::mana::ResourcePool;
use super::skills::SkillLedger;
use crate::catalog::{Archetype, Catalog};
use crate::core::config::ProgressionConfig;
use crate::core::error::{LedgerError, Result};
use crate::core::types::{AbilityId, ArchetypeId, CharacterId, SlotId};

/// Progression state of one character
///
/// Owned by the host's per-character command path; at most one mutation
/// runs at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionLedger {
    pub(crate) character: CharacterId,
    pub(crate) archetype: Option<ArchetypeId>,
    pub(crate) level: u32,
    pub(crate) experience: u64,
    pub(crate) points: u32,
    pub(crate) mana: ResourcePool,
    /// Additive max-health bonus; not persisted
    pub(crate) bonus_health: u32,
    pub(crate) skills: SkillLedger,
    /// Free-form counters for ability behaviors
    pub(crate) values: AHashMap<String, i64>,
}

impl ProgressionLedger {
    /// Fresh character without an archetype
    pub fn new(character: CharacterId, config: &ProgressionConfig) -> Self {
        Self {
            character,
            archetype: None,
            level: 1,
            experience: 0,
            points: config.starting_points,
            mana: ResourcePool::default(),
            bonus_health: 0,
            skills: SkillLedger::default(),
            values: AHashMap::new(),
        }
    }

    pub fn character(&self) -> CharacterId {
        self.character
    }

    pub fn archetype(&self) -> Option<&ArchetypeId> {
        self.archetype.as_ref()
    }

    pub fn has_archetype(&self) -> bool {
        self.archetype.is_some()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn mana(&self) -> u32 {
        self.mana.current()
    }

    pub fn bonus_health(&self) -> u32 {
        self.bonus_health
    }

    pub fn skills(&self) -> &SkillLedger {
        &self.skills
    }

    /// Whether the current archetype grants `ability`
    pub fn has_ability(&self, ability: &AbilityId) -> bool {
        self.skills.contains(ability)
    }

    /// Granted and invested at least once
    pub fn has_ability_unlocked(&self, ability: &AbilityId) -> bool {
        self.skills.is_unlocked(ability)
    }

    /// Invested level of a granted ability
    pub fn ability_level(&self, ability: &AbilityId) -> Result<u32> {
        self.skills
            .level(ability)
            .ok_or_else(|| LedgerError::UnknownAbility(ability.clone()))
    }

    /// Resolve the current archetype; `Ok(None)` without one
    pub fn current_archetype<'c>(&self, catalog: &'c Catalog) -> Result<Option<&'c Archetype>> {
        match &self.archetype {
            None => Ok(None),
            Some(id) => catalog
                .archetype(id)
                .map(Some)
                .ok_or_else(|| LedgerError::UnknownArchetype(id.clone())),
        }
    }

    /// Level at which the current archetype allows professing; 1 without one
    pub fn profession_level(&self, catalog: &Catalog) -> u32 {
        match self.archetype.as_ref().and_then(|id| catalog.archetype(id)) {
            Some(archetype) => archetype.profess_level,
            None => 1,
        }
    }

    // === BINDINGS ===

    /// Bind an unlocked ability to a slot, replacing whatever was there
    pub fn bind(&mut self, slot: SlotId, ability: &AbilityId) -> bool {
        self.skills.bind(slot, ability)
    }

    pub fn bound(&self, slot: &SlotId) -> Option<&AbilityId> {
        self.skills.bound(slot)
    }

    pub fn unbind(&mut self, slot: &SlotId) -> Option<AbilityId> {
        self.skills.unbind(slot)
    }

    // === DYNAMIC VALUES ===

    pub fn value(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: i64) {
        self.values.insert(key.into(), value);
    }

    /// Add to a value and return the new total
    pub fn add_value(&mut self, key: impl Into<String>, delta: i64) -> i64 {
        let entry = self.values.entry(key.into()).or_insert(0);
        *entry = entry.saturating_add(delta);
        *entry
    }

    pub fn clear_value(&mut self, key: &str) -> Option<i64> {
        self.values.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ledger_defaults() {
        let config = ProgressionConfig {
            starting_points: 3,
            ..Default::default()
        };
        let ledger = ProgressionLedger::new(CharacterId::new(), &config);
        assert!(!ledger.has_archetype());
        assert_eq!(ledger.level(), 1);
        assert_eq!(ledger.experience(), 0);
        assert_eq!(ledger.points(), 3);
        assert_eq!(ledger.mana(), 0);
        assert!(ledger.skills().is_empty());
        assert_eq!(ledger.profession_level(&Catalog::default()), 1);
    }

    #[test]
    fn test_unknown_ability_level() {
        let ledger = ProgressionLedger::new(CharacterId::new(), &ProgressionConfig::default());
        assert!(matches!(
            ledger.ability_level(&AbilityId::new("slash")),
            Err(LedgerError::UnknownAbility(_))
        ));
    }

    #[test]
    fn test_dynamic_values() {
        let mut ledger = ProgressionLedger::new(CharacterId::new(), &ProgressionConfig::default());
        assert_eq!(ledger.value("combo"), 0);
        assert_eq!(ledger.add_value("combo", 2), 2);
        assert_eq!(ledger.add_value("combo", 3), 5);
        ledger.set_value("charges", 1);
        assert_eq!(ledger.value("charges"), 1);
        assert_eq!(ledger.clear_value("combo"), Some(5));
        assert_eq!(ledger.value("combo"), 0);
    }

    #[test]
    fn test_current_archetype_unknown() {
        let mut ledger = ProgressionLedger::new(CharacterId::new(), &ProgressionConfig::default());
        assert!(ledger.current_archetype(&Catalog::default()).unwrap().is_none());
        ledger.archetype = Some(ArchetypeId::new("ghost"));
        assert!(matches!(
            ledger.current_archetype(&Catalog::default()),
            Err(LedgerError::UnknownArchetype(_))
        ));
    }
}
