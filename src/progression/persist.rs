//! Persisted form of a ledger
//!
//! Loading reconciles the stored abilities against the archetype as the
//! catalog defines it now. Abilities it no longer grants are dropped without
//! a refund, newly granted ones start at level 0.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use super::ledger::ProgressionLedger;
use crate::catalog::Catalog;
use crate::core::config::ProgressionConfig;
use crate::core::error::Result;
use crate::core::types::{AbilityId, ArchetypeId, CharacterId, SlotId};

/// Saved progression of one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<ArchetypeId>,
    #[serde(default = "first_level")]
    pub level: u32,
    #[serde(default)]
    pub experience: u64,
    #[serde(default)]
    pub points: u32,
    /// Absent until the character first gets an archetype
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mana: Option<u32>,
    #[serde(default)]
    pub abilities: BTreeMap<AbilityId, u32>,
    #[serde(default)]
    pub bindings: BTreeMap<SlotId, AbilityId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, i64>,
}

fn first_level() -> u32 {
    1
}

impl LedgerSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl ProgressionLedger {
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            archetype: self.archetype.clone(),
            level: self.level,
            experience: self.experience,
            points: self.points,
            mana: self.archetype.as_ref().map(|_| self.mana.current()),
            abilities: self
                .skills
                .iter()
                .map(|(id, level)| (id.clone(), level))
                .collect(),
            bindings: self
                .skills
                .bindings()
                .map(|(slot, ability)| (slot.clone(), ability.clone()))
                .collect(),
            values: self
                .values
                .iter()
                .map(|(key, value)| (key.clone(), *value))
                .collect(),
        }
    }

    /// Rebuild a ledger from saved state
    ///
    /// A snapshot naming an archetype the catalog no longer has loads as a
    /// fresh character.
    pub fn hydrate(
        character: CharacterId,
        snapshot: LedgerSnapshot,
        config: &ProgressionConfig,
        catalog: &Catalog,
    ) -> Self {
        let mut ledger = Self::new(character, config);
        ledger.values = snapshot.values.into_iter().collect();

        let Some(id) = snapshot.archetype else {
            return ledger;
        };
        let Some(archetype) = catalog.archetype(&id) else {
            warn!(
                "{} was saved with unknown archetype '{}', loading without one",
                character, id
            );
            return ledger;
        };

        ledger.archetype = Some(archetype.id.clone());
        ledger.level = snapshot.level.clamp(1, archetype.max_level);
        ledger.points = snapshot.points;
        ledger.experience = if ledger.level >= archetype.max_level {
            0
        } else {
            // kept below the threshold; level-ups only come from grants
            let required = config.required_experience(ledger.level);
            snapshot.experience.min(required - 1)
        };

        for ability in archetype.granted_abilities() {
            let max_level = catalog.ability(ability).map_or(0, |a| a.max_level);
            let level = snapshot
                .abilities
                .get(ability)
                .copied()
                .unwrap_or(0)
                .min(max_level);
            ledger.skills.insert(ability.clone(), level);
        }
        for (ability, level) in &snapshot.abilities {
            if !archetype.grants(ability) {
                debug!(
                    "{} drops {} (level {}): no longer granted by {}",
                    character, ability, level, archetype.id
                );
            }
        }
        for (slot, ability) in snapshot.bindings {
            if ledger.skills.is_unlocked(&ability) {
                ledger.skills.insert_binding(slot, ability);
            }
        }

        let max_mana = archetype.mana_at(ledger.level);
        match snapshot.mana {
            Some(mana) => ledger.mana.set(mana, max_mana),
            None => ledger.mana.fill(max_mana),
        }
        ledger
    }
}
