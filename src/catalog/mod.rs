//! Archetype and ability catalogs
//!
//! Both catalogs are read-only once built and can be shared by every
//! character without synchronization.

pub mod ability;
pub mod archetype;
pub mod behavior;
pub mod loader;

pub use ability::{Ability, AbilityCatalog, AbilityKind, AbilitySpec, Category, Prerequisite};
pub use archetype::{Archetype, ArchetypeCatalog, ArchetypeSpec};
pub use behavior::{
    AbilityFault, Behavior, BehaviorRegistry, CastContext, CastScope, Inert, PassiveBehavior,
    ShotBehavior, TargetedBehavior,
};
pub use loader::{load_catalog_dir, load_catalog_file, load_catalog_str, CatalogFile};

use thiserror::Error;

use crate::core::types::{AbilityId, ArchetypeId};

/// Errors raised while loading or building catalogs
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Duplicate catalog entry: {0}")]
    Duplicate(String),

    #[error("Archetype {archetype} has unknown parent {parent}")]
    UnknownParent {
        archetype: ArchetypeId,
        parent: ArchetypeId,
    },

    #[error("Archetype inheritance cycle through {0}")]
    InheritanceCycle(ArchetypeId),

    #[error("Archetype {archetype} grants unknown ability {ability}")]
    UnknownGrantedAbility {
        archetype: ArchetypeId,
        ability: AbilityId,
    },

    #[error("Ability {ability} requires unknown ability {prerequisite}")]
    UnknownPrerequisite {
        ability: AbilityId,
        prerequisite: AbilityId,
    },

    #[error("Targeted ability {0} has no range")]
    MissingRange(AbilityId),

    #[error("Ability {ability} is {category:?} but was registered with {behavior}")]
    BehaviorMismatch {
        ability: AbilityId,
        category: Category,
        behavior: String,
    },
}

/// Both catalogs, as consulted by the ledger
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub archetypes: ArchetypeCatalog,
    pub abilities: AbilityCatalog,
}

impl Catalog {
    pub fn build(
        archetypes: Vec<ArchetypeSpec>,
        abilities: Vec<AbilitySpec>,
        behaviors: &BehaviorRegistry,
    ) -> Result<Self, CatalogError> {
        let abilities = AbilityCatalog::build(abilities, behaviors)?;
        let archetypes = ArchetypeCatalog::build(archetypes, &abilities)?;
        Ok(Self {
            archetypes,
            abilities,
        })
    }

    pub fn archetype(&self, id: &ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id)
    }

    pub fn ability(&self, id: &AbilityId) -> Option<&Ability> {
        self.abilities.get(id)
    }
}
