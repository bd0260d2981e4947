use thiserror::Error;

use crate::catalog::CatalogError;
use crate::core::types::{AbilityId, ArchetypeId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Unknown ability: {0}")]
    UnknownAbility(AbilityId),

    #[error("Unknown archetype: {0}")]
    UnknownArchetype(ArchetypeId),

    #[error("Character has no archetype")]
    NoArchetype,

    #[error("Ability cannot be cast directly: {0}")]
    NotCastable(AbilityId),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
