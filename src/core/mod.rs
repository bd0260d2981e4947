pub mod config;
pub mod error;
pub mod types;

pub use config::ProgressionConfig;
pub use error::{LedgerError, Result};
pub use types::{AbilityId, ArchetypeId, CharacterId, SlotId, TargetId};
