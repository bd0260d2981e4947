//! Per-character progression
//!
//! [`ProgressionLedger`] is the aggregate; each engine adds its operations
//! to it from its own module.

pub mod cast;
pub mod experience;
pub mod ledger;
pub mod mana;
pub mod persist;
pub mod roster;
pub mod skills;
pub mod transition;
pub mod vitals;

pub use cast::{CastOutcome, Rejection};
pub use ledger::ProgressionLedger;
pub use mana::ResourcePool;
pub use persist::LedgerSnapshot;
pub use roster::Roster;
pub use skills::SkillLedger;
