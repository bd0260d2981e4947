//! Skill Ledger - character progression and ability cast authorization
//!
//! Tracks experience, levels, skill points, mana and invested abilities per
//! character, reconciles them across archetype changes and decides whether
//! an ability may be cast right now.

pub mod catalog;
pub mod core;
pub mod formula;
pub mod progression;
pub mod services;

pub use crate::catalog::{BehaviorRegistry, Catalog};
pub use crate::core::{
    AbilityId, ArchetypeId, CharacterId, LedgerError, ProgressionConfig, Result, SlotId, TargetId,
};
pub use crate::progression::{CastOutcome, LedgerSnapshot, ProgressionLedger, Rejection, Roster};
pub use crate::services::{LedgerContext, MemoryServices};
