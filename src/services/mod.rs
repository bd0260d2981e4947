//! External collaborators the ledger talks to
//!
//! The ledger never owns these. Each operation borrows them through a
//! [`LedgerContext`] for the duration of the call.

pub mod events;
pub mod host;
pub mod status;

pub use events::{EventBus, Notification, NullBus, ProposalKind, RecordingBus, Verdict};
pub use host::{Host, HostCharacter, MemoryHost};
pub use status::{
    CooldownStore, MemoryCooldownStore, MemoryStatusStore, Status, StatusStore, TimerTable,
};

use crate::catalog::Catalog;
use crate::core::config::ProgressionConfig;
use crate::core::types::CharacterId;

/// Everything a ledger operation may consult or drive
pub struct LedgerContext<'a> {
    pub config: &'a ProgressionConfig,
    pub catalog: &'a Catalog,
    pub bus: &'a mut dyn EventBus,
    pub host: &'a mut dyn Host,
    pub statuses: &'a mut dyn StatusStore,
    pub cooldowns: &'a mut dyn CooldownStore,
}

/// In-memory collaborators bundled together
#[derive(Debug, Default)]
pub struct MemoryServices {
    pub bus: RecordingBus,
    pub host: MemoryHost,
    pub statuses: MemoryStatusStore,
    pub cooldowns: MemoryCooldownStore,
}

impl MemoryServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Services whose host authorizes every profession
    pub fn permissive() -> Self {
        Self {
            host: MemoryHost::permissive(),
            ..Self::default()
        }
    }

    pub fn context<'a>(
        &'a mut self,
        config: &'a ProgressionConfig,
        catalog: &'a Catalog,
    ) -> LedgerContext<'a> {
        LedgerContext {
            config,
            catalog,
            bus: &mut self.bus,
            host: &mut self.host,
            statuses: &mut self.statuses,
            cooldowns: &mut self.cooldowns,
        }
    }

    /// Advance status and cooldown clocks together
    pub fn advance(&mut self, ms: u64) {
        self.statuses.advance(ms);
        self.cooldowns.advance(ms);
    }

    /// Drop host and timer state of a character leaving the session
    pub fn forget(&mut self, character: CharacterId) {
        self.host.despawn(character);
        self.statuses.forget(character);
        self.cooldowns.forget(character);
    }
}
