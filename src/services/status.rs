//! Status and cooldown timer stores
//!
//! The ledger only asks how long a status or cooldown has left and starts
//! cooldowns after successful casts. Stores answer in whole seconds, rounded
//! up, so anything still running reports at least 1.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::core::types::{AbilityId, CharacterId};

/// Status conditions tracked per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No casting, no acting
    Stun,
    /// No casting
    Silence,
    Root,
    Disarm,
    /// Immune to damage
    Invincible,
    /// Healing hurts
    Curse,
}

pub trait StatusStore {
    /// Seconds left on `status`, 0 if inactive
    fn time_remaining(&self, character: CharacterId, status: Status) -> u64;

    fn apply(&mut self, character: CharacterId, status: Status, seconds: f64);

    fn remove(&mut self, character: CharacterId, status: Status);
}

pub trait CooldownStore {
    /// Seconds before `ability` can be cast again, 0 if ready
    fn time_remaining(&self, character: CharacterId, ability: &AbilityId) -> u64;

    fn start(&mut self, character: CharacterId, ability: &AbilityId, seconds: f64);
}

/// Expiry table on a manually advanced millisecond clock
#[derive(Debug, Clone)]
pub struct TimerTable<K: Eq + Hash> {
    now_ms: u64,
    expiries: AHashMap<(CharacterId, K), u64>,
}

impl<K: Eq + Hash> Default for TimerTable<K> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            expiries: AHashMap::new(),
        }
    }
}

impl<K: Eq + Hash> TimerTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move the clock forward and forget expired timers
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
        let now = self.now_ms;
        self.expiries.retain(|_, expiry| *expiry > now);
    }

    pub fn set(&mut self, character: CharacterId, key: K, seconds: f64) {
        let duration_ms = (seconds.max(0.0) * 1000.0).round() as u64;
        if duration_ms == 0 {
            self.expiries.remove(&(character, key));
            return;
        }
        self.expiries
            .insert((character, key), self.now_ms + duration_ms);
    }

    pub fn remaining_ms(&self, character: CharacterId, key: K) -> u64 {
        self.expiries
            .get(&(character, key))
            .map_or(0, |expiry| expiry.saturating_sub(self.now_ms))
    }

    pub fn remaining_secs(&self, character: CharacterId, key: K) -> u64 {
        self.remaining_ms(character, key).div_ceil(1000)
    }

    pub fn remove(&mut self, character: CharacterId, key: K) {
        self.expiries.remove(&(character, key));
    }

    /// Drop every timer of a character
    pub fn forget(&mut self, character: CharacterId) {
        self.expiries.retain(|(c, _), _| *c != character);
    }
}

/// In-memory status store
#[derive(Debug, Clone, Default)]
pub struct MemoryStatusStore {
    timers: TimerTable<Status>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ms: u64) {
        self.timers.advance(ms);
    }

    pub fn forget(&mut self, character: CharacterId) {
        self.timers.forget(character);
    }
}

impl StatusStore for MemoryStatusStore {
    fn time_remaining(&self, character: CharacterId, status: Status) -> u64 {
        self.timers.remaining_secs(character, status)
    }

    fn apply(&mut self, character: CharacterId, status: Status, seconds: f64) {
        self.timers.set(character, status, seconds);
    }

    fn remove(&mut self, character: CharacterId, status: Status) {
        self.timers.remove(character, status);
    }
}

/// In-memory cooldown store
#[derive(Debug, Clone, Default)]
pub struct MemoryCooldownStore {
    timers: TimerTable<AbilityId>,
}

impl MemoryCooldownStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ms: u64) {
        self.timers.advance(ms);
    }

    pub fn forget(&mut self, character: CharacterId) {
        self.timers.forget(character);
    }
}

impl CooldownStore for MemoryCooldownStore {
    fn time_remaining(&self, character: CharacterId, ability: &AbilityId) -> u64 {
        self.timers.remaining_secs(character, ability.clone())
    }

    fn start(&mut self, character: CharacterId, ability: &AbilityId, seconds: f64) {
        self.timers.set(character, ability.clone(), seconds);
    }
}
