//! Event bus seam
//!
//! Vetoable publications return a [`Verdict`]: listeners may substitute the
//! proposed value or veto the operation outright. Every call site branches
//! on the verdict. Listeners must not re-enter the ledger that published.

use ahash::{AHashMap, AHashSet};

use super::status::Status;
use crate::core::types::{AbilityId, ArchetypeId, CharacterId};

/// Outcome of a vetoable publication
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict<T> {
    /// Continue with the (possibly adjusted) value
    Proceed(T),
    Vetoed,
}

impl<T> Verdict<T> {
    pub fn proceed(self) -> Option<T> {
        match self {
            Verdict::Proceed(value) => Some(value),
            Verdict::Vetoed => None,
        }
    }

    pub fn is_vetoed(&self) -> bool {
        matches!(self, Verdict::Vetoed)
    }
}

/// Kinds of vetoable publication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProposalKind {
    ExperienceGain,
    ManaUse,
    ManaGain,
    StatusApply,
    Heal,
    PreCast,
}

/// Informational events; listeners observe but cannot veto
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    LevelUp {
        levels: u32,
        level: u32,
        points: u32,
    },
    MaxLevelReached {
        level: u32,
    },
    AbilityUnlocked {
        ability: AbilityId,
    },
    AbilityUpgraded {
        ability: AbilityId,
        level: u32,
    },
    AbilityDowngraded {
        ability: AbilityId,
        level: u32,
    },
    ArchetypeChanged {
        previous: Option<ArchetypeId>,
        current: Option<ArchetypeId>,
    },
    AbilityCast {
        ability: AbilityId,
        level: u32,
    },
}

/// Third-party observers of ledger changes
///
/// Defaults proceed with the proposed value unchanged.
pub trait EventBus {
    fn experience_gain(&mut self, _character: CharacterId, amount: i64) -> Verdict<i64> {
        Verdict::Proceed(amount)
    }

    fn mana_use(&mut self, _character: CharacterId, amount: i64) -> Verdict<i64> {
        Verdict::Proceed(amount)
    }

    fn mana_gain(&mut self, _character: CharacterId, amount: i64) -> Verdict<i64> {
        Verdict::Proceed(amount)
    }

    /// Duration in seconds
    fn status_apply(&mut self, _character: CharacterId, _status: Status, seconds: f64) -> Verdict<f64> {
        Verdict::Proceed(seconds)
    }

    fn heal(&mut self, _character: CharacterId, amount: f64) -> Verdict<f64> {
        Verdict::Proceed(amount)
    }

    fn pre_cast(&mut self, _character: CharacterId, _ability: &AbilityId) -> Verdict<()> {
        Verdict::Proceed(())
    }

    fn notify(&mut self, character: CharacterId, notification: Notification);
}

/// Bus with no listeners
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBus;

impl EventBus for NullBus {
    fn notify(&mut self, _character: CharacterId, _notification: Notification) {}
}

/// Bus that records notifications and can veto or override proposals
#[derive(Debug, Default, Clone)]
pub struct RecordingBus {
    pub notifications: Vec<(CharacterId, Notification)>,
    /// Every proposal seen, vetoed or not
    pub proposals: Vec<(CharacterId, ProposalKind)>,
    vetoes: AHashSet<ProposalKind>,
    overrides: AHashMap<ProposalKind, f64>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn veto(&mut self, kind: ProposalKind) {
        self.vetoes.insert(kind);
    }

    /// Substitute the proposed amount for every proposal of `kind`
    pub fn override_amount(&mut self, kind: ProposalKind, amount: f64) {
        self.overrides.insert(kind, amount);
    }

    pub fn clear_rules(&mut self) {
        self.vetoes.clear();
        self.overrides.clear();
    }

    /// Notifications in order, without the character
    pub fn events(&self) -> Vec<&Notification> {
        self.notifications.iter().map(|(_, n)| n).collect()
    }

    pub fn count(&self, matches: impl Fn(&Notification) -> bool) -> usize {
        self.notifications.iter().filter(|(_, n)| matches(n)).count()
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
        self.proposals.clear();
    }

    fn decide(&mut self, character: CharacterId, kind: ProposalKind, amount: f64) -> Verdict<f64> {
        self.proposals.push((character, kind));
        if self.vetoes.contains(&kind) {
            return Verdict::Vetoed;
        }
        Verdict::Proceed(self.overrides.get(&kind).copied().unwrap_or(amount))
    }

    fn decide_int(&mut self, character: CharacterId, kind: ProposalKind, amount: i64) -> Verdict<i64> {
        match self.decide(character, kind, amount as f64) {
            Verdict::Proceed(v) => Verdict::Proceed(v as i64),
            Verdict::Vetoed => Verdict::Vetoed,
        }
    }
}

impl EventBus for RecordingBus {
    fn experience_gain(&mut self, character: CharacterId, amount: i64) -> Verdict<i64> {
        self.decide_int(character, ProposalKind::ExperienceGain, amount)
    }

    fn mana_use(&mut self, character: CharacterId, amount: i64) -> Verdict<i64> {
        self.decide_int(character, ProposalKind::ManaUse, amount)
    }

    fn mana_gain(&mut self, character: CharacterId, amount: i64) -> Verdict<i64> {
        self.decide_int(character, ProposalKind::ManaGain, amount)
    }

    fn status_apply(&mut self, character: CharacterId, _status: Status, seconds: f64) -> Verdict<f64> {
        self.decide(character, ProposalKind::StatusApply, seconds)
    }

    fn heal(&mut self, character: CharacterId, amount: f64) -> Verdict<f64> {
        self.decide(character, ProposalKind::Heal, amount)
    }

    fn pre_cast(&mut self, character: CharacterId, _ability: &AbilityId) -> Verdict<()> {
        match self.decide(character, ProposalKind::PreCast, 0.0) {
            Verdict::Proceed(_) => Verdict::Proceed(()),
            Verdict::Vetoed => Verdict::Vetoed,
        }
    }

    fn notify(&mut self, character: CharacterId, notification: Notification) {
        self.notifications.push((character, notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_bus_proceeds() {
        let mut bus = NullBus;
        let id = CharacterId::new();
        assert_eq!(bus.experience_gain(id, 40), Verdict::Proceed(40));
        assert_eq!(bus.pre_cast(id, &AbilityId::new("slash")), Verdict::Proceed(()));
    }

    #[test]
    fn test_recording_bus_rules() {
        let mut bus = RecordingBus::new();
        let id = CharacterId::new();
        bus.veto(ProposalKind::ManaUse);
        bus.override_amount(ProposalKind::ExperienceGain, 7.0);

        assert!(bus.mana_use(id, 5).is_vetoed());
        assert_eq!(bus.experience_gain(id, 100), Verdict::Proceed(7));
        assert_eq!(bus.mana_gain(id, 3).proceed(), Some(3));
        assert_eq!(bus.proposals.len(), 3);

        bus.clear_rules();
        assert_eq!(bus.mana_use(id, 5), Verdict::Proceed(5));
    }
}
