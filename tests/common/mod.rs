//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use skill_ledger::catalog::{
    load_catalog_str, AbilityFault, CastContext, PassiveBehavior, ShotBehavior, TargetedBehavior,
};
use skill_ledger::core::types::TargetId;
use skill_ledger::services::LedgerContext;
use skill_ledger::{
    AbilityId, ArchetypeId, BehaviorRegistry, Catalog, CharacterId, MemoryServices,
    ProgressionConfig, ProgressionLedger,
};

pub const CATALOG: &str = r#"
    [[archetype]]
    name = "Warrior"
    max_level = 40
    profess_level = 10
    health = "20 + 2 * level"
    mana = "10 + level"
    abilities = ["Slash", "Bulwark", "Parry"]
    prefix = "[Warrior]"

    [[archetype]]
    name = "Knight"
    parent = "Warrior"
    max_level = 60
    health = "30 + 3 * level"
    mana = "15 + level"
    abilities = ["Charge"]

    [[archetype]]
    name = "Mage"
    max_level = 30
    profess_level = 5
    health = "16 + level"
    mana = "40 + 4 * level"
    abilities = ["Slash", "Firebolt", "Ward", "Misfire", "Surge"]

    [[archetype]]
    name = "Squire"
    max_level = 3
    health = 18
    mana = 0
    abilities = ["Slash"]

    [[ability]]
    name = "Slash"
    category = "shot"
    max_level = 5
    cost = "level"
    level = "level * 2"
    mana = 3
    cooldown = 4

    [[ability]]
    name = "Parry"
    category = "shot"
    max_level = 2
    cost = 2
    mana = 1
    cooldown = 3

    [[ability]]
    name = "Bulwark"
    category = "passive"
    max_level = 3
    cost = 1
    prerequisite = { ability = "Slash", level = 1 }

    [[ability]]
    name = "Charge"
    category = "targeted"
    max_level = 3
    cost = 1
    mana = 2
    cooldown = 6
    range = "5 + level"

    [[ability]]
    name = "Firebolt"
    category = "targeted"
    max_level = 3
    cost = 1
    mana = "5 + level"
    range = 10

    [[ability]]
    name = "Ward"
    category = "passive"
    max_level = 2
    cost = 1

    [[ability]]
    name = "Misfire"
    category = "shot"
    cost = 1
    cooldown = 2

    [[ability]]
    name = "Surge"
    category = "shot"
    cost = 1
    cooldown = 2
"#;

/// One call into a passive behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassiveCall {
    Initialize(u32),
    Upgrade(u32),
    Stop(u32),
}

/// Calls made into every logged passive, in order
#[derive(Debug, Clone, Default)]
pub struct PassiveLog(Arc<Mutex<Vec<(String, PassiveCall)>>>);

impl PassiveLog {
    pub fn calls(&self) -> Vec<(String, PassiveCall)> {
        self.0.lock().unwrap().clone()
    }

    pub fn for_ability(&self, ability: &str) -> Vec<PassiveCall> {
        self.calls()
            .into_iter()
            .filter(|(name, _)| name == ability)
            .map(|(_, call)| call)
            .collect()
    }

    pub fn stops(&self) -> usize {
        self.calls()
            .iter()
            .filter(|(_, call)| matches!(call, PassiveCall::Stop(_)))
            .count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    fn push(&self, ability: &str, call: PassiveCall) {
        self.0.lock().unwrap().push((ability.to_string(), call));
    }
}

struct LoggedPassive {
    name: &'static str,
    log: PassiveLog,
}

impl PassiveBehavior for LoggedPassive {
    fn initialize(&self, _character: CharacterId, level: u32) {
        self.log.push(self.name, PassiveCall::Initialize(level));
    }

    fn upgrade(&self, _character: CharacterId, level: u32) {
        self.log.push(self.name, PassiveCall::Upgrade(level));
    }

    fn stop(&self, _character: CharacterId, level: u32) {
        self.log.push(self.name, PassiveCall::Stop(level));
    }
}

struct Fires(bool);

impl ShotBehavior for Fires {
    fn cast(&self, _cast: &CastContext<'_>) -> Result<bool, AbilityFault> {
        Ok(self.0)
    }
}

struct Faults;

impl ShotBehavior for Faults {
    fn cast(&self, cast: &CastContext<'_>) -> Result<bool, AbilityFault> {
        Err(AbilityFault(format!("{} fizzled", cast.ability)))
    }
}

struct Panics;

impl ShotBehavior for Panics {
    fn cast(&self, _cast: &CastContext<'_>) -> Result<bool, AbilityFault> {
        panic!("surge overload");
    }
}

/// Targets hit by targeted abilities, with the ally flag they were given
#[derive(Debug, Clone, Default)]
pub struct HitLog(Arc<Mutex<Vec<(String, TargetId, bool)>>>);

impl HitLog {
    pub fn hits(&self) -> Vec<(String, TargetId, bool)> {
        self.0.lock().unwrap().clone()
    }
}

struct Strikes(HitLog);

impl TargetedBehavior for Strikes {
    fn cast(&self, cast: &CastContext<'_>, target: TargetId, ally: bool) -> Result<bool, AbilityFault> {
        assert!(cast.scope.is_casting(cast.ability));
        let HitLog(hits) = &self.0;
        hits.lock()
            .unwrap()
            .push((cast.ability.to_string(), target, ally));
        Ok(true)
    }
}

pub fn behaviors(passives: &PassiveLog, hits: &HitLog) -> BehaviorRegistry {
    let mut registry = BehaviorRegistry::new();
    registry.register_shot("slash", Fires(true));
    registry.register_shot("parry", Fires(false));
    registry.register_shot("misfire", Faults);
    registry.register_shot("surge", Panics);
    registry.register_targeted("charge", Strikes(hits.clone()));
    registry.register_targeted("firebolt", Strikes(hits.clone()));
    registry.register_passive(
        "bulwark",
        LoggedPassive {
            name: "bulwark",
            log: passives.clone(),
        },
    );
    registry.register_passive(
        "ward",
        LoggedPassive {
            name: "ward",
            log: passives.clone(),
        },
    );
    registry
}

/// Catalog, policy and in-memory services for one test
pub struct Fixture {
    pub config: ProgressionConfig,
    pub catalog: Catalog,
    pub services: MemoryServices,
    pub passives: PassiveLog,
    pub hits: HitLog,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ProgressionConfig::default())
    }

    pub fn with_config(config: ProgressionConfig) -> Self {
        let passives = PassiveLog::default();
        let hits = HitLog::default();
        let catalog = load_catalog_str(CATALOG, &behaviors(&passives, &hits)).unwrap();
        Self {
            config,
            catalog,
            services: MemoryServices::permissive(),
            passives,
            hits,
        }
    }

    pub fn ctx(&mut self) -> LedgerContext<'_> {
        self.services.context(&self.config, &self.catalog)
    }

    /// Fresh character, present in the world with 20 health
    pub fn ledger(&mut self) -> ProgressionLedger {
        let character = CharacterId::new();
        self.services.host.spawn(character, 20.0);
        ProgressionLedger::new(character, &self.config)
    }

    /// Fresh character already in `archetype`
    pub fn ledger_in(&mut self, archetype: &str) -> ProgressionLedger {
        let mut ledger = self.ledger();
        ledger
            .set_archetype(&mut self.ctx(), Some(ArchetypeId::new(archetype)))
            .unwrap();
        ledger
    }
}

pub fn id(name: &str) -> AbilityId {
    AbilityId::new(name)
}
