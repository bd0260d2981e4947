//! Ability definitions and the ability catalog

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::behavior::{
    Behavior, BehaviorRegistry, Inert, PassiveBehavior, ShotBehavior, TargetedBehavior,
};
use super::CatalogError;
use crate::core::types::AbilityId;
use crate::formula::Formula;

/// Behavioral category as written in catalog files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Shot,
    Targeted,
    Passive,
}

/// Another ability that must be invested to a minimum level first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prerequisite {
    pub ability: AbilityId,
    pub level: u32,
}

/// Ability as loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct AbilitySpec {
    pub name: String,
    pub category: Category,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    /// Skill points to invest the given level
    #[serde(default = "one")]
    pub cost: Formula,
    /// Mana spent per successful cast
    #[serde(default = "zero")]
    pub mana: Formula,
    /// Character level needed to invest the given level
    #[serde(default = "one")]
    pub level: Formula,
    /// Seconds before the ability can be cast again
    #[serde(default = "zero")]
    pub cooldown: Formula,
    /// Targeting range; targeted abilities only
    #[serde(default)]
    pub range: Option<Formula>,
    #[serde(default)]
    pub prerequisite: Option<Prerequisite>,
}

fn default_max_level() -> u32 {
    1
}

fn one() -> Formula {
    Formula::constant(1.0)
}

fn zero() -> Formula {
    Formula::constant(0.0)
}

/// Category with the fields and behavior only that category needs
#[derive(Clone)]
pub enum AbilityKind {
    Shot {
        behavior: Arc<dyn ShotBehavior>,
    },
    Targeted {
        range: Formula,
        behavior: Arc<dyn TargetedBehavior>,
    },
    Passive {
        behavior: Arc<dyn PassiveBehavior>,
    },
}

impl AbilityKind {
    pub fn category(&self) -> Category {
        match self {
            AbilityKind::Shot { .. } => Category::Shot,
            AbilityKind::Targeted { .. } => Category::Targeted,
            AbilityKind::Passive { .. } => Category::Passive,
        }
    }
}

impl std::fmt::Debug for AbilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbilityKind::Targeted { range, .. } => {
                write!(f, "Targeted {{ range: {} }}", range)
            }
            other => write!(f, "{:?}", other.category()),
        }
    }
}

/// Resolved ability
#[derive(Debug, Clone)]
pub struct Ability {
    pub id: AbilityId,
    /// Display name as written in the catalog
    pub name: String,
    pub max_level: u32,
    pub cost: Formula,
    pub mana_cost: Formula,
    pub level_requirement: Formula,
    pub cooldown: Formula,
    pub prerequisite: Option<Prerequisite>,
    pub kind: AbilityKind,
}

impl Ability {
    fn from_spec(spec: AbilitySpec, behaviors: &BehaviorRegistry) -> Result<Self, CatalogError> {
        let id = AbilityId::new(&spec.name);
        let registered = behaviors.get(&id).cloned();

        let kind = match (spec.category, registered) {
            (Category::Shot, Some(Behavior::Shot(behavior))) => AbilityKind::Shot { behavior },
            (Category::Targeted, Some(Behavior::Targeted(behavior))) => AbilityKind::Targeted {
                range: spec.range.ok_or_else(|| CatalogError::MissingRange(id.clone()))?,
                behavior,
            },
            (Category::Passive, Some(Behavior::Passive(behavior))) => {
                AbilityKind::Passive { behavior }
            }
            (category, Some(other)) => {
                return Err(CatalogError::BehaviorMismatch {
                    ability: id,
                    category,
                    behavior: format!("{:?}", other),
                })
            }
            (category, None) => {
                tracing::warn!("No behavior registered for {:?} ability '{}'", category, id);
                match category {
                    Category::Shot => AbilityKind::Shot {
                        behavior: Arc::new(Inert),
                    },
                    Category::Targeted => AbilityKind::Targeted {
                        range: spec
                            .range
                            .ok_or_else(|| CatalogError::MissingRange(id.clone()))?,
                        behavior: Arc::new(Inert),
                    },
                    Category::Passive => AbilityKind::Passive {
                        behavior: Arc::new(Inert),
                    },
                }
            }
        };

        Ok(Self {
            id,
            name: spec.name,
            max_level: spec.max_level,
            cost: spec.cost,
            mana_cost: spec.mana,
            level_requirement: spec.level,
            cooldown: spec.cooldown,
            prerequisite: spec.prerequisite,
            kind,
        })
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn is_passive(&self) -> bool {
        matches!(self.kind, AbilityKind::Passive { .. })
    }

    pub fn passive(&self) -> Option<&Arc<dyn PassiveBehavior>> {
        match &self.kind {
            AbilityKind::Passive { behavior } => Some(behavior),
            _ => None,
        }
    }

    /// Points needed to invest `level`
    pub fn cost_at(&self, level: u32) -> u32 {
        self.cost.eval_u32(level)
    }

    pub fn mana_cost_at(&self, level: u32) -> u32 {
        self.mana_cost.eval_u32(level)
    }

    /// Character level needed to invest `level`
    pub fn level_requirement_at(&self, level: u32) -> u32 {
        self.level_requirement.eval_u32(level)
    }

    /// Cooldown in seconds (fractional seconds allowed)
    pub fn cooldown_at(&self, level: u32) -> f64 {
        self.cooldown.eval(level).max(0.0)
    }

    /// Targeting range; `None` for abilities that never resolve a target
    pub fn range_at(&self, level: u32) -> Option<f64> {
        match &self.kind {
            AbilityKind::Targeted { range, .. } => Some(range.eval(level).max(0.0)),
            _ => None,
        }
    }

    /// Sum of costs for levels `1..=level`
    pub fn total_cost(&self, level: u32) -> u32 {
        (1..=level).fold(0u32, |total, l| total.saturating_add(self.cost_at(l)))
    }
}

/// Read-only registry of abilities, shared by every character
#[derive(Debug, Clone, Default)]
pub struct AbilityCatalog {
    abilities: AHashMap<AbilityId, Ability>,
}

impl AbilityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve specs against the registered behaviors
    pub fn build(specs: Vec<AbilitySpec>, behaviors: &BehaviorRegistry) -> Result<Self, CatalogError> {
        let mut abilities = AHashMap::new();
        for spec in specs {
            let ability = Ability::from_spec(spec, behaviors)?;
            if abilities.contains_key(&ability.id) {
                return Err(CatalogError::Duplicate(ability.name));
            }
            abilities.insert(ability.id.clone(), ability);
        }

        for ability in abilities.values() {
            if let Some(req) = &ability.prerequisite {
                if !abilities.contains_key(&req.ability) {
                    return Err(CatalogError::UnknownPrerequisite {
                        ability: ability.id.clone(),
                        prerequisite: req.ability.clone(),
                    });
                }
            }
        }

        Ok(Self { abilities })
    }

    pub fn get(&self, id: &AbilityId) -> Option<&Ability> {
        self.abilities.get(id)
    }

    pub fn contains(&self, id: &AbilityId) -> bool {
        self.abilities.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.values()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}
