//! Host-supplied ability behaviors
//!
//! Catalog files only describe numbers. What an ability actually does when
//! it fires is code registered by the host under the ability's id.

use ahash::AHashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::core::types::{AbilityId, CharacterId, TargetId};

/// Failure raised by an ability behavior while firing
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct AbilityFault(pub String);

/// Abilities currently mid-cast for a single attempt, outermost first
///
/// Created fresh for every attempt and dropped when it ends, so nothing
/// leaks between attempts or characters.
#[derive(Debug, Clone, PartialEq)]
pub struct CastScope {
    stack: Vec<AbilityId>,
}

impl CastScope {
    pub fn new(root: AbilityId) -> Self {
        Self { stack: vec![root] }
    }

    /// Scope for a cast triggered from inside this one
    pub fn nested(&self, ability: AbilityId) -> Self {
        let mut stack = self.stack.clone();
        stack.push(ability);
        Self { stack }
    }

    pub fn is_casting(&self, ability: &AbilityId) -> bool {
        self.stack.contains(ability)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Innermost ability
    pub fn current(&self) -> &AbilityId {
        // never empty: built from a root and only grows
        &self.stack[self.stack.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityId> {
        self.stack.iter()
    }
}

/// What a behavior sees about the cast it is asked to perform
#[derive(Debug, Clone, Copy)]
pub struct CastContext<'a> {
    pub caster: CharacterId,
    pub ability: &'a AbilityId,
    /// Invested level of the ability
    pub level: u32,
    pub scope: &'a CastScope,
}

/// Instant-effect ability ("skill shot")
pub trait ShotBehavior: Send + Sync {
    /// Returns whether the ability fired; `false` costs nothing
    fn cast(&self, cast: &CastContext<'_>) -> Result<bool, AbilityFault>;
}

/// Ability aimed at a resolved living target
pub trait TargetedBehavior: Send + Sync {
    fn cast(&self, cast: &CastContext<'_>, target: TargetId, ally: bool)
        -> Result<bool, AbilityFault>;
}

/// Always-on ability whose effect tracks its invested level
pub trait PassiveBehavior: Send + Sync {
    /// Start effects at `level` (login, downgrade re-apply)
    fn initialize(&self, character: CharacterId, level: u32);

    /// Effects after investing up to `level`
    fn upgrade(&self, character: CharacterId, level: u32) {
        self.initialize(character, level);
    }

    /// Remove the effects applied at `level`
    fn stop(&self, character: CharacterId, level: u32);
}

/// Registered behavior, one variant per ability category
#[derive(Clone)]
pub enum Behavior {
    Shot(Arc<dyn ShotBehavior>),
    Targeted(Arc<dyn TargetedBehavior>),
    Passive(Arc<dyn PassiveBehavior>),
}

impl std::fmt::Debug for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Behavior::Shot(_) => f.write_str("Behavior::Shot"),
            Behavior::Targeted(_) => f.write_str("Behavior::Targeted"),
            Behavior::Passive(_) => f.write_str("Behavior::Passive"),
        }
    }
}

/// Behavior used when the host registered nothing for an ability
pub struct Inert;

impl ShotBehavior for Inert {
    fn cast(&self, _cast: &CastContext<'_>) -> Result<bool, AbilityFault> {
        Ok(false)
    }
}

impl TargetedBehavior for Inert {
    fn cast(
        &self,
        _cast: &CastContext<'_>,
        _target: TargetId,
        _ally: bool,
    ) -> Result<bool, AbilityFault> {
        Ok(false)
    }
}

impl PassiveBehavior for Inert {
    fn initialize(&self, _character: CharacterId, _level: u32) {}

    fn stop(&self, _character: CharacterId, _level: u32) {}
}

/// Behaviors keyed by ability id, consumed when a catalog is built
#[derive(Default, Clone)]
pub struct BehaviorRegistry {
    behaviors: AHashMap<AbilityId, Behavior>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_shot(&mut self, ability: impl Into<AbilityId>, behavior: impl ShotBehavior + 'static) {
        self.behaviors
            .insert(ability.into(), Behavior::Shot(Arc::new(behavior)));
    }

    pub fn register_targeted(
        &mut self,
        ability: impl Into<AbilityId>,
        behavior: impl TargetedBehavior + 'static,
    ) {
        self.behaviors
            .insert(ability.into(), Behavior::Targeted(Arc::new(behavior)));
    }

    pub fn register_passive(
        &mut self,
        ability: impl Into<AbilityId>,
        behavior: impl PassiveBehavior + 'static,
    ) {
        self.behaviors
            .insert(ability.into(), Behavior::Passive(Arc::new(behavior)));
    }

    pub fn get(&self, ability: &AbilityId) -> Option<&Behavior> {
        self.behaviors.get(ability)
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_tracks_nesting() {
        let root = CastScope::new(AbilityId::new("chain"));
        assert_eq!(root.depth(), 1);
        assert_eq!(root.current(), &AbilityId::new("chain"));

        let inner = root.nested(AbilityId::new("spark"));
        assert_eq!(inner.depth(), 2);
        assert!(inner.is_casting(&AbilityId::new("chain")));
        assert!(inner.is_casting(&AbilityId::new("spark")));
        assert!(!root.is_casting(&AbilityId::new("spark")));
    }

    #[test]
    fn test_registry_lookup_is_case_insensitive() {
        let mut registry = BehaviorRegistry::new();
        registry.register_shot("Fireball", Inert);
        assert!(matches!(
            registry.get(&AbilityId::new("fireball")),
            Some(Behavior::Shot(_))
        ));
        assert_eq!(registry.len(), 1);
    }
}
