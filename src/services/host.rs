//! Game host seam: permissions, health, name tags, level bar, targeting

use ahash::{AHashMap, AHashSet};

use crate::core::types::{ArchetypeId, CharacterId, TargetId};

pub trait Host {
    /// Whether the character holds the permission `archetype` demands
    fn authorize(&self, character: CharacterId, archetype: &ArchetypeId) -> bool;

    fn decorate_name_tag(&mut self, character: CharacterId, prefix: &str);

    fn clear_name_tag(&mut self, character: CharacterId);

    /// Current health; `None` while the character is not in the world
    fn health(&self, character: CharacterId) -> Option<f64>;

    fn set_health(&mut self, character: CharacterId, health: f64);

    fn set_max_health(&mut self, character: CharacterId, max_health: f64);

    /// Level bar: displayed level and progress toward the next in `[0, 1]`
    fn show_level(&mut self, character: CharacterId, level: u32, progress: f32);

    /// Nearest living entity in line of sight within `range`
    fn find_target(&self, character: CharacterId, range: f64) -> Option<TargetId>;

    fn is_ally(&self, character: CharacterId, target: TargetId) -> bool;
}

/// Host-side view of one character
#[derive(Debug, Clone, PartialEq)]
pub struct HostCharacter {
    pub health: f64,
    pub max_health: f64,
    pub name_tag: Option<String>,
    pub level_bar: (u32, f32),
}

#[derive(Debug, Clone)]
struct PlacedTarget {
    id: TargetId,
    distance: f64,
    ally: bool,
}

/// In-memory host used by tests and the demo binary
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    characters: AHashMap<CharacterId, HostCharacter>,
    permissions: AHashSet<(CharacterId, ArchetypeId)>,
    /// Grant every permission
    pub permissive: bool,
    targets: AHashMap<CharacterId, Vec<PlacedTarget>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that authorizes every profession
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Put a character in the world
    pub fn spawn(&mut self, character: CharacterId, health: f64) {
        self.characters.insert(
            character,
            HostCharacter {
                health,
                max_health: health,
                name_tag: None,
                level_bar: (0, 0.0),
            },
        );
    }

    pub fn despawn(&mut self, character: CharacterId) {
        self.characters.remove(&character);
        self.targets.remove(&character);
    }

    pub fn character(&self, character: CharacterId) -> Option<&HostCharacter> {
        self.characters.get(&character)
    }

    pub fn grant_permission(&mut self, character: CharacterId, archetype: impl Into<ArchetypeId>) {
        self.permissions.insert((character, archetype.into()));
    }

    /// Make `target` visible to `character` at `distance`
    pub fn place_target(&mut self, character: CharacterId, target: TargetId, distance: f64, ally: bool) {
        self.targets.entry(character).or_default().push(PlacedTarget {
            id: target,
            distance,
            ally,
        });
    }

    pub fn clear_targets(&mut self, character: CharacterId) {
        self.targets.remove(&character);
    }
}

impl Host for MemoryHost {
    fn authorize(&self, character: CharacterId, archetype: &ArchetypeId) -> bool {
        self.permissive || self.permissions.contains(&(character, archetype.clone()))
    }

    fn decorate_name_tag(&mut self, character: CharacterId, prefix: &str) {
        if let Some(c) = self.characters.get_mut(&character) {
            c.name_tag = Some(prefix.to_string());
        }
    }

    fn clear_name_tag(&mut self, character: CharacterId) {
        if let Some(c) = self.characters.get_mut(&character) {
            c.name_tag = None;
        }
    }

    fn health(&self, character: CharacterId) -> Option<f64> {
        self.characters.get(&character).map(|c| c.health)
    }

    fn set_health(&mut self, character: CharacterId, health: f64) {
        if let Some(c) = self.characters.get_mut(&character) {
            c.health = health;
        }
    }

    fn set_max_health(&mut self, character: CharacterId, max_health: f64) {
        if let Some(c) = self.characters.get_mut(&character) {
            c.max_health = max_health;
        }
    }

    fn show_level(&mut self, character: CharacterId, level: u32, progress: f32) {
        if let Some(c) = self.characters.get_mut(&character) {
            c.level_bar = (level, progress);
        }
    }

    fn find_target(&self, character: CharacterId, range: f64) -> Option<TargetId> {
        self.targets
            .get(&character)?
            .iter()
            .filter(|t| t.distance <= range)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map(|t| t.id)
    }

    fn is_ally(&self, character: CharacterId, target: TargetId) -> bool {
        self.targets
            .get(&character)
            .and_then(|ts| ts.iter().find(|t| t.id == target))
            .map_or(false, |t| t.ally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_nearest_in_range() {
        let mut host = MemoryHost::new();
        let id = CharacterId::new();
        host.place_target(id, TargetId(1), 12.0, false);
        host.place_target(id, TargetId(2), 6.0, true);
        host.place_target(id, TargetId(3), 9.0, false);

        assert_eq!(host.find_target(id, 5.0), None);
        assert_eq!(host.find_target(id, 10.0), Some(TargetId(2)));
        assert!(host.is_ally(id, TargetId(2)));
        assert!(!host.is_ally(id, TargetId(3)));
    }

    #[test]
    fn test_permissions() {
        let mut host = MemoryHost::new();
        let id = CharacterId::new();
        assert!(!host.authorize(id, &ArchetypeId::new("paladin")));
        host.grant_permission(id, "Paladin");
        assert!(host.authorize(id, &ArchetypeId::new("paladin")));
        assert!(MemoryHost::permissive().authorize(id, &ArchetypeId::new("any")));
    }

    #[test]
    fn test_absent_character_ignores_writes() {
        let mut host = MemoryHost::new();
        let id = CharacterId::new();
        host.set_health(id, 5.0);
        assert_eq!(host.health(id), None);
        host.spawn(id, 20.0);
        host.set_health(id, 5.0);
        assert_eq!(host.health(id), Some(5.0));
    }
}
