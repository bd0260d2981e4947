//! Archetype (class) definitions and the archetype catalog
//!
//! Parent chains are flattened when the catalog is built: every archetype
//! carries the full set of abilities it grants, its own plus every ancestor's.

use ahash::{AHashMap, AHashSet};
use serde::Deserialize;

use super::ability::AbilityCatalog;
use super::CatalogError;
use crate::core::types::{AbilityId, ArchetypeId};
use crate::formula::Formula;

/// Archetype as loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ArchetypeSpec {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    /// Level at which characters of this archetype may profess into a child;
    /// 0 means the archetype has no further professions
    #[serde(default)]
    pub profess_level: u32,
    pub health: Formula,
    pub mana: Formula,
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Name tag decoration; defaults to the name
    #[serde(default)]
    pub prefix: Option<String>,
}

fn default_max_level() -> u32 {
    50
}

/// Resolved archetype
#[derive(Debug, Clone)]
pub struct Archetype {
    pub id: ArchetypeId,
    pub name: String,
    pub parent: Option<ArchetypeId>,
    pub max_level: u32,
    pub profess_level: u32,
    pub health: Formula,
    pub mana: Formula,
    pub prefix: String,
    /// Granted abilities, own first then inherited, without duplicates
    granted: Vec<AbilityId>,
    granted_set: AHashSet<AbilityId>,
}

impl Archetype {
    /// Max health at `level`
    pub fn health_at(&self, level: u32) -> f64 {
        self.health.eval(level)
    }

    /// Max mana at `level`, truncated toward zero and never negative
    pub fn mana_at(&self, level: u32) -> u32 {
        self.mana.eval_u32(level)
    }

    pub fn grants(&self, ability: &AbilityId) -> bool {
        self.granted_set.contains(ability)
    }

    pub fn granted_abilities(&self) -> &[AbilityId] {
        &self.granted
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Read-only registry of archetypes, shared by every character
#[derive(Debug, Clone, Default)]
pub struct ArchetypeCatalog {
    archetypes: AHashMap<ArchetypeId, Archetype>,
}

impl ArchetypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve specs, flattening parent chains
    ///
    /// Every granted ability must exist in `abilities`.
    pub fn build(specs: Vec<ArchetypeSpec>, abilities: &AbilityCatalog) -> Result<Self, CatalogError> {
        let mut by_id: AHashMap<ArchetypeId, ArchetypeSpec> = AHashMap::new();
        for spec in specs {
            let id = ArchetypeId::new(&spec.name);
            if by_id.contains_key(&id) {
                return Err(CatalogError::Duplicate(spec.name));
            }
            for ability in &spec.abilities {
                let ability_id = AbilityId::new(ability);
                if !abilities.contains(&ability_id) {
                    return Err(CatalogError::UnknownGrantedAbility {
                        archetype: id,
                        ability: ability_id,
                    });
                }
            }
            by_id.insert(id, spec);
        }

        let mut archetypes = AHashMap::new();
        for (id, spec) in &by_id {
            let (granted, granted_set) = flatten_abilities(id, &by_id)?;
            archetypes.insert(
                id.clone(),
                Archetype {
                    id: id.clone(),
                    name: spec.name.clone(),
                    parent: spec.parent.as_deref().map(ArchetypeId::new),
                    max_level: spec.max_level.max(1),
                    profess_level: spec.profess_level,
                    health: spec.health.clone(),
                    mana: spec.mana.clone(),
                    prefix: spec.prefix.clone().unwrap_or_else(|| spec.name.clone()),
                    granted,
                    granted_set,
                },
            );
        }

        Ok(Self { archetypes })
    }

    pub fn get(&self, id: &ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id)
    }

    pub fn contains(&self, id: &ArchetypeId) -> bool {
        self.archetypes.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.values()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

/// Walk the parent chain collecting abilities
fn flatten_abilities(
    start: &ArchetypeId,
    specs: &AHashMap<ArchetypeId, ArchetypeSpec>,
) -> Result<(Vec<AbilityId>, AHashSet<AbilityId>), CatalogError> {
    let mut granted = Vec::new();
    let mut granted_set = AHashSet::new();
    let mut visited = AHashSet::new();
    let mut current = Some(start.clone());

    while let Some(id) = current {
        if !visited.insert(id.clone()) {
            return Err(CatalogError::InheritanceCycle(start.clone()));
        }
        let spec = specs.get(&id).ok_or_else(|| CatalogError::UnknownParent {
            archetype: start.clone(),
            parent: id.clone(),
        })?;
        for ability in &spec.abilities {
            let ability = AbilityId::new(ability);
            if granted_set.insert(ability.clone()) {
                granted.push(ability);
            }
        }
        current = spec.parent.as_deref().map(ArchetypeId::new);
    }

    Ok((granted, granted_set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ability::AbilitySpec;
    use crate::catalog::BehaviorRegistry;

    fn abilities(names: &[&str]) -> AbilityCatalog {
        let specs = names
            .iter()
            .map(|n| {
                toml::from_str::<AbilitySpec>(&format!("name = \"{}\"\ncategory = \"shot\"", n))
                    .unwrap()
            })
            .collect();
        AbilityCatalog::build(specs, &BehaviorRegistry::new()).unwrap()
    }

    fn archetype(src: &str) -> ArchetypeSpec {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn test_inheritance_is_flattened() {
        let catalog = ArchetypeCatalog::build(
            vec![
                archetype(
                    r#"
                    name = "Warrior"
                    health = "20 + level"
                    mana = 10
                    profess_level = 10
                    abilities = ["Slash"]
                    "#,
                ),
                archetype(
                    r#"
                    name = "Berserker"
                    parent = "warrior"
                    health = "30 + level * 2"
                    mana = 5
                    abilities = ["Rage", "Slash"]
                    "#,
                ),
            ],
            &abilities(&["Slash", "Rage"]),
        )
        .unwrap();

        let berserker = catalog.get(&ArchetypeId::new("Berserker")).unwrap();
        assert_eq!(
            berserker.granted_abilities(),
            &[AbilityId::new("rage"), AbilityId::new("slash")]
        );
        assert_eq!(berserker.parent, Some(ArchetypeId::new("Warrior")));
        assert!(!berserker.is_root());
        assert_eq!(berserker.prefix, "Berserker");
        assert_eq!(berserker.health_at(5), 40.0);

        let warrior = catalog.get(&ArchetypeId::new("warrior")).unwrap();
        assert!(warrior.grants(&AbilityId::new("Slash")));
        assert!(!warrior.grants(&AbilityId::new("Rage")));
        assert_eq!(warrior.max_level, 50);
    }

    #[test]
    fn test_mana_truncates() {
        let catalog = ArchetypeCatalog::build(
            vec![archetype(
                r#"
                name = "Mage"
                health = 20
                mana = "10 + level * 2.5"
                "#,
            )],
            &abilities(&[]),
        )
        .unwrap();
        let mage = catalog.get(&ArchetypeId::new("mage")).unwrap();
        assert_eq!(mage.mana_at(1), 12);
        assert_eq!(mage.mana_at(3), 17);
    }

    #[test]
    fn test_cycle_detected() {
        let result = ArchetypeCatalog::build(
            vec![
                archetype("name = \"A\"\nparent = \"B\"\nhealth = 1\nmana = 1"),
                archetype("name = \"B\"\nparent = \"A\"\nhealth = 1\nmana = 1"),
            ],
            &abilities(&[]),
        );
        assert!(matches!(result, Err(CatalogError::InheritanceCycle(_))));
    }

    #[test]
    fn test_unknown_parent() {
        let result = ArchetypeCatalog::build(
            vec![archetype("name = \"A\"\nparent = \"Ghost\"\nhealth = 1\nmana = 1")],
            &abilities(&[]),
        );
        assert!(matches!(result, Err(CatalogError::UnknownParent { .. })));
    }

    #[test]
    fn test_unknown_granted_ability() {
        let result = ArchetypeCatalog::build(
            vec![archetype(
                "name = \"A\"\nhealth = 1\nmana = 1\nabilities = [\"Nope\"]",
            )],
            &abilities(&["Slash"]),
        );
        assert!(matches!(
            result,
            Err(CatalogError::UnknownGrantedAbility { .. })
        ));
    }
}
