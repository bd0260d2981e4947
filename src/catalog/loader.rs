//! Load catalogs from TOML files
//!
//! A catalog file holds any number of `[[archetype]]` and `[[ability]]`
//! tables. A directory load merges every `.toml` file below it.

use serde::Deserialize;
use std::path::Path;

use super::{AbilitySpec, ArchetypeSpec, BehaviorRegistry, Catalog, CatalogError};

/// Raw contents of one catalog file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default, rename = "archetype")]
    pub archetypes: Vec<ArchetypeSpec>,
    #[serde(default, rename = "ability")]
    pub abilities: Vec<AbilitySpec>,
}

impl CatalogFile {
    fn merge(&mut self, other: CatalogFile) {
        self.archetypes.extend(other.archetypes);
        self.abilities.extend(other.abilities);
    }
}

/// Build a catalog from a TOML string
pub fn load_catalog_str(content: &str, behaviors: &BehaviorRegistry) -> Result<Catalog, CatalogError> {
    let file: CatalogFile = toml::from_str(content)?;
    Catalog::build(file.archetypes, file.abilities, behaviors)
}

/// Build a catalog from a single TOML file
pub fn load_catalog_file(path: &Path, behaviors: &BehaviorRegistry) -> Result<Catalog, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    load_catalog_str(&content, behaviors)
}

/// Build a catalog from every .toml file in a directory, recursively
pub fn load_catalog_dir(path: &Path, behaviors: &BehaviorRegistry) -> Result<Catalog, CatalogError> {
    let mut merged = CatalogFile::default();
    read_directory_recursive(path, &mut merged)?;
    tracing::debug!(
        "Loaded {} archetypes and {} abilities from {}",
        merged.archetypes.len(),
        merged.abilities.len(),
        path.display()
    );
    Catalog::build(merged.archetypes, merged.abilities, behaviors)
}

fn read_directory_recursive(path: &Path, merged: &mut CatalogFile) -> Result<(), CatalogError> {
    let mut entries = std::fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    // deterministic merge order
    entries.sort();

    for entry_path in entries {
        if entry_path.is_dir() {
            read_directory_recursive(&entry_path, merged)?;
        } else if entry_path.extension().map_or(false, |ext| ext == "toml") {
            let content = std::fs::read_to_string(&entry_path)?;
            let file: CatalogFile = toml::from_str(&content)?;
            merged.merge(file);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AbilityId, ArchetypeId};

    const CATALOG: &str = r#"
        [[archetype]]
        name = "Warrior"
        max_level = 40
        profess_level = 10
        health = "20 + 2 * level"
        mana = "10 + level"
        abilities = ["Slash", "Bulwark"]

        [[ability]]
        name = "Slash"
        category = "shot"
        max_level = 5
        cost = "level"
        level = "level * 2"

        [[ability]]
        name = "Bulwark"
        category = "passive"
        max_level = 3
        prerequisite = { ability = "Slash", level = 1 }
    "#;

    #[test]
    fn test_load_from_str() {
        let catalog = load_catalog_str(CATALOG, &BehaviorRegistry::new()).unwrap();
        assert_eq!(catalog.archetypes.len(), 1);
        assert_eq!(catalog.abilities.len(), 2);
        let warrior = catalog.archetype(&ArchetypeId::new("warrior")).unwrap();
        assert_eq!(warrior.max_level, 40);
        assert!(catalog
            .ability(&AbilityId::new("bulwark"))
            .unwrap()
            .is_passive());
    }

    #[test]
    fn test_load_directory_merges_files() {
        let dir = std::env::temp_dir().join(format!("skill_ledger_catalog_{}", std::process::id()));
        let nested = dir.join("abilities");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            dir.join("classes.toml"),
            "[[archetype]]\nname = \"Mage\"\nhealth = 18\nmana = 40\nabilities = [\"Spark\"]\n",
        )
        .unwrap();
        std::fs::write(
            nested.join("spark.toml"),
            "[[ability]]\nname = \"Spark\"\ncategory = \"shot\"\n",
        )
        .unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let catalog = load_catalog_dir(&dir, &BehaviorRegistry::new()).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(catalog
            .archetype(&ArchetypeId::new("mage"))
            .unwrap()
            .grants(&AbilityId::new("spark")));
    }

    #[test]
    fn test_invalid_toml() {
        let result = load_catalog_str("[[ability]]\nname = 3", &BehaviorRegistry::new());
        assert!(matches!(result, Err(CatalogError::Toml(_))));
    }
}
