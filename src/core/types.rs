//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable external identifier of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity picked by target resolution (player, mob, anything living)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

macro_rules! name_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Names are case-insensitive; the id keeps the lowercase form
            pub fn new(name: impl AsRef<str>) -> Self {
                Self(name.as_ref().trim().to_lowercase())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self::new(name)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

name_id! {
    /// Archetype (class / profession) identifier
    ArchetypeId
}

name_id! {
    /// Ability (skill) identifier
    AbilityId
}

name_id! {
    /// Bindable slot (hotbar key, held item material, ...)
    SlotId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_case_insensitive() {
        assert_eq!(AbilityId::new("Fire Ball"), AbilityId::new("fire ball"));
        assert_eq!(ArchetypeId::new(" Warrior "), ArchetypeId::from("WARRIOR"));
        assert_eq!(AbilityId::new("Slash").as_str(), "slash");
    }

    #[test]
    fn test_id_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<SlotId, &str> = HashMap::new();
        map.insert(SlotId::new("Stick"), "slash");
        assert_eq!(map.get(&SlotId::new("stick")), Some(&"slash"));
    }

    #[test]
    fn test_id_serde_normalizes() {
        let id: AbilityId = serde_json::from_str("\"Heal\"").unwrap();
        assert_eq!(id, AbilityId::new("heal"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"heal\"");
    }

    #[test]
    fn test_character_ids_unique() {
        assert_ne!(CharacterId::new(), CharacterId::new());
    }
}
