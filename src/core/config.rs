//! Progression policy configuration
//!
//! Global knobs consulted by the ledger. The per-archetype and per-ability
//! numbers live in the catalogs; everything here applies to every character.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{LedgerError, Result};
use crate::formula::Formula;

/// Configuration for the progression ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    // === POINTS ===
    /// Skill points a fresh (or reset) character starts with
    pub starting_points: u32,

    /// Skill points granted per level gained
    pub points_per_level: u32,

    // === PROFESSIONS ===
    /// Full reset of level, points and abilities on every archetype change
    ///
    /// When false, a transition only refunds and removes the abilities the
    /// new archetype no longer grants.
    pub professions_reset: bool,

    // === RESOURCES ===
    /// Whether casts are gated on and consume mana
    pub mana_enabled: bool,

    /// Max health of a character without an archetype
    pub base_health: f64,

    // === DISPLAY ===
    /// Push level and experience progress to the host's level bar
    pub use_level_bar: bool,

    // === EXPERIENCE ===
    /// Experience needed to advance from `level` to `level + 1`
    ///
    /// Results below 1 are treated as 1.
    pub required_experience: Formula,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            starting_points: 1,
            points_per_level: 2,
            professions_reset: false,
            mana_enabled: true,
            base_health: 20.0,
            use_level_bar: true,
            required_experience: Formula::parse("100 + 25 * level ^ 2")
                .unwrap_or_else(|_| Formula::constant(100.0)),
        }
    }
}

impl ProgressionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate().map_err(LedgerError::Config)?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Experience needed at `level`, never below 1
    pub fn required_experience(&self, level: u32) -> u64 {
        self.required_experience.eval_int(level).max(1) as u64
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.base_health <= 0.0 {
            return Err(format!("base_health ({}) must be positive", self.base_health));
        }

        if let Err(e) = self.required_experience.try_eval(1) {
            return Err(format!(
                "required_experience '{}' does not evaluate at level 1: {}",
                self.required_experience, e
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(ProgressionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ProgressionConfig::from_toml_str(
            r#"
            starting_points = 5
            professions_reset = true
            required_experience = "50 * level"
            "#,
        )
        .unwrap();
        assert_eq!(config.starting_points, 5);
        assert!(config.professions_reset);
        assert_eq!(config.points_per_level, 2);
        assert_eq!(config.required_experience(3), 150);
    }

    #[test]
    fn test_required_experience_floor() {
        let config = ProgressionConfig {
            required_experience: Formula::parse("level - 10").unwrap(),
            ..Default::default()
        };
        assert_eq!(config.required_experience(1), 1);
        assert_eq!(config.required_experience(15), 5);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ProgressionConfig::from_toml_str("base_health = 0").is_err());
        assert!(ProgressionConfig::from_toml_str("required_experience = \"1 / (level - 1)\"").is_err());
        assert!(ProgressionConfig::from_toml_str("starting_points = \"lots\"").is_err());
    }
}
