//! Configuration file support for periodize.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/periodize/config.toml`.

use crate::{Error, Result, WeightUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub units: UnitsConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct UnitsConfig {
    #[serde(default)]
    pub default_unit: WeightUnit,
}

/// Defaults applied when building exercises from a template
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default = "default_use_amrap")]
    pub use_amrap: bool,

    /// Normal Linear sets target this many reps below the AMRAP target
    #[serde(default)]
    pub linear_normal_rep_offset: u32,

    #[serde(default = "default_base_sets")]
    pub linear_base_sets: u32,

    #[serde(default = "default_reps_per_set_max_sets")]
    pub reps_per_set_max_sets: u32,

    #[serde(default = "default_minimal_sets_minimum")]
    pub minimal_sets_minimum: u32,

    #[serde(default = "default_minimal_sets_maximum")]
    pub minimal_sets_maximum: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            use_amrap: default_use_amrap(),
            linear_normal_rep_offset: 0,
            linear_base_sets: default_base_sets(),
            reps_per_set_max_sets: default_reps_per_set_max_sets(),
            minimal_sets_minimum: default_minimal_sets_minimum(),
            minimal_sets_maximum: default_minimal_sets_maximum(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("periodize")
}

fn default_use_amrap() -> bool {
    true
}

fn default_base_sets() -> u32 {
    4
}

fn default_reps_per_set_max_sets() -> u32 {
    5
}

fn default_minimal_sets_minimum() -> u32 {
    2
}

fn default_minimal_sets_maximum() -> u32 {
    10
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.progression;
        if p.linear_base_sets == 0 || p.reps_per_set_max_sets == 0 {
            return Err(Error::Config("set counts must be positive".into()));
        }
        if p.minimal_sets_minimum == 0 || p.minimal_sets_minimum > p.minimal_sets_maximum {
            return Err(Error::Config(format!(
                "minimal sets bounds invalid: {}..={}",
                p.minimal_sets_minimum, p.minimal_sets_maximum
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("periodize").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.progression.use_amrap);
        assert_eq!(config.progression.linear_normal_rep_offset, 0);
        assert_eq!(config.units.default_unit, WeightUnit::Kilograms);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        let mut config = Config::default();
        config.units.default_unit = WeightUnit::Pounds;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.units.default_unit, WeightUnit::Pounds);
        assert_eq!(
            loaded.progression.reps_per_set_max_sets,
            config.progression.reps_per_set_max_sets
        );
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[progression]
linear_normal_rep_offset = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.progression.linear_normal_rep_offset, 3);
        assert_eq!(config.progression.reps_per_set_max_sets, 5); // default
        assert!(config.progression.use_amrap);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[progression]\nminimal_sets_minimum = 6\nminimal_sets_maximum = 3\n",
        )
        .unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
