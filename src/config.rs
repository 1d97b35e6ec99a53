//! Runtime configuration
//!
//! Layered with figment, later layers winning:
//! - built-in defaults
//! - an optional TOML file
//! - `SKIRMISH_*` environment variables (`__` separates nested keys,
//!   e.g. `SKIRMISH_RULES__POISON_CHANCE=25`)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{CombatRules, Item, ItemCatalog};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    Missing(PathBuf),

    #[error("invalid configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for a combat run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dice seed; a random one is drawn when unset
    pub seed: Option<u64>,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Stop a fight that has not ended after this many rounds
    pub max_rounds: u32,
    pub rules: CombatRules,
    /// Extra catalog entries, replacing built-in items with the same id
    pub items: Vec<Item>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            log_filter: "skirmish=info".to_string(),
            log_json: false,
            max_rounds: 100,
            rules: CombatRules::default(),
            items: Vec::new(),
        }
    }
}

impl Config {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("SKIRMISH_").split("__"));
        Self::from_figment(&figment)
    }

    /// Extract and validate from an already-built figment
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.poison_chance > 100 {
            return Err(ConfigError::Invalid(format!(
                "rules.poison_chance must be at most 100, got {}",
                self.rules.poison_chance
            )));
        }
        if self.rules.poison_duration == 0 {
            return Err(ConfigError::Invalid("rules.poison_duration must be positive".into()));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::Invalid("max_rounds must be positive".into()));
        }
        if let Some(item) = self.items.iter().find(|item| item.id.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("item '{}' has an empty id", item.name)));
        }
        Ok(())
    }

    /// The built-in catalog with configured items layered on top
    pub fn catalog(&self) -> Arc<ItemCatalog> {
        if self.items.is_empty() {
            return ItemCatalog::builtin();
        }
        let mut catalog = ItemCatalog::builtin().as_ref().clone();
        catalog.extend(self.items.iter().cloned());
        Arc::new(catalog)
    }
}
