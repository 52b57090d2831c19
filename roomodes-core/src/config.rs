//! Strategy configuration files.
//!
//! A strategy argument is either a bare strategy name (`alphabetical`) or a
//! path to a YAML file that names the strategy and carries its options:
//!
//! ```yaml
//! strategy: custom
//! exclude: [debug]
//! custom_order: [code, architect, ask]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::ordering::{OrderingOptions, Strategy};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_strategy_name")]
    pub strategy: String,
    #[serde(flatten)]
    pub options: OrderingOptions,
    /// Keys neither `strategy` nor [`OrderingOptions`] claimed. Must stay the
    /// last flattened field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

fn default_strategy_name() -> String {
    Strategy::default().name().to_owned()
}

impl StrategyConfig {
    pub fn named(name: &str) -> Self {
        Self {
            strategy: name.to_owned(),
            options: OrderingOptions::default(),
            extra: BTreeMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigurationError::StrategyFileIo {
                path: path.to_path_buf(),
                source,
            })?;
        let config: Self = serde_yaml::from_str(&contents).map_err(|source| {
            ConfigurationError::StrategyFileParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if let Some(key) = config.extra.keys().next() {
            return Err(ConfigurationError::UnknownOption {
                path: path.to_path_buf(),
                key: key.clone(),
            });
        }
        Ok(config)
    }

    /// Resolves the strategy name through the factory.
    pub fn resolve(&self) -> Result<Strategy, ConfigurationError> {
        Strategy::from_name(&self.strategy)
    }
}

/// `true` when `arg` should be read as a file rather than a strategy name.
fn looks_like_path(arg: &str) -> bool {
    arg.contains('/')
        || arg.contains('\\')
        || arg.ends_with(".yaml")
        || arg.ends_with(".yml")
}

/// Interprets a strategy argument: a file path is loaded, anything else is
/// taken as a strategy name with default options.
pub fn parse_strategy_argument(arg: &str) -> Result<StrategyConfig, ConfigurationError> {
    let config = if looks_like_path(arg) {
        StrategyConfig::load(&PathBuf::from(arg))?
    } else {
        StrategyConfig::named(arg)
    };
    config.resolve()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
