//! Engine configuration.
//!
//! Every section has defaults, so an empty YAML document (or no file at all) yields
//! a working engine. Hosts load a file once at startup and hand the resulting
//! [`EngineConfig`] to [`Executor::with_config`](crate::engine::Executor::with_config).
//!
//! ```yaml
//! limits:
//!   max_depth: 32
//!   timeout_ms: 500
//! registry:
//!   disabled_methods: [image]
//! view:
//!   asset_host: https://cdn.example.com
//!   translations:
//!     greeting: Hello
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: Limits,
    pub registry: RegistryConfig,
    pub view: ViewConfig,
    pub cache: CacheConfig,
    pub logging: LogSettings,
}

impl EngineConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}

/// Resource guards applied to every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest accepted source text, in bytes.
    pub max_source_bytes: usize,
    /// Deepest allowed nesting of expressions and blocks.
    pub max_depth: usize,
    /// Most AST nodes a single program may contain.
    pub max_nodes: usize,
    /// Most node evaluations a single run may perform.
    pub max_steps: usize,
    /// Most elements a single run may construct.
    pub max_elements: usize,
    /// Wall-clock budget for execution, checked cooperatively.
    pub timeout_ms: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_source_bytes: 64 * 1024,
            max_depth: 64,
            max_nodes: 10_000,
            max_steps: 50_000,
            max_elements: 5_000,
            timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Standard methods removed from the whitelist.
    pub disabled_methods: Vec<String>,
}

/// Settings for the built-in [`StaticViewContext`](crate::runtime::view::StaticViewContext).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub asset_host: String,
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Entries held before the cache is flushed.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `env_logger` filter used when `RUST_LOG` is not set, e.g. `trellis=debug`.
    pub filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(EngineConfig::from_yaml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_yaml_str(
            "limits:\n  max_depth: 8\nregistry:\n  disabled_methods: [image]\n",
        )
        .unwrap();
        assert_eq!(config.limits.max_depth, 8);
        assert_eq!(config.limits.max_nodes, Limits::default().max_nodes);
        assert_eq!(config.registry.disabled_methods, vec!["image".to_string()]);
        assert!(config.cache.enabled);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(matches!(
            EngineConfig::from_yaml_str("limits: [1, 2"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
