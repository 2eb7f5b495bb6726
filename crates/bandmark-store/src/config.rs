//! Store configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bandmark_core::traits::AttemptStore;

use crate::memory::MemoryStore;
use crate::rest::RestStore;

/// Configuration for the attempt store backend.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure
/// in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Rest {
        url: String,
        api_key: String,
    },
    Memory,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Rest { url, api_key: _ } => f
                .debug_struct("Rest")
                .field("url", url)
                .field("api_key", &"***")
                .finish(),
            StoreConfig::Memory => f.debug_struct("Memory").finish(),
        }
    }
}

/// Top-level bandmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandmarkConfig {
    /// The attempt store backend.
    #[serde(default = "default_store")]
    pub store: StoreConfig,
    /// Max concurrent submissions in a batch.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_store() -> StoreConfig {
    StoreConfig::Memory
}
fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./bandmark-results")
}

impl Default for BandmarkConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a store config.
fn resolve_store_config(config: &StoreConfig) -> StoreConfig {
    match config {
        StoreConfig::Rest { url, api_key } => StoreConfig::Rest {
            url: resolve_env_vars(url),
            api_key: resolve_env_vars(api_key),
        },
        StoreConfig::Memory => StoreConfig::Memory,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `bandmark.toml` in the current directory
/// 2. `~/.config/bandmark/config.toml`
///
/// Environment variable overrides: `BANDMARK_STORE_URL`, `BANDMARK_STORE_KEY`.
pub fn load_config() -> Result<BandmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<BandmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("bandmark.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<BandmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => BandmarkConfig::default(),
    };

    // Apply env var overrides
    let env_url = std::env::var("BANDMARK_STORE_URL").ok();
    let env_key = std::env::var("BANDMARK_STORE_KEY").ok();
    if env_url.is_some() || env_key.is_some() {
        config.store = match config.store {
            StoreConfig::Rest { url, api_key } => StoreConfig::Rest {
                url: env_url.unwrap_or(url),
                api_key: env_key.unwrap_or(api_key),
            },
            StoreConfig::Memory => StoreConfig::Rest {
                url: env_url.unwrap_or_default(),
                api_key: env_key.unwrap_or_default(),
            },
        };
    }

    config.store = resolve_store_config(&config.store);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("bandmark"))
}

/// Create a store instance from its configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn AttemptStore>> {
    match config {
        StoreConfig::Rest { url, api_key } => {
            anyhow::ensure!(!url.is_empty(), "store url is empty");
            Ok(Arc::new(RestStore::new(url, api_key)))
        }
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
