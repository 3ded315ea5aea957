use serde::{Deserialize, Serialize};

/// Cache configuration.
///
/// Read once when a cache is constructed and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether lookups may hit. When false, `exists` always reports a miss.
    /// Default: true
    #[serde(default = "default_active")]
    pub active: bool,

    /// Namespace prepended to every key the cache writes.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Maximum number of keys removed per store delete call.
    #[serde(default = "default_delete_batch_size")]
    pub delete_batch_size: usize,
}

fn default_active() -> bool {
    true
}

fn default_prefix() -> String {
    "tagcache:".to_string()
}

fn default_delete_batch_size() -> usize {
    500
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            active: default_active(),
            prefix: default_prefix(),
            delete_batch_size: default_delete_batch_size(),
        }
    }
}

impl CacheConfig {
    /// Config with the activation flag switched off.
    pub fn inactive() -> Self {
        Self {
            active: false,
            ..Self::default()
        }
    }

    /// Override the key namespace.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.prefix.is_empty() {
            return Err("prefix must not be empty".into());
        }
        if self.delete_batch_size == 0 {
            return Err("delete_batch_size must be > 0".into());
        }
        Ok(())
    }
}

pub mod loader {
    use super::CacheConfig;
    use crate::error::{CacheError, CacheResult};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Load configuration from an optional TOML file plus environment overrides.
    ///
    /// Without a path, `tagcache.toml` in the working directory is used if it
    /// exists. Environment variables override file values, e.g.
    /// `TAGCACHE__ACTIVE=false`.
    pub fn load_config(path: Option<&str>) -> CacheResult<CacheConfig> {
        let mut builder = Config::builder();
        let file = PathBuf::from(path.unwrap_or("tagcache.toml"));
        if file.exists() {
            builder = builder.add_source(File::from(file));
        }
        builder = builder.add_source(
            Environment::with_prefix("TAGCACHE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| CacheError::config(format!("config build error: {e}")))?;
        let merged: CacheConfig = cfg
            .try_deserialize()
            .map_err(|e| CacheError::config(format!("config deserialize error: {e}")))?;
        merged.validate().map_err(CacheError::config)?;
        Ok(merged)
    }
}
