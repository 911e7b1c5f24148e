//! Configuration sources for csrfp
//!
//! A [`ConfigManager`] collects keys from layered sources and deserializes
//! the result into a typed, validated configuration. Later layers win:
//! files, then `.env` files, then environment variables, then explicit
//! [`set`](ConfigManager::set) calls, in whatever order they are applied.
//!
//! ```no_run
//! use csrfp_config::{ConfigManager, FileFormat};
//!
//! # fn example() -> csrfp_config::Result<()> {
//! let mut manager = ConfigManager::with_prefix("CSRFP");
//! manager.load_file("csrfp.toml", FileFormat::Toml)?;
//! manager.load_env();
//! let token_length: u64 = manager.get("tokenLength")?;
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Layered configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: Map<String, Value>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment variables are only read when they carry this prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            values: Map::new(),
            env_prefix: Some(prefix.into()),
        }
    }

    /// Merge keys from a configuration file.
    pub fn load_file(&mut self, path: impl AsRef<Path>, format: FileFormat) -> Result<&mut Self> {
        let path = path.as_ref();
        let data = ConfigLoader::new(format).load_file(path)?;
        debug!(path = %path.display(), ?format, "Loaded configuration file");
        self.merge_value(data);
        Ok(self)
    }

    /// Merge keys from a file whose format follows its extension.
    pub fn load_file_auto(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let format = ConfigLoader::auto(path.as_ref())?.format();
        self.load_file(path, format)
    }

    /// Merge prefixed variables from the process environment.
    pub fn load_env(&mut self) -> &mut Self {
        let vars = EnvLoader::new(self.env_prefix.clone()).load();
        self.values.extend(vars);
        self
    }

    /// Merge prefixed variables from an explicit set.
    pub fn load_vars<I, K, V>(&mut self, vars: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let vars = EnvLoader::new(self.env_prefix.clone()).from_vars(vars);
        self.values.extend(vars);
        self
    }

    /// Merge prefixed variables from a `.env` file.
    ///
    /// The process environment is left untouched. Without a path the usual
    /// `.env` lookup is used and a missing file is not an error.
    pub fn load_dotenv(&mut self, path: Option<&Path>) -> Result<&mut Self> {
        let entries = match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::FileNotFound(path.display().to_string()));
                }
                dotenvy::from_path_iter(path)
                    .map_err(|e| ConfigError::LoadError(e.to_string()))?
                    .collect::<std::result::Result<Vec<_>, _>>()
            }
            None => match dotenvy::dotenv_iter() {
                Ok(iter) => iter.collect::<std::result::Result<Vec<_>, _>>(),
                Err(_) => return Ok(self),
            },
        }
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(self.load_vars(entries))
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<&mut Self> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        self.values.insert(key.to_string(), json_value);
        Ok(self)
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::Incomplete(vec![key.to_string()]))?;

        serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::DeserializationError(format!("{}: {}", key, e)))
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Merge configuration from another manager; its keys win.
    pub fn merge(&mut self, other: &ConfigManager) -> &mut Self {
        self.values
            .extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// All collected keys as one JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Deserialize and validate the collected keys.
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let validated: T = serde_json::from_value(self.to_value())
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        validated.validate()?;

        Ok(validated)
    }

    fn merge_value(&mut self, data: Value) {
        if let Value::Object(map) = data {
            self.values.extend(map);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut manager = ConfigManager::new();
        manager.set("tokenName", "csrfp_token").unwrap();

        let value: String = manager.get("tokenName").unwrap();
        assert_eq!(value, "csrfp_token");
    }

    #[test]
    fn test_missing_key_is_incomplete() {
        let manager = ConfigManager::new();
        assert!(matches!(
            manager.get::<String>("logDirectory"),
            Err(ConfigError::Incomplete(_))
        ));
        assert_eq!(manager.get_or("tokenLength", 10u64), 10);
    }

    #[test]
    fn test_later_layers_win() {
        let mut manager = ConfigManager::with_prefix("CSRFP");
        manager
            .set("tokenLength", 10)
            .unwrap()
            .load_vars([("CSRFP_TOKEN_LENGTH", "20"), ("CSRFP_COOKIE_PATH", "/app")]);

        assert_eq!(manager.get::<u64>("tokenLength").unwrap(), 20);
        assert_eq!(manager.get::<String>("cookiePath").unwrap(), "/app");
        assert!(manager.has("cookiePath"));
    }

    #[test]
    fn test_merge() {
        let mut base = ConfigManager::new();
        base.set("tokenName", "a").unwrap();
        let mut other = ConfigManager::new();
        other.set("tokenName", "b").unwrap();

        base.merge(&other);
        assert_eq!(base.get::<String>("tokenName").unwrap(), "b");
    }

    #[test]
    fn test_load_validated() {
        #[derive(serde::Deserialize)]
        struct Limits {
            size: i64,
        }

        impl Validate for Limits {
            fn validate(&self) -> Result<()> {
                ConfigValidator::positive(self.size, "size")
            }
        }

        let mut manager = ConfigManager::new();
        manager.set("size", 0).unwrap();
        assert!(matches!(
            manager.load_validated::<Limits>(),
            Err(ConfigError::ValidationError(_))
        ));

        manager.set("size", 4).unwrap();
        assert_eq!(manager.load_validated::<Limits>().unwrap().size, 4);
    }
}
