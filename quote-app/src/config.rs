//! Application configuration.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config FILE`, or `quote-desk.toml` in the working
//!    directory when present)
//! 3. environment variables
//! 4. command-line flags (applied by the binary)
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "quotes.db"
//!
//! [api]
//! base_url = "http://localhost:3000"
//!
//! [quote]
//! default_tax_rate = "6"
//!
//! [logging]
//! level = "info"
//! file = "quote-desk.log"
//! ```

use std::path::{Path, PathBuf};

use quote_core::DEFAULT_TAX_RATE_PERCENT;
use quote_core::db::DbConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// File picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "quote-desk.toml";

pub const ENV_DB_BACKEND: &str = "QUOTE_DESK_DB_BACKEND";
pub const ENV_DB: &str = "QUOTE_DESK_DB";
pub const ENV_API_URL: &str = "QUOTE_DESK_API_URL";
pub const ENV_LOG: &str = "QUOTE_DESK_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "quotes.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Tax rate for drafts that do not set their own, in percent.
    pub default_tax_rate: Decimal,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            default_tax_rate: DEFAULT_TAX_RATE_PERCENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub quote: QuoteConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_toml_str(
        input: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Defaults, then the config file, then the process environment.
    ///
    /// An explicit `path` must exist; the implicit `quote-desk.toml` is
    /// optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    Self::from_file(implicit)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Override values from environment variables, looked up through `var`.
    /// Empty values are ignored.
    pub fn apply_env<F>(
        &mut self,
        var: F,
    ) where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = lookup(ENV_DB_BACKEND) {
            self.database.backend = backend;
        }
        if let Some(db) = lookup(ENV_DB) {
            self.database.connection_string = db;
        }
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.logging.level = level;
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.database.backend.clone(),
            connection_string: self.database.connection_string.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn parse(input: &str) -> AppConfig {
        AppConfig::from_toml_str(input, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();

        assert_eq!(config.database.backend, "sqlite");
        assert_eq!(config.database.connection_string, "quotes.db");
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.quote.default_tax_rate, dec!(6));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = parse(
            r#"
            [database]
            backend = "memory"

            [quote]
            default_tax_rate = "7.25"
            "#,
        );

        assert_eq!(config.database.backend, "memory");
        assert_eq!(config.database.connection_string, "quotes.db");
        assert_eq!(config.quote.default_tax_rate, dec!(7.25));
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn full_file() {
        let config = parse(
            r#"
            [database]
            backend = "sqlite"
            connection_string = "/srv/quotes/quotes.db"

            [api]
            base_url = "https://quotes.example.com"

            [logging]
            level = "debug"
            file = "/var/log/quote-desk.log"
            "#,
        );

        assert_eq!(
            config.db_config(),
            DbConfig {
                backend: "sqlite".to_string(),
                connection_string: "/srv/quotes/quotes.db".to_string(),
            }
        );
        assert_eq!(config.api.base_url, "https://quotes.example.com");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.file,
            Some(PathBuf::from("/var/log/quote-desk.log"))
        );
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = AppConfig::from_toml_str("[database\n", Path::new("broken.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = parse(
            r#"
            [database]
            backend = "sqlite"
            connection_string = "file.db"
            "#,
        );
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DB_BACKEND, "memory"),
            (ENV_DB, "empty"),
            (ENV_API_URL, "http://10.0.0.5:8080"),
            (ENV_LOG, "warn"),
        ]);

        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.backend, "memory");
        assert_eq!(config.database.connection_string, "empty");
        assert_eq!(config.api.base_url, "http://10.0.0.5:8080");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = AppConfig::default();

        config.apply_env(|key| (key == ENV_DB).then(|| "  ".to_string()));

        assert_eq!(config.database.connection_string, "quotes.db");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = AppConfig::load(Some(&missing)).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
