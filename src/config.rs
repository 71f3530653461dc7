//! DDL generation settings.
//!
//! [`DdlConfig::load`] reads the `[ddl]` section of `config/moorings.toml`
//! layered with `MOORINGS__DDL__*` environment variables.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::naming::{ConstraintNaming, IdentifierCase, NamingConvention};
use crate::platform::Platform;

const CONFIG_FILE: &str = "config/moorings.toml";
const ENV_PREFIX: &str = "MOORINGS";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DdlConfig {
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_history_table_suffix")]
    pub history_table_suffix: String,
    #[serde(default)]
    pub identifier_case: IdentifierCase,
    #[serde(default = "default_sequence_format")]
    pub sequence_format: String,
    /// Overrides the platform's maximum identifier length
    #[serde(default)]
    pub max_constraint_length: Option<usize>,
}

fn default_platform() -> String {
    "postgres".to_string()
}

fn default_history_table_suffix() -> String {
    "_history".to_string()
}

fn default_sequence_format() -> String {
    "{table}_seq".to_string()
}

impl Default for DdlConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            history_table_suffix: default_history_table_suffix(),
            identifier_case: IdentifierCase::default(),
            sequence_format: default_sequence_format(),
            max_constraint_length: None,
        }
    }
}

impl DdlConfig {
    /// Load from `config/moorings.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load from the given file (optional) and `MOORINGS__DDL__*` env vars.
    ///
    /// A file that exists but cannot be read or parsed is skipped with a
    /// warning and the environment alone is used.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if path.exists() {
                    log::warn!(
                        "Failed to load {}, falling back to env. Error: {}",
                        path.display(),
                        err
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        match settings.get::<DdlConfig>("ddl") {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => Ok(DdlConfig::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "DDL configuration could not be loaded from file or environment: {}",
                e
            ))),
        }
    }

    pub fn platform(&self) -> crate::Result<Platform> {
        self.platform.parse()
    }

    pub fn naming_convention(&self) -> NamingConvention {
        NamingConvention::new(self.sequence_format.clone(), self.history_table_suffix.clone())
    }

    /// Constraint naming, using `platform_max` unless overridden.
    pub fn constraint_naming(&self, platform_max: usize) -> ConstraintNaming {
        ConstraintNaming::new(
            self.identifier_case,
            self.max_constraint_length.unwrap_or(platform_max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DdlConfig::load_from(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.platform, "postgres");
        assert_eq!(config.history_table_suffix, "_history");
        assert_eq!(config.identifier_case, IdentifierCase::Lower);
        assert_eq!(config.max_constraint_length, None);
        assert_eq!(config.platform().unwrap(), Platform::Postgres);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moorings.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[ddl]\nplatform = \"oracle\"\nhistory_table_suffix = \"_hx\"\nidentifier_case = \"upper\"\nmax_constraint_length = 20"
        )
        .unwrap();

        let config = DdlConfig::load_from(&path).unwrap();
        assert_eq!(config.platform().unwrap(), Platform::Oracle);
        assert_eq!(config.naming_convention().history_table_name("t"), "t_hx");
        assert_eq!(config.sequence_format, "{table}_seq");

        let naming = config.constraint_naming(30);
        assert_eq!(naming.max_length_limit(), 20);
        assert_eq!(naming.case(), IdentifierCase::Upper);
    }
}
