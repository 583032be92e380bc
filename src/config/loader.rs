//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::Config;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Validation(Vec<ValidationError>),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load configuration from `CONFIG_PATH` if set, otherwise use defaults.
/// A set-but-unreadable or invalid file is an error rather than a silent
/// fallback.
pub fn load_from_env() -> Result<Config, ConfigError> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_config(Path::new(&path)),
        Err(_) => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bind_address = "127.0.0.1:9999"
dataset_api_url = "http://dataset-api:22000"
default_observation_limit = 50

[cardinality]
concurrency = 4
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9999");
        assert_eq!(config.dataset_api_url, "http://dataset-api:22000");
        assert_eq!(config.default_observation_limit, 50);
        assert_eq!(config.cardinality.concurrency, 4);
        // untouched field keeps its default
        assert_eq!(config.cardinality.failure_threshold, 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"bind_address = "nonsense""#).unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors[0].field, "bind_address");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
