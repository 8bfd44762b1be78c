use core::fmt::{Debug, Display};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "pims.toml";
pub const ENV_PREFIX: &str = "PIMS_";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Write the sample dataset when the store has no participants at startup.
    pub seed_on_empty: bool,
    /// First part of generated membership ids, `{prefix}-{year}-{suffix}`.
    pub membership_id_prefix: String,
    /// `tracing_subscriber::EnvFilter` directives. `RUST_LOG` takes precedence.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_on_empty: true,
            membership_id_prefix: "YIN".to_owned(),
            log_filter: None,
        }
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
    #[error("config error: membership id prefix {0:?} must be non-empty and alphanumeric")]
    InvalidPrefix(String),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

pub fn get_config() -> Result<Config, ConfigError> {
    get_config_from(CONFIG_FILE)
}

/// Defaults, overridden by the TOML file at `path` if it exists, overridden by `PIMS_*`
/// environment variables.
pub fn get_config_from(path: &str) -> Result<Config, ConfigError> {
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    if config.membership_id_prefix.is_empty()
        || !config
            .membership_id_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::InvalidPrefix(config.membership_id_prefix));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_file_or_env() {
        Jail::expect_with(|_jail| {
            assert_eq!(get_config().unwrap(), Config::default());
            Ok(())
        });
    }

    #[test]
    fn file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                seed_on_empty = false
                membership_id_prefix = "ABC"
                "#,
            )?;
            jail.set_env("PIMS_MEMBERSHIP_ID_PREFIX", "XYZ");
            jail.set_env("PIMS_LOG_FILTER", "pims_backend=debug");
            let config = get_config().unwrap();
            assert!(!config.seed_on_empty);
            assert_eq!(config.membership_id_prefix, "XYZ");
            assert_eq!(config.log_filter.as_deref(), Some("pims_backend=debug"));
            Ok(())
        });
    }

    #[test]
    fn rejects_prefix_that_breaks_the_id_format() {
        Jail::expect_with(|jail| {
            jail.set_env("PIMS_MEMBERSHIP_ID_PREFIX", "A-B");
            assert!(matches!(
                get_config(),
                Err(ConfigError::InvalidPrefix(prefix)) if prefix == "A-B"
            ));
            Ok(())
        });
    }

    #[test]
    fn wrong_type_is_reported() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "seed_on_empty = \"sometimes\"")?;
            let error = get_config().unwrap_err();
            assert!(error.to_string().starts_with("config error:"));
            Ok(())
        });
    }
}
