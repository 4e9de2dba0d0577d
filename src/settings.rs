use std::env;

use serde::Deserialize;

use crate::error::{QrLabelError, QrLabelResult};
use crate::telemetry::LogLevel;

/// Every recognised environment variable starts with this prefix.
pub const ENV_PREFIX: &str = "QRL_";

#[derive(Deserialize, Debug)]
struct RawConfig {
    #[serde(default = "default_env")]
    env: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    prefix: Option<String>,
    log_dir: Option<String>,
    default_log_level: Option<String>,
}

fn default_env() -> String {
    "file".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Process-wide settings, read once at start-up and never mutated.
#[derive(Clone, Debug)]
pub struct Config {
    pub env: String, // file / server
    pub host: String,
    pub port: u16,
    pub prefix: Option<String>,
    pub log_dir: Option<String>,
    pub default_log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: default_env(),
            host: default_host(),
            port: default_port(),
            prefix: None,
            log_dir: None,
            default_log_level: LogLevel::WARNING,
        }
    }
}

impl Config {
    /// Build the config from `(name, value)` pairs; only `QRL_`-prefixed names are read.
    pub fn from_vars<I>(vars: I) -> QrLabelResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: RawConfig = envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .map_err(|e| QrLabelError::configuration(e.to_string()))?;

        let default_log_level = match raw.default_log_level.as_deref() {
            None => LogLevel::WARNING,
            Some(value) => LogLevel::parse(value).ok_or_else(|| {
                QrLabelError::configuration(format!(
                    "{ENV_PREFIX}DEFAULT_LOG_LEVEL: unknown log level {value:?}"
                ))
            })?,
        };

        Ok(Self {
            env: raw.env,
            host: raw.host,
            port: raw.port,
            prefix: raw.prefix,
            log_dir: raw.log_dir,
            default_log_level,
        })
    }
}

impl Config {
    /// Where the variables came from, for the start-up log.
    pub fn source(&self) -> &'static str {
        if self.env == "file" {
            ".env file"
        } else {
            "server environment"
        }
    }
}

/// Runs before the subscriber is installed, so it does not log; see `Config::source`.
pub fn get_config() -> QrLabelResult<Config> {
    let env_var = env::var("QRL_ENV").unwrap_or("file".to_string());
    if env_var == "file" {
        let _ = dotenvy::dotenv();
    }
    Config::from_vars(env::vars())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_vars(vars(&[("PATH", "/usr/bin")])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.default_log_level, LogLevel::WARNING);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn reads_prefixed_variables() {
        let config = Config::from_vars(vars(&[
            ("QRL_DEFAULT_LOG_LEVEL", "debug"),
            ("QRL_PORT", "9000"),
            ("DEFAULT_LOG_LEVEL", "error"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.default_log_level.filter(), LevelFilter::DEBUG);
    }

    #[test]
    fn numeric_default_log_level() {
        let config = Config::from_vars(vars(&[("QRL_DEFAULT_LOG_LEVEL", "20")])).unwrap();
        assert_eq!(config.default_log_level.filter(), LevelFilter::INFO);
    }

    #[test]
    fn unparsable_log_level_is_fatal() {
        let err = Config::from_vars(vars(&[("QRL_DEFAULT_LOG_LEVEL", "loud")])).unwrap_err();
        assert!(matches!(err, QrLabelError::Configuration(_)));
    }

    #[test]
    fn source_follows_the_env_setting() {
        assert_eq!(Config::default().source(), ".env file");
        let config = Config::from_vars(vars(&[("QRL_ENV", "server")])).unwrap();
        assert_eq!(config.source(), "server environment");
    }

    #[test]
    fn unparsable_port_is_fatal() {
        let err = Config::from_vars(vars(&[("QRL_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, QrLabelError::Configuration(_)));
    }
}
