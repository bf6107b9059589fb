//! Environment-driven configuration for the `rentdesk` shell.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rentdesk_core::{IdGenerator, SequentialIdGenerator, UuidV7Generator};
use rentdesk_observability::LogFormat;
use rentdesk_rentals::catalog::DEFAULT_RENTAL_DAYS;

pub const ENV_ID_STRATEGY: &str = "RENTDESK_ID_STRATEGY";
pub const ENV_RENTAL_DAYS: &str = "RENTDESK_RENTAL_DAYS";
pub const ENV_OUTPUT: &str = "RENTDESK_OUTPUT";
pub const ENV_LOG_FORMAT: &str = "RENTDESK_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// How fresh item and record ids are minted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Time-ordered UUIDv7.
    #[default]
    Uuid,
    /// 1, 2, 3, ... (reproducible sessions, scripted demos).
    Sequential,
}

impl IdStrategy {
    pub fn generator(self) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Uuid => Box::new(UuidV7Generator),
            IdStrategy::Sequential => Box::new(SequentialIdGenerator::new()),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(IdStrategy::Uuid),
            "sequential" => Ok(IdStrategy::Sequential),
            _ => Err("expected uuid or sequential".to_string()),
        }
    }
}

/// Rendering of command results on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err("expected text or json".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    pub id_strategy: IdStrategy,
    /// Rental period applied when `rent` is given no due date.
    pub rental_days: u32,
    pub output: OutputFormat,
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            rental_days: DEFAULT_RENTAL_DAYS,
            output: OutputFormat::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl CliConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let id_strategy = match get(ENV_ID_STRATEGY) {
            Some(raw) => raw
                .parse::<IdStrategy>()
                .map_err(|reason| invalid(ENV_ID_STRATEGY, raw, reason))?,
            None => defaults.id_strategy,
        };

        let rental_days = match get(ENV_RENTAL_DAYS) {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                invalid(ENV_RENTAL_DAYS, raw.clone(), format!("expected a day count: {e}"))
            })?,
            None => defaults.rental_days,
        };

        let output = match get(ENV_OUTPUT) {
            Some(raw) => raw
                .parse::<OutputFormat>()
                .map_err(|reason| invalid(ENV_OUTPUT, raw, reason))?,
            None => defaults.output,
        };

        let log_format = match get(ENV_LOG_FORMAT) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| invalid(ENV_LOG_FORMAT, raw.clone(), e.to_string()))?,
            None => defaults.log_format,
        };

        Ok(Self {
            id_strategy,
            rental_days,
            output,
            log_format,
        })
    }
}

fn invalid(key: &'static str, value: String, reason: String) -> ConfigError {
    ConfigError::Invalid { key, value, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.rental_days, 7);
    }

    #[test]
    fn reads_every_key() {
        let config = CliConfig::from_lookup(lookup(&[
            (ENV_ID_STRATEGY, "sequential"),
            (ENV_RENTAL_DAYS, "14"),
            (ENV_OUTPUT, "JSON"),
            (ENV_LOG_FORMAT, "json"),
        ]))
        .unwrap();

        assert_eq!(config.id_strategy, IdStrategy::Sequential);
        assert_eq!(config.rental_days, 14);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = CliConfig::from_lookup(lookup(&[(ENV_OUTPUT, "  ")])).unwrap();
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = CliConfig::from_lookup(lookup(&[(ENV_RENTAL_DAYS, "-3")])).unwrap_err();
        let ConfigError::Invalid { key, value, .. } = err;
        assert_eq!(key, ENV_RENTAL_DAYS);
        assert_eq!(value, "-3");

        let err = CliConfig::from_lookup(lookup(&[(ENV_ID_STRATEGY, "random")])).unwrap_err();
        assert!(err.to_string().starts_with("RENTDESK_ID_STRATEGY=\"random\" is invalid"));
    }

    #[test]
    fn sequential_strategy_is_deterministic() {
        let mut a = IdStrategy::Sequential.generator();
        let mut b = IdStrategy::Sequential.generator();
        assert_eq!(a.next_uuid(), b.next_uuid());
    }
}
