use crate::domain::Decimal;
use crate::engine::FlatMarkPolicy;
use crate::orchestration::player::DEFAULT_MAX_EVENTS;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base capital used when a request does not supply one.
    pub default_base_capital: Decimal,
    pub flat_mark_policy: FlatMarkPolicy,
    /// Upper bound on trades + prices per run.
    pub max_events: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            default_base_capital: Decimal::ZERO,
            flat_mark_policy: FlatMarkPolicy::Strict,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let default_base_capital = env_map
            .get("DEFAULT_BASE_CAPITAL")
            .map(|s| s.as_str())
            .unwrap_or("0");
        let default_base_capital = Decimal::from_str_canonical(default_base_capital).map_err(|_| {
            ConfigError::InvalidValue(
                "DEFAULT_BASE_CAPITAL".to_string(),
                "must be a decimal number".to_string(),
            )
        })?;

        let flat_mark_policy = match env_map
            .get("FLAT_MARK_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("strict")
        {
            "strict" => FlatMarkPolicy::Strict,
            "carry" => FlatMarkPolicy::Carry,
            other => {
                return Err(ConfigError::InvalidValue(
                    "FLAT_MARK_POLICY".to_string(),
                    format!("must be strict or carry, got {}", other),
                ))
            }
        };

        let max_events = match env_map.get("MAX_EVENTS") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "MAX_EVENTS".to_string(),
                        "must be a positive integer".to_string(),
                    )
                })?,
            None => DEFAULT_MAX_EVENTS,
        };

        Ok(Config {
            port,
            default_base_capital,
            flat_mark_policy,
            max_events,
        })
    }
}
