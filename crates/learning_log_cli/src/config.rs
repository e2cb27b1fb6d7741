//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Read every `LEARNING_LOG_*` variable, falling back to defaults.
//! - Reject malformed values with an error instead of panicking.
//! - Remember which variables fell back so they can be logged once logging
//!   is up.
//!
//! # Invariants
//! - Unset or empty variables always resolve to their documented default.

use learning_log_core::{default_log_level, SearchCase};
use log::info;
use std::env;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

pub const BIND_VAR: &str = "LEARNING_LOG_BIND";
pub const DB_VAR: &str = "LEARNING_LOG_DB";
pub const LOG_DIR_VAR: &str = "LEARNING_LOG_LOG_DIR";
pub const LOG_LEVEL_VAR: &str = "LEARNING_LOG_LOG_LEVEL";
pub const SEARCH_CASE_VAR: &str = "LEARNING_LOG_SEARCH_CASE";

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_DB: &str = "learning_log.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub search_case: SearchCase,
    /// Variables that were unset or blank, with the default used for each.
    pub defaults: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    CurrentDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { key, value, reason } => {
                write!(f, "invalid {key} value `{value}`: {reason}")
            }
            Self::CurrentDir(reason) => {
                write!(f, "cannot resolve current directory for log dir: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value when set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut vars = Vars {
            lookup,
            defaults: Vec::new(),
        };

        let bind = vars.get(BIND_VAR, || Ok(DEFAULT_BIND.to_string()))?;
        let db_path = vars.get(DB_VAR, || Ok(DEFAULT_DB.to_string()))?;
        let log_dir = vars.get(LOG_DIR_VAR, || {
            env::current_dir()
                .map(|dir| dir.join("logs").display().to_string())
                .map_err(|err| ConfigError::CurrentDir(err.to_string()))
        })?;
        let log_level = vars.get(LOG_LEVEL_VAR, || Ok(default_log_level().to_string()))?;
        let search_case =
            vars.get(SEARCH_CASE_VAR, || Ok(SearchCase::default().as_str().to_string()))?;

        Ok(Self {
            bind: parse(BIND_VAR, &bind)?,
            db_path: PathBuf::from(db_path),
            log_dir: PathBuf::from(log_dir),
            log_level,
            search_case: parse(SEARCH_CASE_VAR, &search_case)?,
            defaults: vars.defaults,
        })
    }

    /// Logs every variable that fell back to its default.
    pub fn log_defaults(&self) {
        for (key, value) in &self.defaults {
            info!("event=config_default module=cli status=ok key={key} value={value}");
        }
    }
}

struct Vars<F> {
    lookup: F,
    defaults: Vec<(&'static str, String)>,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(
        &mut self,
        key: &'static str,
        default: impl FnOnce() -> Result<String, ConfigError>,
    ) -> Result<String, ConfigError> {
        match (self.lookup)(key).filter(|value| !value.trim().is_empty()) {
            Some(value) => Ok(value),
            None => {
                let value = default()?;
                self.defaults.push((key, value.clone()));
                Ok(value)
            }
        }
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|err: T::Err| ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: err.to_string(),
        })
}
