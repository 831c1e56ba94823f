//! Build [`AppConfig`] from environment variables. Unset variables take their defaults;
//! set but malformed ones are errors.

use std::str::FromStr;

use super::types::*;
use crate::error::ConfigError;

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<AppConfig, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_var("BIND_ADDR", get("BIND_ADDR").as_deref().unwrap_or(DEFAULT_BIND_ADDR))?;
        let store = match get("BOOKINGS_STORE") {
            Some(s) => StoreKind::parse(&s)?,
            None => StoreKind::default(),
        };
        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(s) => parse_var("DATABASE_MAX_CONNECTIONS", &s)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DATABASE_MAX_CONNECTIONS",
                reason: "must be at least 1".into(),
            });
        }
        let body_limit = match get("BODY_LIMIT_BYTES") {
            Some(s) => parse_var("BODY_LIMIT_BYTES", &s)?,
            None => DEFAULT_BODY_LIMIT,
        };

        Ok(AppConfig {
            bind_addr,
            store,
            database_url,
            max_connections,
            body_limit,
        })
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        reason: format!("{:?}: {}", raw, e),
    })
}
