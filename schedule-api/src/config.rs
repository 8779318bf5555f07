/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Application configuration loaded from environment variables.

use std::env;

use timepoll_core::CivilOffset;

/// Configuration for the schedule API.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server (e.g. "0.0.0.0:8081").
    pub listen_addr: String,
    /// PostgreSQL settings. `None` runs on the in-memory store.
    pub database: Option<DatabaseConfig>,
    /// Base URL the participant link is built on.
    pub public_url: String,
    /// The one civil offset slots are authored in.
    pub civil_offset: CivilOffset,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Optional
    /// - `LISTEN_ADDR` (default: `"0.0.0.0:8081"`)
    /// - `DATABASE_URL` (unset: in-memory store)
    /// - `DB_MAX_CONNECTIONS` (default: `"20"`)
    /// - `RUN_MIGRATIONS` (default: `"false"`)
    /// - `PUBLIC_URL` (default: `"http://localhost:8081"`)
    /// - `CIVIL_UTC_OFFSET_MINUTES` (default: `"540"`, JST)
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let listen_addr = var("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8081".to_string());
        let public_url = var("PUBLIC_URL")
            .unwrap_or_else(|| "http://localhost:8081".to_string())
            .trim_end_matches('/')
            .to_string();

        let offset_minutes = var("CIVIL_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|| "540".to_string())
            .trim()
            .parse::<i32>()
            .map_err(|_| "CIVIL_UTC_OFFSET_MINUTES must be a valid integer")?;
        let civil_offset = CivilOffset::from_minutes(offset_minutes)
            .ok_or("CIVIL_UTC_OFFSET_MINUTES must be within -1439..=1439")?;

        let database = var("DATABASE_URL")
            .map(|url| {
                let max_connections = var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|| "20".to_string())
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or("DB_MAX_CONNECTIONS must be a positive integer")?;
                let run_migrations = match var("RUN_MIGRATIONS").as_deref().map(str::trim) {
                    None | Some("false") | Some("0") => false,
                    Some("true") | Some("1") => true,
                    Some(_) => return Err("RUN_MIGRATIONS must be true or false".to_string()),
                };
                Ok::<_, String>(DatabaseConfig {
                    url,
                    max_connections,
                    run_migrations,
                })
            })
            .transpose()?;

        Ok(Self {
            listen_addr,
            database,
            public_url,
            civil_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = load(&[]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8081");
        assert!(config.database.is_none());
        assert_eq!(config.civil_offset, CivilOffset::jst());
        assert_eq!(config.public_url, "http://localhost:8081");
    }

    #[test]
    fn database_settings_are_read_when_url_is_set() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/timepoll"),
            ("DB_MAX_CONNECTIONS", "5"),
            ("RUN_MIGRATIONS", "true"),
        ])
        .unwrap();
        let database = config.database.unwrap();
        assert_eq!(database.url, "postgres://localhost/timepoll");
        assert_eq!(database.max_connections, 5);
        assert!(database.run_migrations);
    }

    #[test]
    fn public_url_trailing_slash_is_dropped() {
        let config = load(&[("PUBLIC_URL", "https://poll.example.com/")]).unwrap();
        assert_eq!(config.public_url, "https://poll.example.com");
    }

    #[test]
    fn custom_civil_offset() {
        let config = load(&[("CIVIL_UTC_OFFSET_MINUTES", "-300")]).unwrap();
        assert_eq!(config.civil_offset.minutes(), -300);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[("CIVIL_UTC_OFFSET_MINUTES", "nine")]).unwrap_err();
        assert!(err.contains("CIVIL_UTC_OFFSET_MINUTES"));

        let err = load(&[("CIVIL_UTC_OFFSET_MINUTES", "1440")]).unwrap_err();
        assert!(err.contains("CIVIL_UTC_OFFSET_MINUTES"));

        let err = load(&[("DATABASE_URL", "postgres://x"), ("DB_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(err.contains("DB_MAX_CONNECTIONS"));

        let err = load(&[("DATABASE_URL", "postgres://x"), ("RUN_MIGRATIONS", "maybe")]).unwrap_err();
        assert!(err.contains("RUN_MIGRATIONS"));
    }
}
