//! Environment driven configuration.

use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

use crate::gate::GateSettings;
use crate::locale::LocaleSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub locales_dir: PathBuf,
    pub default_locale: String,
    pub available_locales: Vec<String>,
    pub session_idle_days: i64,
    pub secure_cookies: bool,
    pub credential_timeout: Duration,
    pub realm: String,
}

impl Config {
    /// Reads the `BULLETIN_*` variables and `DATABASE_URL`, after loading a
    /// `.env` file when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let default_locale: String = try_load("BULLETIN_DEFAULT_LOCALE", "en")?;
        let locales: String = try_load("BULLETIN_AVAILABLE_LOCALES", "en,cy")?;
        let mut available_locales: Vec<String> = locales
            .split(',')
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if !available_locales.contains(&default_locale) {
            warn!(locale = %default_locale, "default locale not listed as available, adding it");
            available_locales.push(default_locale.clone());
        }

        let timeout_ms: u64 = try_load("BULLETIN_CREDENTIAL_TIMEOUT_MS", "5000")?;

        Ok(Self {
            addr: try_load("BULLETIN_ADDR", "127.0.0.1:3000")?,
            database_url,
            locales_dir: try_load("BULLETIN_LOCALES_DIR", "locales")?,
            default_locale,
            available_locales,
            session_idle_days: try_load("BULLETIN_SESSION_IDLE_DAYS", "7")?,
            secure_cookies: try_load("BULLETIN_SECURE_COOKIES", "false")?,
            credential_timeout: Duration::from_millis(timeout_ms),
            realm: try_load("BULLETIN_REALM", "Web Password")?,
        })
    }

    pub fn gate_settings(&self) -> GateSettings {
        GateSettings {
            realm: self.realm.clone(),
            credential_timeout: self.credential_timeout,
            ..GateSettings::default()
        }
    }

    pub fn locale_settings(&self) -> LocaleSettings {
        LocaleSettings {
            dir: self.locales_dir.clone(),
            default_locale: self.default_locale.clone(),
            available: self.available_locales.clone(),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let timeout: u64 = try_load("BULLETIN_TEST_UNSET_TIMEOUT", "5000").unwrap();
        assert_eq!(timeout, 5000);
        let addr: SocketAddr = try_load("BULLETIN_TEST_UNSET_ADDR", "127.0.0.1:3000").unwrap();
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn bad_values_are_reported() {
        let err = try_load::<bool>("BULLETIN_TEST_UNSET_FLAG", "maybe").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "BULLETIN_TEST_UNSET_FLAG", ref value, .. } if value == "maybe"
        ));
    }
}
