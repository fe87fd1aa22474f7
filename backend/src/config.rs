//! Runtime configuration from environment variables.

use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

use crate::providers::open_meteo::OPEN_METEO_DEFAULT_BASE_URL;
use crate::providers::openrouteservice::{
    ORS_DEFAULT_BASE_URL, ORS_DEFAULT_PROFILE, OpenRouteServiceParams,
};

const PLACEHOLDER_MARKER: &str = "YOUR_";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ALTERNATIVES: u32 = 3;
const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ROUTING_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingCredential(&'static str),

    #[error("{0} still holds a placeholder value")]
    PlaceholderCredential(&'static str),

    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub ors_api_key: String,
    pub ors_base_url: String,
    pub ors_profile: String,
    pub ors_alternatives: u32,
    pub ors_timeout: Duration,
    pub open_meteo_base_url: String,
    pub weather_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let ors_api_key = lookup("ORS_API_KEY").unwrap_or_default();
        validate_api_key("ORS_API_KEY", &ors_api_key)?;

        Ok(Self {
            bind_addr: parse_var(&lookup, "BIND_ADDR")?
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))),
            ors_api_key,
            ors_base_url: lookup("ORS_BASE_URL")
                .unwrap_or_else(|| ORS_DEFAULT_BASE_URL.to_string()),
            ors_profile: lookup("ORS_PROFILE").unwrap_or_else(|| ORS_DEFAULT_PROFILE.to_string()),
            ors_alternatives: parse_var(&lookup, "ORS_ALTERNATIVES")?
                .unwrap_or(DEFAULT_ALTERNATIVES),
            ors_timeout: Duration::from_secs(
                parse_var(&lookup, "ORS_TIMEOUT_SECS")?.unwrap_or(DEFAULT_ROUTING_TIMEOUT_SECS),
            ),
            open_meteo_base_url: lookup("OPEN_METEO_BASE_URL")
                .unwrap_or_else(|| OPEN_METEO_DEFAULT_BASE_URL.to_string()),
            weather_timeout: Duration::from_secs(
                parse_var(&lookup, "WEATHER_TIMEOUT_SECS")?.unwrap_or(DEFAULT_WEATHER_TIMEOUT_SECS),
            ),
        })
    }

    pub fn ors_params(&self) -> OpenRouteServiceParams {
        OpenRouteServiceParams {
            api_key: self.ors_api_key.clone(),
            base_url: self.ors_base_url.clone(),
            profile: self.ors_profile.clone(),
            alternative_count: self.ors_alternatives,
            request_timeout: self.ors_timeout,
        }
    }
}

/// Reject empty credentials and the `YOUR_...` sample values shipped in docs.
pub fn validate_api_key(var: &'static str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingCredential(var));
    }
    if value.contains(PLACEHOLDER_MARKER) {
        return Err(ConfigError::PlaceholderCredential(var));
    }
    Ok(())
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => Err(ConfigError::Invalid {
            var,
            reason: err.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = config_from(&[("ORS_API_KEY", "5b3ce3597851110001cf6248")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.ors_base_url, ORS_DEFAULT_BASE_URL);
        assert_eq!(config.ors_profile, "driving-car");
        assert_eq!(config.ors_alternatives, 3);
        assert_eq!(config.weather_timeout, Duration::from_secs(10));
        assert_eq!(config.open_meteo_base_url, OPEN_METEO_DEFAULT_BASE_URL);
    }

    #[test]
    fn missing_key_fails_fast() {
        assert!(matches!(
            config_from(&[]),
            Err(ConfigError::MissingCredential("ORS_API_KEY"))
        ));
        assert!(matches!(
            config_from(&[("ORS_API_KEY", "   ")]),
            Err(ConfigError::MissingCredential(_))
        ));
    }

    #[test]
    fn placeholder_key_is_rejected() {
        assert!(matches!(
            config_from(&[("ORS_API_KEY", "YOUR_ORS_API_KEY")]),
            Err(ConfigError::PlaceholderCredential("ORS_API_KEY"))
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("ORS_API_KEY", "abc"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("ORS_PROFILE", "driving-hgv"),
            ("ORS_ALTERNATIVES", "2"),
            ("WEATHER_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.ors_profile, "driving-hgv");
        assert_eq!(config.ors_params().alternative_count, 2);
        assert_eq!(config.weather_timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = config_from(&[("ORS_API_KEY", "abc"), ("WEATHER_TIMEOUT_SECS", "soon")])
            .unwrap_err();
        assert!(err.to_string().starts_with("WEATHER_TIMEOUT_SECS has invalid value"));
    }
}
