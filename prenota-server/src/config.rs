use std::{env, time::Duration};

use prenota_gateway::{
    GatewayConfig, BOOKING_URL_VAR, DEFAULT_TIMEOUT, SCRIPT_SECRET_VAR, SCRIPT_URL_VAR,
};
use thiserror::Error;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9050;
pub const DEFAULT_SHOP_NAME: &str = "Laboratorio";

pub const PORT_VAR: &str = "PRENOTA_SERVER_PORT";
pub const SESSION_SECRET_VAR: &str = "PRENOTA_SESSION_SECRET";
pub const ADMIN_PASSWORD_VAR: &str = "PRENOTA_ADMIN_PASSWORD";
pub const SHOP_NAME_VAR: &str = "PRENOTA_SHOP_NAME";
pub const TIMEOUT_VAR: &str = "PRENOTA_TIMEOUT_SECS";
pub const ENV_VAR: &str = "PRENOTA_ENV";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got \"{value}\"")]
    NotANumber { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub gateway: GatewayConfig,
    /// Signs admin session tokens
    pub session_secret: Option<String>,
    pub admin_password: Option<String>,
    /// Used for bookings that don't name a shop
    pub shop_name: String,
    /// Marks cookies `Secure`
    pub production: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            gateway: Default::default(),
            session_secret: None,
            admin_password: None,
            shop_name: DEFAULT_SHOP_NAME.to_string(),
            production: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get(PORT_VAR) {
            Some(value) => parse_number(PORT_VAR, value)?,
            None => DEFAULT_PORT,
        };

        let timeout = match get(TIMEOUT_VAR) {
            Some(value) => Duration::from_secs(parse_number(TIMEOUT_VAR, value)?),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            port,
            gateway: GatewayConfig {
                script_url: get(SCRIPT_URL_VAR),
                script_secret: get(SCRIPT_SECRET_VAR),
                booking_url: get(BOOKING_URL_VAR),
                timeout,
            },
            session_secret: get(SESSION_SECRET_VAR),
            admin_password: get(ADMIN_PASSWORD_VAR),
            shop_name: get(SHOP_NAME_VAR).unwrap_or_else(|| DEFAULT_SHOP_NAME.to_string()),
            production: get(ENV_VAR).is_some_and(|v| v.eq_ignore_ascii_case("production")),
        })
    }
}

impl ServerConfig {
    /// Variables that are unset but needed by at least one endpoint
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (SCRIPT_URL_VAR, self.gateway.script_url.is_none()),
            (SCRIPT_SECRET_VAR, self.gateway.script_secret.is_none()),
            (BOOKING_URL_VAR, self.gateway.booking_url.is_none()),
            (SESSION_SECRET_VAR, self.session_secret.is_none()),
            (ADMIN_PASSWORD_VAR, self.admin_password.is_none()),
        ]
        .into_iter()
        .filter_map(|(var, missing)| missing.then_some(var))
        .collect()
    }
}

fn parse_number<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    value
        .parse()
        .map_err(|_| ConfigError::NotANumber { var, value })
}
