use std::time::Duration;

use crate::GatewayError;

pub const SCRIPT_URL_VAR: &str = "PRENOTA_SCRIPT_URL";
pub const SCRIPT_SECRET_VAR: &str = "PRENOTA_SCRIPT_SECRET";
pub const BOOKING_URL_VAR: &str = "PRENOTA_BOOKING_URL";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

/// Where the backend lives and how long to wait for it.
///
/// Endpoints are optional so that a missing one only fails the requests that need it.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub script_url: Option<String>,
    pub script_secret: Option<String>,
    /// Booking intake, never substituted with the script endpoint
    pub booking_url: Option<String>,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            script_url: None,
            script_secret: None,
            booking_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub(crate) fn script_url(&self) -> Result<&str, GatewayError> {
        required(&self.script_url, SCRIPT_URL_VAR)
    }

    pub(crate) fn script_secret(&self) -> Result<&str, GatewayError> {
        required(&self.script_secret, SCRIPT_SECRET_VAR)
    }

    pub(crate) fn booking_url(&self) -> Result<&str, GatewayError> {
        required(&self.booking_url, BOOKING_URL_VAR)
    }
}

fn required<'a>(value: &'a Option<String>, var: &'static str) -> Result<&'a str, GatewayError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(GatewayError::MissingConfig(var))
}
