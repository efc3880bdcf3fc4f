use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

lazy_static! {
    static ref AUTH_FAILURE_REGEX: Regex =
        Regex::new(r"(?i)unauthori[sz]ed|non autorizzat|forbidden|secret").unwrap();
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required setting is absent, named by its environment variable
    #[error("{0} mancante")]
    MissingConfig(&'static str),

    #[error("Il backend non ha risposto in tempo")]
    Timeout,

    #[error("Errore rete: {0}")]
    Network(String),

    /// The backend answered, but refused or failed the request
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        detail: Value,
        unauthorized: bool,
    },

    /// The booking intake endpoint answered with a non-success status
    #[error("Errore pannello: {status}")]
    Intake { status: u16, detail: String },

    #[error("Impossibile codificare la richiesta: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl GatewayError {
    pub(crate) fn upstream(status: u16, body: Value, fallback_message: &str) -> Self {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback_message)
            .to_string();

        let unauthorized = status == 401 || status == 403 || AUTH_FAILURE_REGEX.is_match(&message);

        Self::Upstream {
            status,
            message,
            detail: body,
            unauthorized,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Upstream {
                unauthorized: true,
                ..
            }
        )
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            return Self::Timeout;
        }

        // Query strings carry the script secret
        Self::Network(value.without_url().to_string())
    }
}
