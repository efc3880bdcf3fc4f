mod bookings;
mod config;
mod errors;
mod settings;

pub use bookings::*;
pub use config::*;
pub use errors::*;
pub use settings::*;

use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Map, Value};
use tokio::time::timeout;

/// Error placed in the envelope when the backend answers with something other than JSON
pub const NON_JSON_ERROR: &str = "Risposta non JSON";

/// Talks to the external spreadsheet backend, on behalf of both the public
/// form and the admin dashboard.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    config: GatewayConfig,
}

/// A backend answer, with its body parsed or wrapped in an error envelope.
#[derive(Debug)]
struct Reply {
    status: StatusCode,
    text: String,
    body: Value,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Sends a request and reads the whole answer, all under the configured timeout.
    async fn execute(&self, request: RequestBuilder) -> Result<Reply, GatewayError> {
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;

            Ok::<_, reqwest::Error>((status, text))
        };

        let (status, text) = timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| GatewayError::Timeout)??;

        debug!("Backend answered {status}");

        let body = serde_json::from_str(&text).unwrap_or_else(|_| {
            json!({
                "ok": false,
                "error": NON_JSON_ERROR,
                "raw": text,
            })
        });

        Ok(Reply { status, text, body })
    }

    /// Runs a JSON action against the script endpoint with the shared secret injected.
    async fn action(
        &self,
        action: &str,
        fields: Map<String, Value>,
        failure_message: &str,
    ) -> Result<Value, GatewayError> {
        let url = self.config.script_url()?;
        let secret = self.config.script_secret()?;

        let mut body = fields;
        body.insert("action".to_string(), action.into());
        body.insert("secret".to_string(), secret.into());

        let request = self.client.post(url).json(&body);
        self.execute(request).await?.into_result(failure_message)
    }
}

impl Reply {
    fn is_failure(&self) -> bool {
        !self.status.is_success() || self.body.get("ok") == Some(&Value::Bool(false))
    }

    fn into_result(self, failure_message: &str) -> Result<Value, GatewayError> {
        if self.is_failure() {
            return Err(GatewayError::upstream(
                self.status.as_u16(),
                self.body,
                failure_message,
            ));
        }

        Ok(self.body)
    }
}
