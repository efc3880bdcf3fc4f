use async_trait::async_trait;
use log::warn;
use prenota_core::{bookings_open_of, PanelApi, PanelError, StatusUpdate};
use reqwest::{header::CACHE_CONTROL, Client, RequestBuilder, StatusCode};
use serde_json::{json, Map, Value};
use url::Url;

/// The admin API of a running prenota server, reached over HTTP.
///
/// The session cookie set at login is kept by the client's cookie store and
/// sent along with every later request.
#[derive(Debug, Clone)]
pub struct HttpPanelApi {
    client: Client,
    base: Url,
}

impl HttpPanelApi {
    pub fn new(base_url: &str) -> Result<Self, PanelError> {
        let base = Url::parse(base_url).map_err(|e| PanelError::Network(e.to_string()))?;

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| PanelError::Network(e.to_string()))?;

        Ok(Self { client, base })
    }

    fn url(&self, path: &str) -> Result<Url, PanelError> {
        self.base
            .join(path)
            .map_err(|e| PanelError::Network(e.to_string()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, Value), PanelError> {
        let response = request
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| PanelError::Network(e.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        Ok((status, body))
    }

    /// Sends a request that needs the admin session. A 401 means the session is gone.
    async fn call(&self, request: RequestBuilder, failure_message: &str) -> Result<Value, PanelError> {
        let (status, body) = self.send(request).await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(PanelError::Unauthorized);
        }

        outcome(status, body, failure_message)
    }
}

fn outcome(status: StatusCode, body: Value, failure_message: &str) -> Result<Value, PanelError> {
    if !status.is_success() || body.get("ok") != Some(&Value::Bool(true)) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or(failure_message);

        warn!("Server refused request: {message}");
        return Err(PanelError::Rejected(message.to_string()));
    }

    Ok(body)
}

#[async_trait]
impl PanelApi for HttpPanelApi {
    async fn login(&self, password: &str) -> Result<(), PanelError> {
        let request = self
            .client
            .post(self.url("/api/admin/login")?)
            .json(&json!({ "password": password }));

        // A refused login is a 401 too, but its message is the one to show
        let (status, body) = self.send(request).await?;
        outcome(status, body, "Login non riuscito.")?;

        Ok(())
    }

    async fn logout(&self) -> Result<(), PanelError> {
        let request = self.client.post(self.url("/api/admin/logout")?);

        self.call(request, "Logout non riuscito.").await?;
        Ok(())
    }

    async fn list_bookings(&self) -> Result<Vec<Value>, PanelError> {
        let request = self.client.get(self.url("/api/admin/bookings")?);
        let body = self.call(request, "Errore caricamento prenotazioni.").await?;

        match body.get("rows") {
            Some(Value::Array(rows)) => Ok(rows.clone()),
            _ => Ok(vec![]),
        }
    }

    async fn update_status(&self, update: &StatusUpdate) -> Result<(), PanelError> {
        let mut body: Map<String, Value> = update
            .fields()
            .into_iter()
            .map(|(key, value)| (key.to_string(), Value::String(value)))
            .collect();
        body.insert("action".to_string(), "updateStatus".into());

        let request = self
            .client
            .post(self.url("/api/admin/bookings")?)
            .json(&body);

        self.call(request, "Errore aggiornando lo stato.").await?;
        Ok(())
    }

    async fn settings(&self) -> Result<Option<bool>, PanelError> {
        let request = self.client.get(self.url("/api/admin/settings")?);
        let body = self.call(request, "Errore settings.").await?;

        Ok(bookings_open_of(&body))
    }

    async fn set_bookings_open(&self, open: bool) -> Result<Option<bool>, PanelError> {
        let request = self
            .client
            .post(self.url("/api/admin/settings")?)
            .json(&json!({ "value": open }));

        let body = self.call(request, "Errore setBookingsOpen.").await?;

        Ok(bookings_open_of(&body))
    }
}
