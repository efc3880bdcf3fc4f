use log::info;
use prenota_core::bookings_open_of;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Gateway, GatewayError};

/// The backend's settings, with the bookings flag read from wherever it was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsSnapshot {
    pub settings: Value,
    pub bookings_open: Option<bool>,
}

impl SettingsSnapshot {
    fn from_reply(body: Value) -> Self {
        let bookings_open = bookings_open_of(&body);
        let settings = body.get("settings").cloned().unwrap_or(Value::Null);

        Self {
            settings,
            bookings_open,
        }
    }
}

impl Gateway {
    pub async fn settings(&self) -> Result<SettingsSnapshot, GatewayError> {
        let body = self
            .action("getSettings", Map::new(), "Errore settings.")
            .await?;

        Ok(SettingsSnapshot::from_reply(body))
    }

    pub async fn set_bookings_open(&self, open: bool) -> Result<SettingsSnapshot, GatewayError> {
        info!("Setting bookings open to {open}");

        let mut fields = Map::new();
        fields.insert("value".to_string(), Value::Bool(open));

        let body = self
            .action("setBookingsOpen", fields, "Errore setBookingsOpen.")
            .await?;

        Ok(SettingsSnapshot::from_reply(body))
    }
}
