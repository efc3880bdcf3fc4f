//! Response bodies of every endpoint, along with the From<T> impls

use prenota_gateway::{BookingList, SettingsSnapshot, StatusUpdated, Transport};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// `{ ok: true }` with nothing else to report
#[derive(Debug, Serialize, ToSchema)]
pub struct Ack {
    ok: bool,
}

impl Default for Ack {
    fn default() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingAccepted {
    ok: bool,
    message: String,
    /// Whatever the intake endpoint answered, parsed when it is JSON
    #[schema(value_type = Object)]
    response: Value,
}

impl BookingAccepted {
    pub const MESSAGE: &'static str = "Ricevuto ✅ Il locale confermerà appena possibile.";

    pub fn new(response: Value) -> Self {
        Self {
            ok: true,
            message: Self::MESSAGE.to_string(),
            response,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingsPage {
    ok: bool,
    /// Rows as stored by the backend, either arrays or keyed objects
    #[schema(value_type = Vec<Object>)]
    rows: Vec<Value>,
    count: u64,
}

impl From<BookingList> for BookingsPage {
    fn from(value: BookingList) -> Self {
        Self {
            ok: true,
            rows: value.rows,
            count: value.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Settings {
    ok: bool,
    #[schema(value_type = Object)]
    settings: Value,
    /// [None] when the backend did not report a usable value
    bookings_open: Option<bool>,
}

impl From<SettingsSnapshot> for Settings {
    fn from(value: SettingsSnapshot) -> Self {
        Self {
            ok: true,
            settings: value.settings,
            bookings_open: value.bookings_open,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Via {
    Post,
    Get,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChanged {
    ok: bool,
    /// Which encoding reached the backend
    via: Via,
    #[schema(value_type = Object)]
    response: Value,
}

impl From<StatusUpdated> for StatusChanged {
    fn from(value: StatusUpdated) -> Self {
        let via = match value.via {
            Transport::Post => Via::Post,
            Transport::Get => Via::Get,
        };

        Self {
            ok: true,
            via,
            response: value.response,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`
    ok: bool,
    error: String,
    #[schema(value_type = Option<Object>)]
    detail: Option<Value>,
}
