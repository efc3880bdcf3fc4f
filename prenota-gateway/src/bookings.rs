use log::{info, warn};
use prenota_core::{ForwardedBooking, StatusUpdate};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Gateway, GatewayError};

/// How many rows the dashboard asks for
pub const LIST_LIMIT: u32 = 300;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingList {
    pub rows: Vec<Value>,
    pub count: u64,
}

/// Which encoding carried a status update through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Post,
    Get,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdated {
    pub via: Transport,
    pub response: Value,
}

impl Gateway {
    pub async fn list_bookings(&self) -> Result<BookingList, GatewayError> {
        let url = self.config.script_url()?;
        let secret = self.config.script_secret()?;

        info!("Listing bookings");

        let limit = LIST_LIMIT.to_string();
        let request = self.client.get(url).query(&[
            ("action", "list"),
            ("limit", limit.as_str()),
            ("secret", secret),
        ]);

        let body = self
            .execute(request)
            .await?
            .into_result("Errore lista prenotazioni")?;

        let rows = match body.get("rows") {
            Some(Value::Array(rows)) => rows.clone(),
            _ => vec![],
        };
        let count = body.get("count").and_then(Value::as_u64).unwrap_or(0);

        Ok(BookingList { rows, count })
    }

    /// Hands a validated booking to the intake endpoint. Answers that aren't
    /// JSON are passed back as plain text.
    pub async fn submit_booking(&self, booking: &ForwardedBooking) -> Result<Value, GatewayError> {
        let url = self.config.booking_url()?;
        let payload = serde_json::to_string(booking)?;

        info!("Forwarding booking for {} on {}", booking.data, booking.ora);

        // The intake script only accepts JSON sent as text/plain
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(payload);

        let reply = self.execute(request).await?;

        if !reply.status.is_success() {
            warn!("Booking intake answered {}", reply.status);

            return Err(GatewayError::Intake {
                status: reply.status.as_u16(),
                detail: reply.text,
            });
        }

        match serde_json::from_str(&reply.text) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(reply.text)),
        }
    }

    /// Changes a booking's status, first as a JSON action and, if that fails
    /// for any reason, once more as a query string GET.
    pub async fn update_status(&self, update: &StatusUpdate) -> Result<StatusUpdated, GatewayError> {
        let url = self.config.script_url()?;
        let secret = self.config.script_secret()?;

        let fields = update.fields();

        info!("Updating booking status to {}", update.status);

        let body: Map<String, Value> = fields
            .iter()
            .map(|(key, value)| (key.to_string(), Value::from(value.as_str())))
            .collect();

        match self
            .action("updateStatus", body, "Errore aggiornando lo stato.")
            .await
        {
            Ok(response) => {
                return Ok(StatusUpdated {
                    via: Transport::Post,
                    response,
                })
            }
            Err(e) => warn!("updateStatus via POST failed, retrying as GET: {e}"),
        }

        let mut query: Vec<(&str, &str)> = vec![("action", "updateStatus")];
        query.extend(fields.iter().map(|(key, value)| (*key, value.as_str())));
        query.push(("secret", secret));

        let request = self.client.get(url).query(&query);
        let response = self
            .execute(request)
            .await?
            .into_result("Errore aggiornando lo stato.")?;

        Ok(StatusUpdated {
            via: Transport::Get,
            response,
        })
    }
}
