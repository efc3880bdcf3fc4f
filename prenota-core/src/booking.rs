use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    is_valid_date, is_valid_time, loose_count, normalize_date, normalize_time, BookingStatus,
};

/// How the customer wants to receive the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingKind {
    /// Take-away, used by the restaurant form
    Asporto,
    /// Pick-up at the laboratory
    Ritiro,
    Consegna,
    Tavolo,
}

impl BookingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asporto => "ASPORTO",
            Self::Ritiro => "RITIRO",
            Self::Consegna => "CONSEGNA",
            Self::Tavolo => "TAVOLO",
        }
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::Consegna)
    }
}

impl Display for BookingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingKind {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ASPORTO" => Ok(Self::Asporto),
            "RITIRO" => Ok(Self::Ritiro),
            "CONSEGNA" => Ok(Self::Consegna),
            "TAVOLO" => Ok(Self::Tavolo),
            _ => Err(BookingError::InvalidKind),
        }
    }
}

/// Reasons a booking is refused before it reaches the backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    /// The hidden anti-spam field was filled in
    #[error("Richiesta non valida.")]
    Spam,
    #[error("Campi obbligatori mancanti (nome, telefono, tipo, data, ora, ordine/prenotazione).")]
    MissingFields,
    #[error("Tipo non valido.")]
    InvalidKind,
    #[error("Formato data non valido (YYYY-MM-DD o DD/MM/YYYY).")]
    InvalidDate,
    #[error("Formato ora non valido (HH:mm).")]
    InvalidTime,
    #[error("Per la consegna serve l'indirizzo.")]
    MissingAddress,
    #[error("Per il tavolo serve il numero persone.")]
    MissingPartySize,
}

/// A booking as submitted by the public form. Every field is optional and
/// loosely typed, numbers are accepted wherever text is expected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookingRequest {
    #[serde(deserialize_with = "loose_text")]
    pub nome: String,
    #[serde(deserialize_with = "loose_text")]
    pub telefono: String,
    #[serde(deserialize_with = "loose_text")]
    pub tipo: String,
    #[serde(deserialize_with = "loose_text")]
    pub data: String,
    #[serde(deserialize_with = "loose_text")]
    pub ora: String,
    #[serde(deserialize_with = "loose_text")]
    pub ordine: String,
    #[serde(deserialize_with = "loose_u32")]
    pub scatola50: u32,
    #[serde(deserialize_with = "loose_u32")]
    pub scatola100: u32,
    #[serde(deserialize_with = "loose_u32")]
    pub scatola200: u32,
    #[serde(deserialize_with = "loose_text")]
    pub indirizzo: String,
    #[serde(deserialize_with = "loose_text")]
    pub persone: String,
    #[serde(deserialize_with = "loose_text")]
    pub pagamento: String,
    #[serde(deserialize_with = "loose_text")]
    pub allergeni: String,
    #[serde(deserialize_with = "loose_text")]
    pub note: String,
    #[serde(deserialize_with = "loose_text")]
    pub negozio: String,
    #[serde(deserialize_with = "loose_text")]
    pub canale: String,
    #[serde(deserialize_with = "loose_text")]
    pub honeypot: String,
}

/// The booking in the shape the backend stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardedBooking {
    pub ts: String,
    pub negozio: String,
    pub nome: String,
    pub telefono: String,
    pub tipo: BookingKind,
    pub data: String,
    pub ora: String,
    pub ordine: String,
    pub scatola50: u32,
    pub scatola100: u32,
    pub scatola200: u32,
    pub totale_arrosticini: u32,
    pub indirizzo: String,
    pub persone: String,
    pub pagamento: String,
    pub allergeni: String,
    pub note: String,
    pub stato: BookingStatus,
    pub canale: String,
}

impl BookingRequest {
    pub const DEFAULT_CHANNEL: &'static str = "APP";

    /// Total pieces across all boxes
    pub fn total(&self) -> u32 {
        self.scatola50
            .saturating_mul(50)
            .saturating_add(self.scatola100.saturating_mul(100))
            .saturating_add(self.scatola200.saturating_mul(200))
    }

    /// Normalizes and validates the request, producing what gets forwarded.
    /// Checks run in a fixed order so the first problem is the one reported.
    pub fn validate(
        &self,
        now: DateTime<Utc>,
        default_shop: &str,
    ) -> Result<ForwardedBooking, BookingError> {
        if !self.honeypot.trim().is_empty() {
            return Err(BookingError::Spam);
        }

        let nome = self.nome.trim();
        let telefono = self.telefono.trim();
        let tipo = self.tipo.trim();
        let data = normalize_date(&self.data);
        let ora = normalize_time(&self.ora);

        let ordine = match self.ordine.trim() {
            "" => self.boxes_summary(),
            ordine => ordine.to_string(),
        };

        let required: [&str; 6] = [nome, telefono, tipo, &data, &ora, &ordine];
        if required.iter().any(|field| field.is_empty()) {
            return Err(BookingError::MissingFields);
        }

        let tipo: BookingKind = tipo.parse()?;

        if !is_valid_date(&data) {
            return Err(BookingError::InvalidDate);
        }

        if !is_valid_time(&ora) {
            return Err(BookingError::InvalidTime);
        }

        let indirizzo = self.indirizzo.trim();
        let persone = self.persone.trim();

        if tipo == BookingKind::Consegna && indirizzo.is_empty() {
            return Err(BookingError::MissingAddress);
        }

        if tipo == BookingKind::Tavolo && persone.is_empty() {
            return Err(BookingError::MissingPartySize);
        }

        let negozio = match self.negozio.trim() {
            "" => default_shop.to_string(),
            negozio => negozio.to_string(),
        };

        let canale = match self.canale.trim() {
            "" => Self::DEFAULT_CHANNEL.to_string(),
            canale => canale.to_uppercase(),
        };

        Ok(ForwardedBooking {
            ts: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            negozio,
            nome: nome.to_string(),
            telefono: telefono.to_string(),
            tipo,
            data,
            ora,
            ordine,
            scatola50: self.scatola50,
            scatola100: self.scatola100,
            scatola200: self.scatola200,
            totale_arrosticini: self.total(),
            indirizzo: if tipo.is_delivery() {
                indirizzo.to_string()
            } else {
                String::new()
            },
            persone: if tipo == BookingKind::Tavolo {
                persone.to_string()
            } else {
                String::new()
            },
            pagamento: self.pagamento.trim().to_string(),
            allergeni: self.allergeni.trim().to_string(),
            note: self.note.trim().to_string(),
            stato: BookingStatus::Nuova,
            canale,
        })
    }

    /// A compact description of the boxes, like `2x50 + 1x200`
    fn boxes_summary(&self) -> String {
        [
            (self.scatola50, 50),
            (self.scatola100, 100),
            (self.scatola200, 200),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, size)| format!("{count}x{size}"))
        .collect::<Vec<_>>()
        .join(" + ")
    }
}

/// Renders a JSON scalar the way a form would have typed it.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Deserializes any JSON scalar as text, absent and `null` as empty.
pub fn loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(text_of).unwrap_or_default())
}

fn loose_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(loose_count(value.as_ref()))
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 1, 9, 30, 0).unwrap()
    }

    fn request(body: Value) -> BookingRequest {
        serde_json::from_value(body).expect("request deserializes")
    }

    fn valid() -> Value {
        json!({
            "nome": " Mario ",
            "telefono": "3331234567",
            "tipo": "ritiro",
            "data": "30/12/2025",
            "ora": "12.30",
            "scatola50": 2,
            "scatola100": "1",
        })
    }

    #[test]
    fn test_valid_booking() {
        let forwarded = request(valid()).validate(now(), "Laboratorio").unwrap();

        assert_eq!(forwarded.nome, "Mario");
        assert_eq!(forwarded.tipo, BookingKind::Ritiro);
        assert_eq!(forwarded.data, "2025-12-30");
        assert_eq!(forwarded.ora, "12:30");
        assert_eq!(forwarded.ordine, "2x50 + 1x100");
        assert_eq!(forwarded.totale_arrosticini, 200);
        assert_eq!(forwarded.negozio, "Laboratorio");
        assert_eq!(forwarded.canale, "APP");
        assert_eq!(forwarded.stato, BookingStatus::Nuova);
        assert_eq!(forwarded.ts, "2025-12-01T09:30:00.000Z");
    }

    #[test]
    fn test_forwarded_shape() {
        let forwarded = request(valid()).validate(now(), "Laboratorio").unwrap();
        let value = serde_json::to_value(&forwarded).unwrap();

        assert_eq!(value["tipo"], "RITIRO");
        assert_eq!(value["stato"], "NUOVA");
        assert_eq!(value["totaleArrosticini"], 200);
        assert_eq!(value["scatola50"], 2);
    }

    #[test]
    fn test_spam() {
        let mut body = valid();
        body["honeypot"] = json!("http://spam");

        assert_eq!(
            request(body).validate(now(), "x"),
            Err(BookingError::Spam)
        );
    }

    #[test]
    fn test_missing_fields() {
        let mut body = valid();
        body["nome"] = json!("   ");
        assert_eq!(
            request(body).validate(now(), "x"),
            Err(BookingError::MissingFields)
        );

        let mut body = valid();
        body["scatola50"] = json!(0);
        body["scatola100"] = json!(0);
        assert_eq!(
            request(body).validate(now(), "x"),
            Err(BookingError::MissingFields),
            "an order needs text or at least one box"
        );
    }

    #[test]
    fn test_invalid_kind_date_time() {
        let mut body = valid();
        body["tipo"] = json!("DRONE");
        assert_eq!(request(body).validate(now(), "x"), Err(BookingError::InvalidKind));

        let mut body = valid();
        body["data"] = json!("domani");
        assert_eq!(request(body).validate(now(), "x"), Err(BookingError::InvalidDate));

        let mut body = valid();
        body["ora"] = json!("mezzogiorno");
        assert_eq!(request(body).validate(now(), "x"), Err(BookingError::InvalidTime));
    }

    #[test]
    fn test_delivery_needs_address() {
        let mut body = valid();
        body["tipo"] = json!("CONSEGNA");
        body["indirizzo"] = json!("");

        let err = request(body).validate(now(), "x").unwrap_err();
        assert_eq!(err, BookingError::MissingAddress);
        assert!(err.to_string().contains("serve l'indirizzo"));
    }

    #[test]
    fn test_table_needs_party_size() {
        let mut body = valid();
        body["tipo"] = json!("TAVOLO");
        assert_eq!(
            request(body.clone()).validate(now(), "x"),
            Err(BookingError::MissingPartySize)
        );

        body["persone"] = json!(4);
        body["indirizzo"] = json!("Via Roma 1");
        let forwarded = request(body).validate(now(), "x").unwrap();
        assert_eq!(forwarded.persone, "4");
        assert_eq!(forwarded.indirizzo, "", "address only travels with deliveries");
    }

    #[test]
    fn test_free_text_order() {
        let body = json!({
            "nome": "Anna",
            "telefono": 3331234567u64,
            "tipo": "asporto",
            "data": "2025-12-30",
            "ora": 20,
            "ordine": "2 margherite",
            "canale": "webapp",
            "negozio": "Pala Pizza",
        });

        let forwarded = request(body).validate(now(), "x").unwrap();
        assert_eq!(forwarded.telefono, "3331234567");
        assert_eq!(forwarded.ora, "20:00");
        assert_eq!(forwarded.ordine, "2 margherite");
        assert_eq!(forwarded.canale, "WEBAPP");
        assert_eq!(forwarded.negozio, "Pala Pizza");
    }
}
