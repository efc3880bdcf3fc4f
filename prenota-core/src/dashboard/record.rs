use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{is_valid_date, loose_count, text_of, BookingStatus};

/// A booking as shown on the dashboard, parsed from a backend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub nome: String,
    pub telefono: String,
    pub tipo: String,
    pub data_iso: String,
    pub ora: String,
    pub s50: u32,
    pub s100: u32,
    pub s200: u32,
    pub tot: u32,
    pub indirizzo: String,
    pub stato: BookingStatus,
    pub note: String,
    pub timestamp_iso: String,
}

/// Identifies a booking across reloads
pub type BookingId = String;

/// A column position and the keys the column may be found under
type Column = (usize, &'static [&'static str]);

const NOME: Column = (0, &["Nome", "nome"]);
const TELEFONO: Column = (1, &["Telefono", "telefono"]);
const TIPO: Column = (2, &["Ritiro/Consegna", "tipo"]);
const DATA: Column = (3, &["Data", "data", "date"]);
const ORA: Column = (4, &["Ora", "ora"]);
const S50: Column = (5, &["Scatola 50", "scatola50"]);
const S100: Column = (6, &["Scatola 100", "scatola100"]);
const S200: Column = (7, &["Scatola 200", "scatola200"]);
const TOTALE: Column = (8, &["Totale Arrosticini", "totaleArrosticini", "tot"]);
const INDIRIZZO: Column = (9, &["Indirizzo", "indirizzo"]);
const STATO: Column = (10, &["Stato", "stato"]);
const NOTE: Column = (11, &["Note", "note"]);
const TIMESTAMP: Column = (12, &["Timestamp", "timestamp"]);

impl Booking {
    /// Parses a row that is either a positional array or an object keyed by
    /// sheet headers or field names.
    pub fn from_row(row: &Value) -> Self {
        let get = |col: Column| column(row, col);
        let text = |col: Column| get(col).map(text_of).unwrap_or_default().trim().to_string();

        Self {
            nome: text(NOME),
            telefono: text(TELEFONO),
            tipo: text(TIPO).to_uppercase(),
            data_iso: iso_date_of(&text(DATA)),
            ora: text(ORA),
            s50: loose_count(get(S50)),
            s100: loose_count(get(S100)),
            s200: loose_count(get(S200)),
            tot: loose_count(get(TOTALE)),
            indirizzo: text(INDIRIZZO),
            // Rows written before statuses existed have an empty cell
            stato: text(STATO).parse().unwrap_or(BookingStatus::Nuova),
            note: text(NOTE),
            timestamp_iso: iso_timestamp_of(&text(TIMESTAMP)),
        }
    }

    /// The timestamp when known, otherwise a composite of the identifying fields.
    pub fn id(&self) -> BookingId {
        if !self.timestamp_iso.is_empty() {
            return self.timestamp_iso.clone();
        }

        format!(
            "{}|{}|{}|{}|{}",
            self.telefono, self.data_iso, self.ora, self.tipo, self.tot
        )
    }

    fn sort_key(&self) -> String {
        format!("{} {}", self.data_iso, self.ora).trim().to_string()
    }
}

fn column(row: &Value, (index, keys): Column) -> Option<&Value> {
    match row {
        Value::Array(items) => items.get(index),
        Value::Object(map) => keys
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|value| !value.is_null()),
        _ => None,
    }
}

/// Parses rows and orders them by date and time, then by arrival.
pub fn parse_rows(rows: &[Value]) -> Vec<Booking> {
    let mut bookings: Vec<_> = rows.iter().map(Booking::from_row).collect();

    bookings.sort_by(|a, b| {
        a.sort_key()
            .cmp(&b.sort_key())
            .then_with(|| a.timestamp_iso.cmp(&b.timestamp_iso))
    });

    bookings
}

/// Sheets hand dates back as full timestamps, so they're reduced to the local day.
fn iso_date_of(input: &str) -> String {
    if input.is_empty() || is_valid_date(input) {
        return input.to_string();
    }

    match DateTime::parse_from_rfc3339(input) {
        Ok(date) => date.with_timezone(&Local).format("%Y-%m-%d").to_string(),
        Err(_) => input.to_string(),
    }
}

fn iso_timestamp_of(input: &str) -> String {
    match DateTime::parse_from_rfc3339(input) {
        Ok(date) => date
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        Err(_) => input.to_string(),
    }
}
