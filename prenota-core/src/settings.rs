use serde_json::Value;

use crate::recognize_bool;

/// Extracts the bookings-open flag from whatever shape the backend answered with.
///
/// Known spellings are tried in order, a value that doesn't read as a boolean
/// falls through to the next one. [None] means no usable value was reported.
pub fn bookings_open_of(payload: &Value) -> Option<bool> {
    let settings = payload.get("settings");

    let candidates = [
        payload.get("bookings_open"),
        payload.get("bookingsOpen"),
        settings.and_then(|s| s.get("bookings_open")),
        settings.and_then(|s| s.get("bookingsOpen")),
        keyed_value(payload),
        settings.and_then(keyed_value),
        payload.get("value"),
    ];

    candidates.into_iter().flatten().find_map(recognize_bool)
}

/// A missing flag must not block legitimate bookings, so it reads as open.
pub fn is_open_or_default(flag: Option<bool>) -> bool {
    flag.unwrap_or(true)
}

// Handles `{ key: "bookings_open", value: ... }` rows straight from the sheet
fn keyed_value(payload: &Value) -> Option<&Value> {
    match payload.get("key").and_then(Value::as_str) {
        Some("bookings_open") => payload.get("value"),
        _ => None,
    }
}
