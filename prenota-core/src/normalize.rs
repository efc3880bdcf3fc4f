use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

lazy_static! {
    static ref ISO_DATE_REGEX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref ITALIAN_DATE_REGEX: Regex = Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").unwrap();
    static ref TIME_REGEX: Regex = Regex::new(r"^\d{2}:\d{2}$").unwrap();
    static ref DOTTED_TIME_REGEX: Regex = Regex::new(r"^(\d{1,2})\.(\d{2})$").unwrap();
    static ref HOUR_REGEX: Regex = Regex::new(r"^(\d{1,2})$").unwrap();
}

/// The keys a loose boolean may be sent under, in lookup order.
pub const LOOSE_BOOL_KEYS: [&str; 4] = ["value", "open", "bookings_open", "bookingsOpen"];

const TRUTHY: [&str; 4] = ["true", "yes", "y", "on"];
const FALSY: [&str; 4] = ["false", "no", "n", "off"];

/// Rewrites `DD/MM/YYYY` into `YYYY-MM-DD`.
/// Anything that isn't recognized is returned trimmed but otherwise untouched,
/// so it must be checked with [is_valid_date] afterwards.
pub fn normalize_date(input: &str) -> String {
    let input = input.trim();

    if ISO_DATE_REGEX.is_match(input) {
        return input.to_string();
    }

    if let Some(captures) = ITALIAN_DATE_REGEX.captures(input) {
        return format!("{}-{}-{}", &captures[3], &captures[2], &captures[1]);
    }

    input.to_string()
}

/// Rewrites `12.30` into `12:30` and `9` into `09:00`.
/// Like [normalize_date], unknown input passes through.
pub fn normalize_time(input: &str) -> String {
    let input = input.trim();

    if TIME_REGEX.is_match(input) {
        return input.to_string();
    }

    if let Some(captures) = DOTTED_TIME_REGEX.captures(input) {
        return format!("{:0>2}:{}", &captures[1], &captures[2]);
    }

    if let Some(captures) = HOUR_REGEX.captures(input) {
        return format!("{:0>2}:00", &captures[1]);
    }

    input.to_string()
}

pub fn is_valid_date(input: &str) -> bool {
    ISO_DATE_REGEX.is_match(input)
}

pub fn is_valid_time(input: &str) -> bool {
    TIME_REGEX.is_match(input)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LooseBoolError {
    /// None of the accepted keys were present in the body
    #[error("Manca 'value' (o 'open' / 'bookings_open') nel body.")]
    Missing,
}

/// Reads a boolean out of a loosely typed body.
///
/// The first non-null value under [LOOSE_BOOL_KEYS] is used. A body without
/// any of them is an error, which keeps "absent" apart from "false".
pub fn parse_bool_loose(body: &Value) -> Result<bool, LooseBoolError> {
    let raw = LOOSE_BOOL_KEYS
        .iter()
        .filter_map(|key| body.get(key))
        .find(|value| !value.is_null())
        .ok_or(LooseBoolError::Missing)?;

    Ok(recognize_bool(raw).unwrap_or_else(|| is_truthy(raw)))
}

/// Returns the boolean a value spells out, if it is one of the recognized forms.
pub fn recognize_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1. => Some(true),
            Some(x) if x == 0. => Some(false),
            _ => None,
        },
        Value::String(s) => {
            let s = s.trim().to_lowercase();

            if s == "1" || TRUTHY.contains(&s.as_str()) {
                Some(true)
            } else if s == "0" || FALSY.contains(&s.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|x| x != 0. && !x.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads a count out of a number or a numeric string, treating anything else as zero.
pub fn loose_count(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|x| *x >= 0.).map(|x| x as u64))
            .map(|x| x.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        Some(Value::String(s)) => leading_integer(s).unwrap_or(0),
        _ => 0,
    }
}

fn leading_integer(input: &str) -> Option<u32> {
    let digits: String = input
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}
