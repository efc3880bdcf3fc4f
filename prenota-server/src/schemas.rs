use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    Json,
};
use prenota_core::loose_text;
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ServerError;

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginSchema {
    #[validate(length(max = 128))]
    pub password: String,
}

/// Admin request to move a booking to another status. Identifies the booking
/// by `timestampISO`, or by `telefono`, `dataISO` and `ora` together.
#[derive(Debug, Default, ToSchema, Deserialize)]
#[serde(default)]
pub struct StatusUpdateSchema {
    /// Always `updateStatus`, accepted for compatibility
    #[serde(deserialize_with = "loose_text")]
    pub action: String,
    #[serde(deserialize_with = "loose_text")]
    pub stato: String,
    #[serde(rename = "timestampISO", deserialize_with = "loose_text")]
    pub timestamp_iso: String,
    #[serde(deserialize_with = "loose_text")]
    pub telefono: String,
    #[serde(rename = "dataISO", deserialize_with = "loose_text")]
    pub data_iso: String,
    #[serde(deserialize_with = "loose_text")]
    pub ora: String,
}

/// Loose boolean for the bookings flag: the first of `value`, `open`,
/// `bookings_open` or `bookingsOpen`, as a boolean, `1`/`0` or a yes/no word.
#[derive(Debug, ToSchema)]
#[schema(example = json!({ "value": true }))]
pub struct BookingsOpenSchema {
    pub value: bool,
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|_| ServerError::Invalid("JSON non valido.".to_string()))?;

        extracted_json.0.validate()?;

        Ok(Self(extracted_json.0))
    }
}

/// A JSON body where anything unreadable counts as an empty one, so that the
/// handler reports what is missing instead of a parse failure.
pub struct LenientJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for LenientJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ServerError::Invalid("Richiesta non valida.".to_string()))?;

        Ok(Self(serde_json::from_slice(&bytes).unwrap_or_default()))
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_update_schema_is_loose() {
        let schema: StatusUpdateSchema = serde_json::from_value(json!({
            "action": "updateStatus",
            "stato": "confermata",
            "telefono": 3331234567u64,
            "dataISO": "2025-12-30",
            "ora": "12:30",
            "timestampISO": null,
        }))
        .unwrap();

        assert_eq!(schema.telefono, "3331234567");
        assert_eq!(schema.timestamp_iso, "");
        assert_eq!(schema.data_iso, "2025-12-30");
    }
}
