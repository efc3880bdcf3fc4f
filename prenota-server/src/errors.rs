use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::warn;
use prenota_core::{BookingError, LooseBoolError, StatusUpdateError};
use prenota_gateway::GatewayError;
use serde_json::{json, Value};
use thiserror::Error;
use validator::ValidationErrors;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// A required setting is absent, named by its environment variable
    #[error("{0} mancante")]
    MissingConfig(&'static str),
    #[error("Non autorizzato")]
    Unauthorized,
    #[error("Password errata")]
    WrongPassword,
    #[error("{0}")]
    Invalid(String),
    #[error("Prenotazioni momentaneamente chiuse.")]
    BookingsClosed,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::WrongPassword => StatusCode::UNAUTHORIZED,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::BookingsClosed => StatusCode::FORBIDDEN,
            Self::Gateway(e) => match e {
                GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                GatewayError::Network(_) | GatewayError::Intake { .. } => StatusCode::BAD_GATEWAY,
                GatewayError::Upstream {
                    unauthorized: true, ..
                } => StatusCode::UNAUTHORIZED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::MissingConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<Value> {
        match self {
            Self::Gateway(GatewayError::Upstream { detail, .. }) => Some(detail.clone()),
            Self::Gateway(GatewayError::Intake { detail, .. }) => Some(detail.as_str().into()),
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.as_status_code();

        if status.is_server_error() {
            warn!("Request failed with {}: {}", status.as_u16(), self);
        }

        let mut body = json!({
            "ok": false,
            "error": self.to_string(),
        });

        if let Some(detail) = self.detail() {
            body["detail"] = detail;
        }

        (status, Json(body)).into_response()
    }
}

impl From<BookingError> for ServerError {
    fn from(value: BookingError) -> Self {
        Self::Invalid(value.to_string())
    }
}

impl From<StatusUpdateError> for ServerError {
    fn from(value: StatusUpdateError) -> Self {
        Self::Invalid(value.to_string())
    }
}

impl From<LooseBoolError> for ServerError {
    fn from(value: LooseBoolError) -> Self {
        Self::Invalid(value.to_string())
    }
}

impl From<ValidationErrors> for ServerError {
    fn from(_: ValidationErrors) -> Self {
        Self::Invalid("Richiesta non valida.".to_string())
    }
}
