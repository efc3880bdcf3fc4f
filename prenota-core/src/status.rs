use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The lifecycle of a booking as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Nuova,
    Confermata,
    Consegnata,
    Annullata,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        Self::Nuova,
        Self::Confermata,
        Self::Consegnata,
        Self::Annullata,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nuova => "NUOVA",
            Self::Confermata => "CONFERMATA",
            Self::Consegnata => "CONSEGNATA",
            Self::Annullata => "ANNULLATA",
        }
    }

    /// Whether the dashboard may move a booking from this status to `next`.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        match (self, next) {
            (Self::Nuova, Self::Confermata) => true,
            (Self::Confermata, Self::Consegnata) => true,
            (Self::Annullata, Self::Annullata) => false,
            (_, Self::Annullata) => true,
            _ => false,
        }
    }

    /// The statuses that can be reached from this one, in button order.
    pub fn available_actions(&self) -> Vec<BookingStatus> {
        Self::ALL
            .into_iter()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Stato non valido: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for BookingStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NUOVA" => Ok(Self::Nuova),
            "CONFERMATA" => Ok(Self::Confermata),
            "CONSEGNATA" => Ok(Self::Consegnata),
            "ANNULLATA" => Ok(Self::Annullata),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusUpdateError {
    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatus),
    #[error("Serve timestampISO oppure telefono + dataISO + ora per identificare la prenotazione.")]
    MissingIdentifier,
}

/// A request to move a booking to another status.
///
/// The backend matches the booking on its timestamp, or on the
/// (telefono, data, ora) triple when the timestamp is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: BookingStatus,
    pub timestamp: Option<String>,
    pub telefono: Option<String>,
    pub data: Option<String>,
    pub ora: Option<String>,
}

impl StatusUpdate {
    /// Validates raw input into an update, failing before anything is sent.
    pub fn new(
        status: &str,
        timestamp: Option<&str>,
        telefono: Option<&str>,
        data: Option<&str>,
        ora: Option<&str>,
    ) -> Result<Self, StatusUpdateError> {
        let status: BookingStatus = status.parse()?;

        let update = Self {
            status,
            timestamp: non_empty(timestamp),
            telefono: non_empty(telefono),
            data: non_empty(data),
            ora: non_empty(ora),
        };

        let has_composite =
            update.telefono.is_some() && update.data.is_some() && update.ora.is_some();

        if update.timestamp.is_none() && !has_composite {
            return Err(StatusUpdateError::MissingIdentifier);
        }

        Ok(update)
    }

    /// The fields in their wire names, shared by every encoding of the update.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("stato", self.status.to_string())];

        let optional = [
            ("timestampISO", &self.timestamp),
            ("telefono", &self.telefono),
            ("dataISO", &self.data),
            ("ora", &self.ora),
        ];

        for (key, value) in optional {
            if let Some(value) = value {
                fields.push((key, value.clone()));
            }
        }

        fields
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
