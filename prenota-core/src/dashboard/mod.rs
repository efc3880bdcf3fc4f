use async_trait::async_trait;
use log::{info, warn};
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

use crate::{is_open_or_default, BookingStatus, StatusUpdate};

mod command;
mod filter;
mod notify;
mod record;
mod tracker;

pub use command::*;
pub use filter::*;
pub use notify::*;
pub use record::*;
pub use tracker::*;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PanelError {
    /// The session cookie is missing or no longer valid, the user must log in again
    #[error("Non autorizzato")]
    Unauthorized,
    /// The server answered with `ok: false`
    #[error("{0}")]
    Rejected(String),
    #[error("Errore rete: {0}")]
    Network(String),
    #[error("Passaggio di stato non consentito: {from} -> {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("Prenotazione non trovata")]
    NotFound,
}

/// The admin API as seen by the dashboard.
#[async_trait]
pub trait PanelApi: Send + Sync {
    async fn login(&self, password: &str) -> Result<(), PanelError>;
    async fn logout(&self) -> Result<(), PanelError>;
    /// Raw rows, in whatever shape the backend stores them
    async fn list_bookings(&self) -> Result<Vec<Value>, PanelError>;
    async fn update_status(&self, update: &StatusUpdate) -> Result<(), PanelError>;
    async fn settings(&self) -> Result<Option<bool>, PanelError>;
    async fn set_bookings_open(&self, open: bool) -> Result<Option<bool>, PanelError>;
}

#[derive(Debug, Default)]
struct DashboardState {
    bookings: Vec<Booking>,
    tracker: ArrivalTracker,
    bookings_open: Option<bool>,
    last_error: Option<String>,
}

/// Client-side state of the admin dashboard.
pub struct Dashboard<A> {
    api: A,
    state: Mutex<DashboardState>,
}

impl<A> Dashboard<A>
where
    A: PanelApi,
{
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Default::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Reloads the bookings and reports what arrived since the last reload.
    pub async fn refresh(&self) -> Result<Arrivals, PanelError> {
        let result = self.api.list_bookings().await;
        let mut state = self.state.lock();

        match result {
            Ok(rows) => {
                let bookings = parse_rows(&rows);
                let arrivals = state.tracker.observe(&bookings);

                if !arrivals.is_empty() {
                    info!("{} new booking(s) arrived", arrivals.count);
                }

                state.bookings = bookings;
                state.last_error = None;

                Ok(arrivals)
            }
            Err(e) => {
                warn!("Could not load bookings: {e}");

                state.bookings.clear();
                state.last_error = Some(e.to_string());

                Err(e)
            }
        }
    }

    /// Rereads the bookings-open flag. Failures leave it unknown rather than failing.
    pub async fn refresh_settings(&self) -> Option<bool> {
        let flag = match self.api.settings().await {
            Ok(flag) => flag,
            Err(e) => {
                warn!("Could not load settings: {e}");
                None
            }
        };

        self.state.lock().bookings_open = flag;
        flag
    }

    /// Moves a booking to another status, showing the change right away and
    /// undoing it if the server refuses.
    pub async fn change_status(&self, id: &str, next: BookingStatus) -> Result<(), PanelError> {
        let (change, update) = {
            let mut state = self.state.lock();
            let change = StatusChange::apply(&mut state.bookings, id, next)?;

            state.tracker.unflag(id);
            state.last_error = None;

            let update = state
                .bookings
                .iter()
                .find(|b| b.id() == id)
                .map(|b| {
                    StatusUpdate::new(
                        next.as_str(),
                        Some(&b.timestamp_iso),
                        Some(&b.telefono),
                        Some(&b.data_iso),
                        Some(&b.ora),
                    )
                })
                .ok_or(PanelError::NotFound);

            (change, update)
        };

        let result = match update {
            Ok(Ok(update)) => self.api.update_status(&update).await,
            Ok(Err(e)) => Err(PanelError::Rejected(e.to_string())),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            let mut state = self.state.lock();

            change.revert(&mut state.bookings);
            state.last_error = Some(e.to_string());

            return Err(e);
        }

        info!("Booking {id} moved to {next}");

        // The change already went through, a failed reload shows up in last_error
        let _ = self.refresh().await;
        Ok(())
    }

    /// Flips the bookings-open flag. An unknown flag counts as open.
    pub async fn toggle_bookings(&self) -> Result<Option<bool>, PanelError> {
        let next = {
            let mut state = self.state.lock();
            let next = !is_open_or_default(state.bookings_open);

            state.bookings_open = Some(next);
            state.last_error = None;
            next
        };

        match self.api.set_bookings_open(next).await {
            Ok(_) => Ok(self.refresh_settings().await),
            Err(e) => {
                self.refresh_settings().await;
                self.state.lock().last_error = Some(e.to_string());

                Err(e)
            }
        }
    }

    pub async fn login(&self, password: &str) -> Result<(), PanelError> {
        self.api.login(password).await
    }

    pub async fn logout(&self) -> Result<(), PanelError> {
        self.api.logout().await
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.state.lock().bookings.clone()
    }

    pub fn filtered(&self, filter: &BookingFilter) -> Vec<Booking> {
        let state = self.state.lock();
        filter.apply(&state.bookings).into_iter().cloned().collect()
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::of(&self.state.lock().bookings)
    }

    pub fn bookings_open(&self) -> Option<bool> {
        self.state.lock().bookings_open
    }

    pub fn is_flagged(&self, id: &str) -> bool {
        self.state.lock().tracker.is_flagged(id)
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }
}
