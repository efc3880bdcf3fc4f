use crate::{Booking, BookingId, BookingStatus, PanelError};

/// A tentative status change, applied locally before the backend confirms it.
/// Reverting restores the previous status if nothing else touched the booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub id: BookingId,
    pub previous: BookingStatus,
    pub next: BookingStatus,
}

impl StatusChange {
    pub fn apply(
        bookings: &mut [Booking],
        id: &str,
        next: BookingStatus,
    ) -> Result<Self, PanelError> {
        let booking = bookings
            .iter_mut()
            .find(|b| b.id() == id)
            .ok_or(PanelError::NotFound)?;

        let previous = booking.stato;

        if !previous.can_transition_to(next) {
            return Err(PanelError::InvalidTransition {
                from: previous,
                to: next,
            });
        }

        booking.stato = next;

        Ok(Self {
            id: id.to_string(),
            previous,
            next,
        })
    }

    pub fn revert(&self, bookings: &mut [Booking]) {
        let booking = bookings
            .iter_mut()
            .find(|b| b.id() == self.id && b.stato == self.next);

        if let Some(booking) = booking {
            booking.stato = self.previous;
        }
    }
}
