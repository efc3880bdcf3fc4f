use std::collections::HashSet;

use crate::{Booking, BookingId, BookingStatus};

/// Remembers which bookings were already seen, to highlight the ones that
/// arrive while the dashboard is open.
#[derive(Debug, Default)]
pub struct ArrivalTracker {
    seen: HashSet<BookingId>,
    flagged: HashSet<BookingId>,
    seeded: bool,
}

/// What changed since the previous observation
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Arrivals {
    /// Bookings never seen before, whatever their status
    pub count: usize,
    /// Ids that got newly highlighted
    pub flagged: Vec<BookingId>,
}

impl Arrivals {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl ArrivalTracker {
    /// Records a fresh list of bookings.
    ///
    /// The first observation only seeds the seen set, so nothing already in
    /// the sheet gets highlighted when the dashboard opens.
    pub fn observe(&mut self, bookings: &[Booking]) -> Arrivals {
        if !self.seeded {
            self.seeded = true;
            self.seen = bookings.iter().map(Booking::id).collect();

            return Arrivals::default();
        }

        let mut arrivals = Arrivals::default();

        for booking in bookings {
            let id = booking.id();

            if !self.seen.insert(id.clone()) {
                continue;
            }

            arrivals.count += 1;

            if booking.stato == BookingStatus::Nuova && self.flagged.insert(id.clone()) {
                arrivals.flagged.push(id);
            }
        }

        self.retain_new(bookings);
        arrivals
    }

    /// Drops highlights for bookings that moved past [BookingStatus::Nuova] or vanished.
    pub fn retain_new(&mut self, bookings: &[Booking]) {
        self.flagged.retain(|id| {
            bookings
                .iter()
                .find(|b| &b.id() == id)
                .map(|b| b.stato == BookingStatus::Nuova)
                .unwrap_or(false)
        });
    }

    /// Stops highlighting a booking, used as soon as it gets acted upon.
    pub fn unflag(&mut self, id: &str) {
        self.flagged.remove(id);
    }

    pub fn is_flagged(&self, id: &str) -> bool {
        self.flagged.contains(id)
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }
}
