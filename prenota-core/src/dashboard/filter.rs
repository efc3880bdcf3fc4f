use serde::{Deserialize, Serialize};

use crate::{Booking, BookingStatus};

/// Which kinds of booking the dashboard lists. Cycled with a single button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeFilter {
    #[default]
    Tutti,
    Consegna,
    Ritiro,
}

impl TypeFilter {
    pub fn cycle(self) -> Self {
        match self {
            Self::Tutti => Self::Consegna,
            Self::Consegna => Self::Ritiro,
            Self::Ritiro => Self::Tutti,
        }
    }

    fn matches(&self, tipo: &str) -> bool {
        match self {
            Self::Tutti => true,
            Self::Consegna => tipo == "CONSEGNA",
            Self::Ritiro => tipo == "RITIRO",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// [None] lists every status
    pub status: Option<BookingStatus>,
    pub kind: TypeFilter,
    /// Inclusive lower bound, `YYYY-MM-DD`
    pub from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`
    pub to: Option<String>,
    pub query: String,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if self.status.is_some_and(|s| s != booking.stato) {
            return false;
        }

        if !self.kind.matches(&booking.tipo) {
            return false;
        }

        // Bookings without a date are never hidden by the range
        let date = booking.data_iso.as_str();
        if !date.is_empty() {
            if self.from.as_deref().is_some_and(|from| date < from) {
                return false;
            }

            if self.to.as_deref().is_some_and(|to| date > to) {
                return false;
            }
        }

        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        let fields: [&str; 8] = [
            &booking.nome,
            &booking.telefono,
            &booking.tipo,
            &booking.data_iso,
            &booking.ora,
            booking.stato.as_str(),
            &booking.indirizzo,
            &booking.note,
        ];

        let haystack = fields.join(" ").to_lowercase();

        haystack.contains(&query)
    }

    pub fn apply<'a>(&self, bookings: &'a [Booking]) -> Vec<&'a Booking> {
        bookings.iter().filter(|b| self.matches(b)).collect()
    }
}

/// How many bookings sit in each status, for the filter pills
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub nuova: usize,
    pub confermata: usize,
    pub consegnata: usize,
    pub annullata: usize,
    pub tutte: usize,
}

impl StatusCounts {
    pub fn of(bookings: &[Booking]) -> Self {
        let mut counts = Self {
            tutte: bookings.len(),
            ..Default::default()
        };

        for booking in bookings {
            match booking.stato {
                BookingStatus::Nuova => counts.nuova += 1,
                BookingStatus::Confermata => counts.confermata += 1,
                BookingStatus::Consegnata => counts.consegnata += 1,
                BookingStatus::Annullata => counts.annullata += 1,
            }
        }

        counts
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn booking(nome: &str, tipo: &str, data: &str, stato: BookingStatus) -> Booking {
        Booking {
            nome: nome.into(),
            telefono: "333".into(),
            tipo: tipo.into(),
            data_iso: data.into(),
            ora: "12:00".into(),
            s50: 0,
            s100: 1,
            s200: 0,
            tot: 100,
            indirizzo: "Via Roma 1".into(),
            stato,
            note: String::new(),
            timestamp_iso: String::new(),
        }
    }

    fn list() -> Vec<Booking> {
        vec![
            booking("Mario", "CONSEGNA", "2025-12-29", BookingStatus::Nuova),
            booking("Anna", "RITIRO", "2025-12-30", BookingStatus::Confermata),
            booking("Luca", "RITIRO", "2025-12-31", BookingStatus::Annullata),
            booking("Sara", "RITIRO", "", BookingStatus::Nuova),
        ]
    }

    #[test]
    fn test_type_filter_cycles() {
        let start = TypeFilter::default();
        assert_eq!(start.cycle().cycle().cycle(), start);
        assert_eq!(start.cycle(), TypeFilter::Consegna);
    }

    #[test]
    fn test_filters_combine() {
        let bookings = list();

        let filter = BookingFilter {
            kind: TypeFilter::Ritiro,
            from: Some("2025-12-30".into()),
            ..Default::default()
        };
        let names: Vec<_> = filter.apply(&bookings).into_iter().map(|b| b.nome.as_str()).collect();
        assert_eq!(names, vec!["Anna", "Luca", "Sara"]);

        let filter = BookingFilter {
            status: Some(BookingStatus::Nuova),
            query: "MARIO".into(),
            ..Default::default()
        };
        let names: Vec<_> = filter.apply(&bookings).into_iter().map(|b| b.nome.as_str()).collect();
        assert_eq!(names, vec!["Mario"]);
    }

    #[test]
    fn test_counts() {
        let counts = StatusCounts::of(&list());

        assert_eq!(counts.tutte, 4);
        assert_eq!(counts.nuova, 2);
        assert_eq!(counts.confermata, 1);
        assert_eq!(counts.consegnata, 0);
        assert_eq!(counts.annullata, 1);
    }
}
