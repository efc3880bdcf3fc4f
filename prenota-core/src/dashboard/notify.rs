use url::Url;

use crate::{Booking, BookingStatus};

const WHATSAPP_BASE: &str = "https://wa.me/";

/// Builds the chat link that tells the customer about a status change.
/// Only confirmations and cancellations are announced.
pub fn customer_notice(booking: &Booking, status: BookingStatus) -> Option<Url> {
    let date = italian_date(&booking.data_iso);

    let text = match status {
        BookingStatus::Confermata => format!(
            "Ciao {}, ✅ la tua prenotazione del {} alle {} è CONFERMATA. Grazie!",
            booking.nome, date, booking.ora
        ),
        BookingStatus::Annullata => format!(
            "Ciao {}, ❌ la tua prenotazione del {} alle {} è stata ANNULLATA. Se vuoi riprenotare scrivici qui.",
            booking.nome, date, booking.ora
        ),
        _ => return None,
    };

    whatsapp_link(&booking.telefono, &text)
}

/// `wa.me` link for a phone number in any notation, [None] if it has no digits.
pub fn whatsapp_link(phone: &str, text: &str) -> Option<Url> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return None;
    }

    let mut url = Url::parse(WHATSAPP_BASE).ok()?.join(&digits).ok()?;
    url.query_pairs_mut().append_pair("text", text);

    Some(url)
}

fn italian_date(iso: &str) -> String {
    match iso.split('-').collect::<Vec<_>>()[..] {
        [y, m, d] if y.len() == 4 && m.len() == 2 && d.len() == 2 => format!("{d}/{m}/{y}"),
        _ => iso.to_string(),
    }
}
