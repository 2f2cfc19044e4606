//! Outbound admin notification.
//!
//! On a successful reservation the buyer's browser is redirected to a
//! pre-filled WhatsApp deep link addressed to the admin. This is a one-way,
//! fire-and-forget handoff; delivery is never verified.

use crate::types::BuyerDetails;

/// Build the WhatsApp deep link notifying the admin of a reservation.
///
/// The message names the ticket number and the buyer's name and email, and
/// is percent-encoded into the `text` query parameter of a `wa.me` URL.
#[must_use]
pub fn whatsapp_link(admin_contact: &str, ticket_number: u32, buyer: &BuyerDetails) -> String {
    let message = format!(
        "Hi! I just reserved raffle ticket *{ticket_number}*. My details:\nName: {}\nEmail: {}",
        buyer.name, buyer.email
    );
    format!(
        "https://wa.me/{admin_contact}?text={}",
        urlencoding::encode(&message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buyer() -> BuyerDetails {
        BuyerDetails {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            phone: "555".to_string(),
        }
    }

    #[test]
    fn link_targets_admin_contact() {
        let link = whatsapp_link("15550000000", 42, &buyer());
        assert!(link.starts_with("https://wa.me/15550000000?text="));
    }

    #[test]
    fn message_is_percent_encoded() {
        let link = whatsapp_link("15550000000", 42, &buyer());
        assert!(link.contains("%2A42%2A")); // *42*
        assert!(link.contains("ana%40x.com"));
        assert!(!link.contains(' '));
    }
}
