use std::sync::Arc;

use tracing::{debug, info};

use crate::availability::Availability;
use crate::scan_types::NotificationError;

/// Trait for email service implementations
#[async_trait::async_trait]
pub trait EmailService: Send + Sync {
    /// Send a plain-text email to the configured recipient.
    ///
    /// Returns the identifier or response line reported by the transport.
    async fn send_email(&self, subject: &str, body: &str) -> Result<String, NotificationError>;
}

/// Format the actionable days of a poll, one block per day.
///
/// A day is actionable when its standard reservation status is exactly
/// `"available"`. Event and walk-in statuses never qualify a day on their own.
/// An empty result means there is nothing to notify about.
pub fn select_actionable(availability: &[Availability]) -> Vec<String> {
    availability
        .iter()
        .filter(|day| day.inventory.is_reservable())
        .map(|day| {
            format!(
                "Date: {}\n- Reservation: {}\n- Event: {}\n- Walk-in: {}\n",
                day.date, day.inventory.reservation, day.inventory.event, day.inventory.walk_in
            )
        })
        .collect()
}

/// Subject line for an availability email
pub fn notification_subject(venue_name: &str) -> String {
    format!("Reservation Availability for {}", venue_name)
}

/// Body for an availability email built from [`select_actionable`] blocks
pub fn notification_body(venue_name: &str, entries: &[String]) -> String {
    format!(
        "Good news! There are available reservations for {}.\n\nDetails:\n\n{}",
        venue_name,
        entries.join("\n\n")
    )
}

/// Sends an email when a poll contains bookable days
pub struct AvailabilityNotifier {
    email_service: Arc<dyn EmailService>,
}

impl AvailabilityNotifier {
    /// Create a notifier on top of an email transport
    pub fn new(email_service: Arc<dyn EmailService>) -> Self {
        Self { email_service }
    }

    /// Email the recipient if any day in `availability` is bookable.
    ///
    /// Returns `Ok(false)` without touching the transport when nothing qualifies.
    pub async fn check_and_notify(
        &self,
        venue_name: &str,
        availability: &[Availability],
    ) -> Result<bool, NotificationError> {
        let entries = select_actionable(availability);

        if entries.is_empty() {
            debug!(
                "No bookable reservations for {} among {} days",
                venue_name,
                availability.len()
            );
            return Ok(false);
        }

        let subject = notification_subject(venue_name);
        let body = notification_body(venue_name, &entries);

        let id = self.email_service.send_email(&subject, &body).await?;

        info!(
            "Availability email sent for {} ({} days): {}",
            venue_name,
            entries.len(),
            id
        );

        Ok(true)
    }
}
