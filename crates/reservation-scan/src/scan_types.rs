use chrono::NaiveDate;
use validator::{Validate, ValidationError};

/// A single venue and date window to monitor
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_date_window"))]
pub struct VenueScan {
    /// Numeric Resy venue ID
    pub venue_id: i64,

    /// Human readable venue name, used in notifications and logs
    #[validate(length(min = 1, message = "Venue name is required"))]
    pub venue_name: String,

    /// Number of seats requested
    #[validate(range(min = 1, message = "Party size must be at least 1"))]
    pub party_size: u32,

    /// First date of the window (defaults to today when absent)
    pub start_date: Option<NaiveDate>,

    /// Last date of the window (defaults to start date + 7 days when absent)
    pub end_date: Option<NaiveDate>,
}

impl VenueScan {
    /// Build a scan request and validate it
    pub fn new(
        venue_id: i64,
        venue_name: impl Into<String>,
        party_size: u32,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, ScanError> {
        let scan = Self {
            venue_id,
            venue_name: venue_name.into(),
            party_size,
            start_date,
            end_date,
        };

        scan.validate()
            .map_err(|e| ScanError::Validation(e.to_string()))?;

        Ok(scan)
    }
}

fn validate_date_window(scan: &VenueScan) -> Result<(), ValidationError> {
    match (scan.start_date, scan.end_date) {
        (Some(start), Some(end)) if end < start => {
            let mut err = ValidationError::new("invalid_date_range");
            err.message = Some("End date must not be before start date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Custom error type for scan operations
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A required setting is missing or empty
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The availability payload did not have the expected shape
    #[error("Invalid response format: {0}")]
    DataFormat(String),

    /// Transport-level failure talking to the availability API
    #[error("Network error occurred: {0}")]
    Network(String),

    /// The API answered 404 for the venue
    #[error("Venue ID {0} not found.")]
    VenueNotFound(i64),

    /// Any other non-2xx response
    #[error("HTTP error occurred: {status} - {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Invalid scan request
    #[error("Validation error: {0}")]
    Validation(String),

    /// Sending the availability email failed
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),
}

/// Errors raised while composing or sending a notification
#[derive(thiserror::Error, Debug)]
pub enum NotificationError {
    /// Subject or body was empty
    #[error("Subject and Body are required.")]
    MissingContent,

    /// A sender or recipient address could not be parsed
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The message could not be built
    #[error("Failed to build email: {0}")]
    Message(String),

    /// The relay rejected the message or could not be reached
    #[error("Error sending email: {0}")]
    Transport(String),
}
