//! # Reservation Scan
//!
//! This crate polls the Resy venue calendar for a single venue and emails the
//! operator when standard reservations become bookable. It contains the
//! response parser, the poll state machine, the notification filter and the
//! polling loop, along with the HTTP client and email transports they drive.

/// Types for scan requests and errors
mod scan_types;
pub use scan_types::*;

/// Environment-driven configuration objects
pub mod config;
pub use config::{EmailConfig, ResyConfig};

/// Availability records and the calendar response parser
mod availability;
pub use availability::*;

/// Tri-state poll tracking
mod poll_state;
pub use poll_state::*;

/// Actionable-day filter and the availability notifier
mod notification_service;
pub use notification_service::*;

/// SMTP and mock email transports
mod email_service;
pub use email_service::*;

/// Resy calendar API client
mod resy_client;
pub use resy_client::*;

/// The polling loop
mod executor;
pub use executor::*;
