use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::scan_types::ScanError;

/// Status token the vendor reports for a bookable standard reservation
pub const AVAILABLE: &str = "available";

/// Placeholder for inventory channels missing from the payload
pub const UNKNOWN: &str = "unknown";

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Accept any JSON value for a channel: strings as-is, `null` as unknown,
/// anything else in its JSON text form
fn channel<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(status) => status,
        Value::Null => unknown(),
        other => other.to_string(),
    })
}

/// Per-date channel status as reported by Resy.
///
/// Values are kept as opaque strings; the vendor vocabulary is open-ended
/// and counts such as `5` are stored as `"5"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Inventory {
    /// Standard reservation status
    #[serde(default = "unknown", deserialize_with = "channel")]
    pub reservation: String,

    /// Special event status
    #[serde(default = "unknown", deserialize_with = "channel")]
    pub event: String,

    /// Walk-in status
    #[serde(rename = "walk-in", default = "unknown", deserialize_with = "channel")]
    pub walk_in: String,
}

impl Inventory {
    /// Create an inventory from its three channel statuses
    pub fn new(
        reservation: impl Into<String>,
        event: impl Into<String>,
        walk_in: impl Into<String>,
    ) -> Self {
        Self {
            reservation: reservation.into(),
            event: event.into(),
            walk_in: walk_in.into(),
        }
    }

    /// Whether a standard reservation can be booked
    pub fn is_reservable(&self) -> bool {
        self.reservation == AVAILABLE
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inventory(reservation={}, event={}, walk_in={})",
            self.reservation, self.event, self.walk_in
        )
    }
}

/// Availability for a single calendar date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    /// ISO `YYYY-MM-DD` date as returned by the API
    pub date: String,
    /// Channel statuses for that date
    pub inventory: Inventory,
}

impl Availability {
    /// Create a record for `date`
    pub fn new(date: impl Into<String>, inventory: Inventory) -> Self {
        Self {
            date: date.into(),
            inventory,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Availability(date={}, inventory={})",
            self.date, self.inventory
        )
    }
}

/// Render a collection the way it is written to the log
pub fn describe(availability: &[Availability]) -> String {
    let items = availability
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", items)
}

/// Parse a calendar response into availability records.
///
/// The whole payload is rejected if any entry is malformed. Order follows the
/// `scheduled` array.
pub fn parse_response(data: &Value) -> Result<Vec<Availability>, ScanError> {
    let scheduled = data
        .as_object()
        .and_then(|root| root.get("scheduled"))
        .ok_or_else(|| ScanError::DataFormat("'scheduled' key missing.".to_string()))?;

    let entries = scheduled
        .as_array()
        .ok_or_else(|| ScanError::DataFormat("'scheduled' is not a list.".to_string()))?;

    entries.iter().map(parse_entry).collect()
}

fn parse_entry(item: &Value) -> Result<Availability, ScanError> {
    let missing = || ScanError::DataFormat("Missing 'date' or 'inventory' key.".to_string());

    let date = item.get("date").ok_or_else(missing)?;
    let inventory = item.get("inventory").ok_or_else(missing)?;

    let date = date
        .as_str()
        .ok_or_else(|| ScanError::DataFormat(format!("'date' is not a string: {}", date)))?;

    if !inventory.is_object() {
        return Err(ScanError::DataFormat(format!(
            "'inventory' for {} is not an object",
            date
        )));
    }

    let inventory = Inventory::deserialize(inventory)
        .map_err(|e| ScanError::DataFormat(format!("Invalid inventory for {}: {}", date, e)))?;

    Ok(Availability::new(date, inventory))
}
