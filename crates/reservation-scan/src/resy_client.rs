use chrono::{Days, Local, NaiveDate};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::availability::{Availability, parse_response};
use crate::config::ResyConfig;
use crate::scan_types::{ScanError, VenueScan};

/// Days covered by the calendar window when no end date is given
pub const DEFAULT_WINDOW_DAYS: u64 = 7;

/// Source of raw calendar payloads for the polling loop
#[async_trait::async_trait]
pub trait AvailabilityClient: Send + Sync {
    /// Fetch the unparsed calendar for the scan's venue and date window
    async fn fetch_calendar(&self, scan: &VenueScan) -> Result<Value, ScanError>;
}

/// Query parameters of `GET /venue/calendar`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarQuery {
    /// Venue to look up
    pub venue_id: i64,
    /// Party size
    pub num_seats: u32,
    /// First day of the window
    pub start_date: NaiveDate,
    /// Last day of the window
    pub end_date: NaiveDate,
}

impl CalendarQuery {
    /// Resolve the scan's optional dates against `today`.
    ///
    /// The start date defaults to `today`, the end date to the start date plus
    /// [`DEFAULT_WINDOW_DAYS`].
    pub fn for_scan(scan: &VenueScan, today: NaiveDate) -> Self {
        let start_date = scan.start_date.unwrap_or(today);
        let end_date = scan.end_date.unwrap_or_else(|| {
            start_date
                .checked_add_days(Days::new(DEFAULT_WINDOW_DAYS))
                .unwrap_or(NaiveDate::MAX)
        });

        Self {
            venue_id: scan.venue_id,
            num_seats: scan.party_size,
            start_date,
            end_date,
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("venue_id", self.venue_id.to_string()),
            ("num_seats", self.num_seats.to_string()),
            ("start_date", self.start_date.format("%Y-%m-%d").to_string()),
            ("end_date", self.end_date.format("%Y-%m-%d").to_string()),
        ]
    }
}

/// Client for the Resy venue calendar API
pub struct ResyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ResyClient {
    /// Create a new Resy API client
    pub fn new(config: &ResyConfig) -> Result<Self, ScanError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScanError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn authorization(&self) -> String {
        format!("ResyAPI api_key=\"{}\"", self.api_key)
    }

    /// Fetch the raw calendar for a resolved query
    pub async fn get_calendar(&self, query: &CalendarQuery) -> Result<Value, ScanError> {
        debug!(
            "Fetching calendar for venue {} ({} seats) from {} to {}",
            query.venue_id, query.num_seats, query.start_date, query.end_date
        );

        let url = format!("{}/venue/calendar", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.authorization())
            .header("Accept", "application/json")
            .query(&query.params())
            .send()
            .await
            .map_err(|e| ScanError::Network(e.to_string()))?;

        let status = response.status();
        debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            warn!("API request failed with status {}: {}", status, body);

            return Err(status_error(status, body, query.venue_id));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScanError::Network(e.to_string()))?;

        serde_json::from_str(&body)
            .map_err(|e| ScanError::DataFormat(format!("Failed to parse response: {}", e)))
    }

    /// Fetch and parse the calendar for a scan
    pub async fn get_availability(&self, scan: &VenueScan) -> Result<Vec<Availability>, ScanError> {
        let raw = self.fetch_calendar(scan).await?;
        parse_response(&raw)
    }
}

#[async_trait::async_trait]
impl AvailabilityClient for ResyClient {
    async fn fetch_calendar(&self, scan: &VenueScan) -> Result<Value, ScanError> {
        let query = CalendarQuery::for_scan(scan, Local::now().date_naive());
        self.get_calendar(&query).await
    }
}

fn status_error(status: StatusCode, body: String, venue_id: i64) -> ScanError {
    match status {
        StatusCode::NOT_FOUND => ScanError::VenueNotFound(venue_id),
        _ => ScanError::Http {
            status: status.as_u16(),
            message: if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string()
            } else {
                body
            },
        },
    }
}
