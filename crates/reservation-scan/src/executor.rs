use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::availability::{Availability, describe, parse_response};
use crate::notification_service::{AvailabilityNotifier, EmailService};
use crate::poll_state::{PollState, Transition, transition};
use crate::resy_client::AvailabilityClient;
use crate::scan_types::{ScanError, VenueScan};

/// Loop timing and termination
#[derive(Debug, Clone)]
pub struct ScanExecutorConfig {
    /// Delay between the end of one poll and the start of the next (default: 60 seconds)
    pub poll_interval: Duration,

    /// Stop after this many polls; `None` polls until an error occurs
    pub iteration_limit: Option<u32>,
}

impl Default for ScanExecutorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            iteration_limit: None,
        }
    }
}

/// Result of a single poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// State to carry into the next poll
    pub state: PollState,
    /// What changed since the previous poll
    pub transition: Transition,
    /// Number of scheduled days returned
    pub days: usize,
    /// Whether an email went out
    pub notified: bool,
}

/// Totals for a bounded run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// Polls completed
    pub iterations: u32,
    /// Emails sent
    pub notifications_sent: u32,
    /// State after the last poll
    pub final_state: PollState,
}

/// Polls one venue and emails when reservations open up.
///
/// Polls run strictly one after another. Notification is attempted on every
/// poll that finds availability, not only when it first appears; deduplication,
/// if wanted, belongs in the [`EmailService`].
pub struct ScanExecutor {
    client: Arc<dyn AvailabilityClient>,
    notifier: AvailabilityNotifier,
    config: ScanExecutorConfig,
}

impl ScanExecutor {
    /// Build an executor; `None` uses [`ScanExecutorConfig::default`]
    pub fn new(
        client: Arc<dyn AvailabilityClient>,
        email_service: Arc<dyn EmailService>,
        config: Option<ScanExecutorConfig>,
    ) -> Self {
        Self {
            client,
            notifier: AvailabilityNotifier::new(email_service),
            config: config.unwrap_or_default(),
        }
    }

    /// Poll until the iteration limit is reached.
    ///
    /// Any error from the client, the parser or the notifier ends the run
    /// immediately and is returned as is; nothing is retried.
    pub async fn run(&self, scan: &VenueScan) -> Result<ScanSummary, ScanError> {
        info!(
            "Starting availability scan for {} (venue {}), polling every {:?}",
            scan.venue_name, scan.venue_id, self.config.poll_interval
        );

        let mut state = PollState::Unknown;
        let mut iterations = 0u32;
        let mut notifications_sent = 0u32;

        while self
            .config
            .iteration_limit
            .is_none_or(|limit| iterations < limit)
        {
            if iterations > 0 {
                sleep(self.config.poll_interval).await;
            }

            let outcome = self.poll_once(scan, state).await?;

            state = outcome.state;
            iterations += 1;
            if outcome.notified {
                notifications_sent += 1;
            }
        }

        info!(
            "Finished availability scan for {} after {} polls ({} notifications)",
            scan.venue_name, iterations, notifications_sent
        );

        Ok(ScanSummary {
            iterations,
            notifications_sent,
            final_state: state,
        })
    }

    /// Run one poll against `prior` and return the state to carry forward
    pub async fn poll_once(
        &self,
        scan: &VenueScan,
        prior: PollState,
    ) -> Result<CycleOutcome, ScanError> {
        info!(
            "Sending request for venue_id={}, party_size={}, start_date={}, end_date={}",
            scan.venue_id,
            scan.party_size,
            Self::describe_date(scan.start_date),
            Self::describe_date(scan.end_date)
        );

        let raw = self.client.fetch_calendar(scan).await?;
        let availability = parse_response(&raw)?;

        let (state, transition) = transition(prior, !availability.is_empty());
        debug!("Poll state {:?} -> {:?} ({:?})", prior, state, transition);

        Self::log_transition(&scan.venue_name, transition, &availability);

        let notified = if transition.has_availability() {
            self.notifier
                .check_and_notify(&scan.venue_name, &availability)
                .await?
        } else {
            false
        };

        Ok(CycleOutcome {
            state,
            transition,
            days: availability.len(),
            notified,
        })
    }
}

// Logging helpers
impl ScanExecutor {
    /// Write the log line for a poll transition
    fn log_transition(
        venue_name: &str,
        transition: Transition,
        availability: &[Availability],
    ) {
        match transition {
            Transition::FirstAvailability => info!(
                "Availability detected for the first time at {}: {}",
                venue_name,
                describe(availability)
            ),
            Transition::Appeared => info!(
                "Availability returned for {}: {}",
                venue_name,
                describe(availability)
            ),
            Transition::Continues => info!(
                "Availability continues for {}: {}",
                venue_name,
                describe(availability)
            ),
            Transition::Disappeared => info!("Availability disappeared for {}", venue_name),
            Transition::FirstPollNone => {
                info!("No availability for {} (first check).", venue_name)
            }
            Transition::NoChange => info!(
                "No availability for {} (no change from last check).",
                venue_name
            ),
        }
    }

    /// Date as logged; absent dates are resolved by the client
    fn describe_date(date: Option<NaiveDate>) -> String {
        date.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "default".to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;
    use crate::email_service::MockEmailService;

    /// Replays canned calendar payloads in order
    struct ScriptedClient {
        responses: Mutex<VecDeque<Result<Value, ScanError>>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<Value, ScanError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait::async_trait]
    impl AvailabilityClient for ScriptedClient {
        async fn fetch_calendar(&self, _scan: &VenueScan) -> Result<Value, ScanError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ScanError::Network("script exhausted".to_string())))
        }
    }

    fn scan() -> VenueScan {
        VenueScan::new(12345, "Una Pizza Napoletana", 4, None, None).unwrap()
    }

    fn executor(
        responses: Vec<Result<Value, ScanError>>,
        email: Arc<MockEmailService>,
        iteration_limit: Option<u32>,
    ) -> ScanExecutor {
        ScanExecutor::new(
            Arc::new(ScriptedClient::new(responses)),
            email,
            Some(ScanExecutorConfig {
                poll_interval: Duration::ZERO,
                iteration_limit,
            }),
        )
    }

    fn sold_out() -> Value {
        json!({ "scheduled": [
            { "date": "2024-12-01", "inventory": { "reservation": "sold-out" } }
        ]})
    }

    fn bookable() -> Value {
        json!({ "scheduled": [
            { "date": "2024-12-01", "inventory": { "reservation": "available" } }
        ]})
    }

    #[test]
    fn test_describe_date() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();

        assert_eq!(ScanExecutor::describe_date(Some(date)), "2024-12-01");
        assert_eq!(ScanExecutor::describe_date(None), "default");
    }

    #[test]
    fn test_default_config() {
        let config = ScanExecutorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert!(config.iteration_limit.is_none());
    }

    #[tokio::test]
    async fn test_poll_once_threads_state() {
        let email = Arc::new(MockEmailService::new());
        let executor = executor(
            vec![Ok(json!({ "scheduled": [] })), Ok(sold_out())],
            email.clone(),
            None,
        );

        let first = executor.poll_once(&scan(), PollState::Unknown).await.unwrap();
        assert_eq!(first.transition, Transition::FirstPollNone);
        assert_eq!(first.state, PollState::Unavailable);

        let second = executor.poll_once(&scan(), first.state).await.unwrap();
        assert_eq!(second.transition, Transition::Appeared);
        assert_eq!(second.state, PollState::Available);
        assert_eq!(second.days, 1);

        // Scheduled but not bookable: state is Available, nothing is sent
        assert!(!second.notified);
        assert!(email.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_notifies_on_every_available_poll() {
        let email = Arc::new(MockEmailService::new());
        let executor = executor(
            vec![Ok(bookable()), Ok(bookable()), Ok(json!({ "scheduled": [] }))],
            email.clone(),
            Some(3),
        );

        let summary = executor.run(&scan()).await.unwrap();

        assert_eq!(
            summary,
            ScanSummary {
                iterations: 3,
                notifications_sent: 2,
                final_state: PollState::Unavailable,
            }
        );
        assert_eq!(email.sent_messages().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_limit_never_polls() {
        let email = Arc::new(MockEmailService::new());
        let executor = executor(vec![], email, Some(0));

        let summary = executor.run(&scan()).await.unwrap();

        assert_eq!(summary.iterations, 0);
        assert_eq!(summary.final_state, PollState::Unknown);
    }

    #[tokio::test]
    async fn test_error_stops_the_loop() {
        let email = Arc::new(MockEmailService::new());
        let executor = executor(
            vec![Ok(bookable()), Err(ScanError::VenueNotFound(12345)), Ok(bookable())],
            email.clone(),
            Some(3),
        );

        let err = executor.run(&scan()).await.unwrap_err();

        assert!(matches!(err, ScanError::VenueNotFound(12345)));
        assert_eq!(email.sent_messages().len(), 1);
    }
}
