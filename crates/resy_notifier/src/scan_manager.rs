use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::info;

use reservation_scan::config::EnvVars;
use reservation_scan::{
    EmailConfig, EmailService, MockEmailService, ResyClient, ResyConfig, ScanExecutor,
    ScanExecutorConfig, ScanSummary, SmtpEmailService, VenueScan,
};
use venue_store::{StoreConfig, VenueStore};

use crate::cli::Cli;

/// Wires the store, the Resy client and the email transport into an executor
pub struct ScanManager {
    executor: ScanExecutor,
    scan: VenueScan,
}

impl ScanManager {
    /// Resolve credentials and the venue, then build the executor
    pub async fn from_cli(cli: &Cli, vars: &EnvVars) -> anyhow::Result<Self> {
        let store_config =
            StoreConfig::from_lookup(|key| vars.get(key).cloned()).context("Store setup failed")?;
        let store = VenueStore::connect(&store_config)
            .await
            .context("Failed to connect to the venue database")?;
        store.test_connection().await?;

        let api_key = match vars.get("RESY_API_KEY").filter(|k| !k.trim().is_empty()) {
            Some(key) => {
                info!("🔑 Using API key from RESY_API_KEY");
                key.clone()
            }
            None => store.get_active_api_key().await?,
        };

        let venue = store.get_venue_info(&cli.venue).await?;
        info!(
            "🍽️ Monitoring {} (venue {}) for {} seats",
            venue.venue_name, venue.venue_id, cli.party_size
        );

        let client = ResyClient::new(&ResyConfig::from_vars(vars, api_key)?)?;
        let email_service = email_service(cli, vars)?;

        let scan = VenueScan::new(
            venue.venue_id,
            venue.venue_name,
            cli.party_size,
            cli.start_date,
            cli.end_date,
        )?;

        let executor = ScanExecutor::new(
            Arc::new(client),
            email_service,
            Some(executor_config(cli)),
        );

        Ok(Self { executor, scan })
    }

    /// Poll until the iteration limit or the first error
    pub async fn run(&self) -> anyhow::Result<ScanSummary> {
        Ok(self.executor.run(&self.scan).await?)
    }
}

/// Loop settings taken from the command line
pub fn executor_config(cli: &Cli) -> ScanExecutorConfig {
    ScanExecutorConfig {
        poll_interval: Duration::from_secs(cli.interval),
        iteration_limit: cli.iterations,
    }
}

/// SMTP transport, or the logging mock for `--dry-run`
pub fn email_service(cli: &Cli, vars: &EnvVars) -> anyhow::Result<Arc<dyn EmailService>> {
    if cli.dry_run {
        info!("📧 Dry run: notifications will be logged, not sent");
        return Ok(Arc::new(MockEmailService::new()));
    }

    let config = EmailConfig::from_vars(vars)?;
    info!(
        "📧 Notifications go to {} via {}:{}",
        config.recipient_email, config.smtp_server, config.smtp_port
    );

    Ok(Arc::new(SmtpEmailService::new(&config)?))
}
