//! Command line entry point for the Resy availability notifier.
//! Polls one venue until interrupted (or `--iterations` polls) and emails
//! the configured recipient when reservations are bookable.

mod cli;
mod logging;
mod scan_manager;

use cli::Cli;
use reservation_scan::config::env_vars;
use scan_manager::ScanManager;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse_or_exit();

    // Initialize logger
    if let Err(e) = logging::init_logging(&logging::LogSettings::from_env()) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }

    log::info!("🚀 Starting resy notifier for {}...", cli.venue);

    let vars = env_vars();

    let manager = match ScanManager::from_cli(&cli, &vars).await {
        Ok(manager) => manager,
        Err(e) => {
            log::error!("❌ Startup failed: {:#}", e);
            std::process::exit(1);
        }
    };

    match manager.run().await {
        Ok(summary) => {
            log::info!(
                "✅ Done after {} polls, {} notifications sent",
                summary.iterations,
                summary.notifications_sent
            );
        }
        Err(e) => {
            log::error!("❌ Error occurred: {:#}", e);
            std::process::exit(1);
        }
    }
}
