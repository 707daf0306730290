use chrono::NaiveDate;
use clap::Parser;

/// Watch a Resy venue and email when reservations open up
#[derive(Parser, Debug, Clone)]
#[command(name = "resy-notifier", version)]
pub struct Cli {
    /// Venue URL name, e.g. `una-pizza-napoletana`
    pub venue: String,

    /// Number of seats to look for
    #[arg(default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub party_size: u32,

    /// First date to check (YYYY-MM-DD); defaults to today
    pub start_date: Option<NaiveDate>,

    /// Last date to check (YYYY-MM-DD); defaults to start date + 7 days
    pub end_date: Option<NaiveDate>,

    /// Seconds to wait between polls
    #[arg(default_value_t = 60)]
    pub interval: u64,

    /// Stop after this many polls instead of running until interrupted
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub iterations: Option<u32>,

    /// Log notifications instead of sending email
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse the process arguments.
    ///
    /// Usage errors and invalid values print the clap message and exit with
    /// status 1; `--help` and `--version` exit with 0.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(e) => {
                let code = if e.use_stderr() { 1 } else { 0 };
                let _ = e.print();
                std::process::exit(code);
            }
        }
    }
}
