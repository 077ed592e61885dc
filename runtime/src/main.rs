use clap::Parser;
use opticron_scraper::cli::Cli;
use opticron_scraper::{logging, runner};
use std::process::ExitCode;
use tracing::{error, info, info_span, Instrument};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Cli::parse().into_config();

    let _log = match logging::init(&config.log_file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    info!("starting opticron scraper v{}", env!("CARGO_PKG_VERSION"));

    match runner::run(&config).instrument(info_span!("run")).await {
        Ok(summary) => {
            for stats in &summary.stats {
                info!(
                    category = %stats.category,
                    collected = stats.collected,
                    skipped = stats.skipped,
                    "saved"
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:?}");
            ExitCode::FAILURE
        }
    }
}
