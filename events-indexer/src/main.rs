use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};

use events_indexer::config::init_tracing;
use events_indexer::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let settings = Settings::parse();
    init_tracing(settings.log_format);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting events indexer");

    match events_indexer::run(&settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Events indexer stopped");
            ExitCode::FAILURE
        }
    }
}
