//! Cash flows reports web server.

use std::process::ExitCode;

use clap::Parser;
use tenk::ReportService;
use tenk_web::{AppError, AppState, Cli, build_router};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match serve(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server stopped");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(cli: Cli) -> Result<(), AppError> {
    let store = cli.open_store()?;
    let service =
        ReportService::with_edgar(&cli.user_agent, store)?.with_concurrency(cli.concurrency);
    let state = AppState::new(service)?;

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    info!(
        address = %listener.local_addr()?,
        database = %cli.database,
        concurrency = cli.concurrency,
        "Listening"
    );

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
