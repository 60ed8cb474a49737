use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::EnvFilter;

use gatilho::{
    AppState,
    cli::{self, Cli},
    config,
    events::ClientEvent,
    services::session_store::FileSessionStore,
};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gatilho={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = config::load();
    let session = Arc::new(FileSessionStore::new(settings.session_file.clone()));

    let state = match AppState::new(settings, session) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    let mut events_rx = state.events_tx.subscribe();

    let outcome = cli::dispatch(&state, cli.command).await;

    // the terminal's stand-in for navigating to the login page
    loop {
        match events_rx.try_recv() {
            Ok(ClientEvent::RedirectToLogin) => {
                eprintln!("Your session has ended. Log in again with `gatilho login`.");
            }
            Ok(ClientEvent::AlertsUpdated) => tracing::debug!("alerts updated"),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }

    match outcome {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("command failed: {:?}", e);
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
