//! courier - dispatch one stored request from a workbench file
//!
//! `courier <workbench.json> <request-id> [--env <id>]` prints the
//! normalized response as JSON on stdout. Logs go to stderr and are
//! filtered by `RUST_LOG` (default `info`).

use std::path::PathBuf;

use clap::Parser;
use courier::{Courier, Workbench};
use courier_infrastructure::PreferencesRepository;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Dispatch stored HTTP, GraphQL and gRPC requests")]
#[command(version)]
struct Cli {
    /// Workbench JSON file with requests, collections, environments and variables
    workbench: PathBuf,

    /// Id of the request to dispatch
    request: String,

    /// Active environment id
    #[arg(short, long, env = "COURIER_ENV")]
    env: Option<String>,

    /// Preferences file (defaults to the platform config dir)
    #[arg(long)]
    preferences: Option<PathBuf>,

    /// Run post-request scripts regardless of preferences
    #[arg(long)]
    scripting: bool,

    /// Write environment changes back into the workbench file
    #[arg(long)]
    write_back: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let repository = cli
        .preferences
        .as_ref()
        .map_or_else(PreferencesRepository::new, PreferencesRepository::at);
    let mut preferences = repository.load().await?;
    if cli.scripting {
        preferences.scripting_enabled = true;
    }

    let workbench = Workbench::load(&cli.workbench).await?;
    let base_dir = cli.workbench.parent().map(PathBuf::from);
    let courier = Courier::new(workbench, preferences, base_dir);

    courier.registry.add_environment_listener(|environment, source| {
        info!(environment = %environment.name, %source, "environment updated");
    });

    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling dispatch");
            cancel.cancel();
        }
    });

    let response = courier
        .service
        .send_with_cancellation(&cli.request, cli.env.as_deref(), token)
        .await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if cli.write_back {
        courier.snapshot().save(&cli.workbench).await?;
    }
    Ok(())
}
