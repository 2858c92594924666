use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mediq_gateway::config::TransportMode;
use mediq_gateway::{Config, Daemon};

/// MediQ - Telegram relay gateway for an AI medical assistant
#[derive(Parser)]
#[command(name = "mediq", version, about)]
struct Cli {
    /// Transport mode for inbound updates
    #[arg(long, value_enum, env = "RELAY_MODE", default_value = "webhook")]
    mode: TransportMode,

    /// Port to listen on (webhook mode)
    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Discard any pending update backlog at startup (polling mode)
    #[arg(long, env = "DISCARD_BACKLOG")]
    discard_backlog: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,mediq_gateway=info",
        1 => "info,mediq_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!(mode = ?cli.mode, port = cli.port, "starting mediq gateway");

    let config = Config::from_env(cli.mode, cli.port, cli.discard_backlog)?;
    let daemon = Daemon::new(config).await?;

    tracing::info!("mediq gateway ready");
    daemon.run().await?;

    Ok(())
}
