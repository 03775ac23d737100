//! `agent-kit` command line harness.
//!
//! Loads the runtime configuration from `.agent-kit/config.toml` and either
//! prints it or runs the demo scenarios against a runtime built from it.

mod demo;

use ak_core::config::loader::load_config;
use clap::{Parser, Subcommand};
use ak_protocol::config_models::RuntimeConfig;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "agent-kit", version, about = "Agent runtime harness")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the effective runtime configuration as JSON
    Config {
        /// Project root containing `.agent-kit/`
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Run the echo and broadcast scenarios
    Demo {
        /// Project root containing `.agent-kit/`
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Config { root } => {
            let config = load(&root).await?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Demo { root } => {
            let config = load(&root).await?;
            demo::run(config).await?;
        }
    }

    Ok(())
}

async fn load(root: &Path) -> color_eyre::Result<RuntimeConfig> {
    tracing::debug!(root = %root.display(), "Loading runtime configuration");
    let config = load_config(root).await?;
    tracing::info!(
        grace_period_ms = ?config.grace_period_ms,
        stale_handler = ?config.stale_handler,
        "Loaded runtime configuration"
    );
    Ok(config)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("ak_core=debug,agent_kit=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
