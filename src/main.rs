use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use riveer_app::AppController;
use riveer_registry::Registry;

/// riveer - a configuration-driven, distributed data-pipeline runtime
#[derive(Parser)]
#[command(name = "riveer")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Load every config file and run the broker until interrupted
  Run {
    /// Folder to load node config files from (default: $RIVEER_CONFIG or ./configs)
    #[arg(long)]
    config_folder: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let cli = Cli::parse();

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    match cli.command {
      Some(Commands::Run { config_folder }) => run(config_folder).await,
      None => {
        println!("riveer - use --help to see available commands");
        Ok(())
      }
    }
  })
}

async fn run(config_folder: Option<PathBuf>) -> Result<()> {
  let folder = config_folder.unwrap_or_else(AppController::config_folder_from_env);

  let registry = Registry::new();
  riveer_nodes::register_builtins(&registry).context("failed to register builtin node types")?;

  let app = AppController::bootstrap(&folder, &registry).context("failed to bootstrap app")?;

  tracing::info!(nodes = app.graph.len(), "app bootstrapped, running");
  app.run().await;

  Ok(())
}
