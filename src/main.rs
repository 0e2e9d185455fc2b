//! Regression Studio - Main Entry Point

use clap::Parser;
use regression_studio::cli::{cmd_inspect, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "regression_studio=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host, config } => {
            cmd_serve(&host, port, config.as_deref()).await?;
        }
        Commands::Inspect { data, target, category } => {
            cmd_inspect(&data, target.as_deref(), category.as_deref())?;
        }
        Commands::Train { data, target, features, predict, config } => {
            // Training is CPU bound; keep it off the async workers
            tokio::task::spawn_blocking(move || {
                cmd_train(&data, &target, &features, predict.as_deref(), config.as_deref())
            })
            .await??;
        }
    }

    Ok(())
}
