mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

// Re-export from lib for internal use
use call_indexer::error;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "call_indexer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            calls,
            checks,
            models,
            format,
        } => {
            cli::scan(&calls, &checks, &models, &format)?;
        }
        Commands::Query {
            calls,
            target,
            target_pattern,
            no_target,
            methods,
            chained,
            nested,
            format,
        } => {
            cli::query(
                &calls,
                target.as_deref(),
                target_pattern.as_deref(),
                no_target,
                &methods,
                chained,
                nested,
                &format,
            )?;
        }
        Commands::Stats { calls } => {
            cli::stats(&calls)?;
        }
    }

    Ok(())
}
