//! `cavefire` binary entry point.

use std::io;
use std::process::ExitCode;

use cavefire_cli::commands;
use cavefire_cli::{Cli, Command, Pricing, EXIT_ARTIFACT_MISSING, EXIT_MISMATCH};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let pricing = Pricing::from_args(&cli)?;

    match &cli.command {
        Command::Totals { json } => commands::totals(&pricing, *json, &mut io::stdout().lock())?,

        Command::Compose { file, json } => {
            commands::compose_file(&pricing, file, *json, &mut io::stdout().lock())?;
        }

        Command::Export { file, out } => {
            let artifacts = match commands::export(&pricing, file, out) {
                Ok(artifacts) => artifacts,
                Err(e) => {
                    error!(error = %format!("{:#}", e), "Export failed");
                    return Ok(ExitCode::from(EXIT_ARTIFACT_MISSING));
                }
            };
            if let Err(e) = commands::verify_artifacts(&artifacts) {
                error!(error = %e, "Export incomplete");
                return Ok(ExitCode::from(EXIT_ARTIFACT_MISSING));
            }
            for artifact in &artifacts {
                println!("wrote {} ({} bytes)", artifact.path.display(), artifact.bytes);
            }
        }

        Command::Compare { file, server } => {
            let comparison = commands::compare(&pricing, file, server).await?;
            if !comparison.matches() {
                for diff in comparison.differences() {
                    println!("MISMATCH {}", diff);
                }
                return Ok(ExitCode::from(EXIT_MISMATCH));
            }
            println!("OK totals match ({})", comparison.local.total);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Logs go to stderr so command output can be piped.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
