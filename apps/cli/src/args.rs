//! Command-line arguments.

use std::path::PathBuf;

use cavefire_core::Rounding;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cavefire")]
#[command(about = "Price, compose and export Cave Fire add-on proposals")]
#[command(version)]
pub struct Cli {
    /// Path to the add-on catalog
    #[arg(long, global = true, env = "CAVEFIRE_CATALOG", default_value = "seeds/add_ons.json")]
    pub catalog: PathBuf,

    /// Tax rate in percent
    #[arg(long, global = true, env = "CAVEFIRE_TAX_RATE", default_value = "8.75")]
    pub tax_rate: String,

    /// Rounding for fractional cents (half_away_from_zero | half_even)
    #[arg(long, global = true, env = "CAVEFIRE_ROUNDING", default_value = "half_away_from_zero")]
    pub rounding: Rounding,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print line and aggregate totals for the catalog's default selection
    Totals {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Resolve a proposal file against the catalog and print its totals
    Compose {
        /// Proposal JSON file
        file: PathBuf,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Write HTML, DOCX and CSV exports for a proposal; exits 2 if an artifact is empty
    Export {
        /// Proposal JSON file
        file: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "artifacts")]
        out: PathBuf,
    },

    /// Compare local totals with a remote compose endpoint
    Compare {
        /// Proposal JSON file
        file: PathBuf,

        /// Base URL of the proposals API
        #[arg(long, env = "CAVEFIRE_SERVER", default_value = "http://localhost:8003")]
        server: String,
    },
}
