//! Command-line interface definitions for pagewright

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the pagewright application
#[derive(Parser)]
#[command(name = "pagewright")]
#[command(version)]
#[command(about = "Compose PDF documents from TOML document scripts", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for pagewright
#[derive(Subcommand)]
pub enum Commands {
    /// Render a document script to PDF
    Build {
        /// Document script (TOML)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output PDF file (defaults to the script name with a .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the PDF as base64 on stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        base64: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the named page sizes
    PageSizes,
}
