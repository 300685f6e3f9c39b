//! pagewright - document composition tool
//!
//! Renders TOML document scripts to PDF.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use pagewright::{DocumentScript, PageSize};
use std::path::{Path, PathBuf};

/// Main entry point for the pagewright CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            script,
            output,
            base64,
            verbose,
        } => {
            handle_build_command(&script, output, base64, verbose)?;
        }

        Commands::PageSizes => {
            handle_page_sizes_command();
        }
    }

    Ok(())
}

/// Handle the build command
fn handle_build_command(
    script_path: &Path,
    output: Option<PathBuf>,
    base64: bool,
    verbose: bool,
) -> Result<()> {
    // Initialize logging if verbose
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }

    let script = DocumentScript::load(script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;
    log::info!(
        "Loaded {} blocks from {}",
        script.blocks.len(),
        script_path.display()
    );

    let base_dir = script_path.parent().unwrap_or_else(|| Path::new("."));
    let mut doc = script
        .build(base_dir)
        .with_context(|| format!("Failed to compose {}", script_path.display()))?;

    if base64 {
        let encoded = doc
            .export_base64()
            .context("Failed to encode document as base64")?;
        println!("{}", encoded);
        return Ok(());
    }

    let output = output.unwrap_or_else(|| script_path.with_extension("pdf"));
    if verbose {
        println!("Script: {}", script_path.display());
        println!("Output: {}", output.display());
    }

    doc.save_as(&output)
        .with_context(|| format!("Failed to write PDF to {}", output.display()))?;

    println!(
        "✓ Successfully wrote: {} ({} pages)",
        output.display(),
        doc.page_count()
    );

    Ok(())
}

/// Handle the page-sizes command
fn handle_page_sizes_command() {
    println!("Available page sizes (portrait, mm):\n");
    for size in PageSize::ALL {
        let dimensions = size.dimensions();
        println!(
            "  {:<8} {:>6.1} x {:>6.1}",
            size.name(),
            dimensions.width,
            dimensions.height
        );
    }
}
