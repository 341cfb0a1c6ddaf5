// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshaudit CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use meshaudit::batch::{BatchConfig, BatchCoordinator, BatchReporter, BatchRequest};
use meshaudit::{analyze, format_report, load_stl, AnalysisResult, ConverterRegistry};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Exit code when every item succeeded or there was nothing to do
const EXIT_OK: i32 = 0;
/// Exit code when at least one item failed
const EXIT_ITEM_FAILURE: i32 = 1;
/// Exit code when the batch could not start
const EXIT_PRECONDITION: i32 = 2;

#[derive(Parser)]
#[command(name = "meshaudit")]
#[command(about = "Batch CAD to STL conversion with mesh quality reports", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert CAD files to STL and write a quality report next to each mesh
    Convert {
        /// Input files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Tessellation tolerance
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Number of parallel workers (0 = all cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Configuration file (defaults to ./meshaudit.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write a JSON batch summary to this file
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Create the output directory if it does not exist
        #[arg(long)]
        create_output_dir: bool,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Analyze existing STL files without writing anything
    Analyze {
        /// STL files
        #[arg(required = true)]
        meshes: Vec<PathBuf>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            EXIT_PRECONDITION
        }
    };

    std::process::exit(code);
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "meshaudit=debug" } else { "meshaudit=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Convert {
            inputs,
            output,
            tolerance,
            jobs,
            config,
            summary,
            create_output_dir,
            progress,
        } => {
            let mut config = BatchConfig::load(config.as_deref())?;
            if let Some(tolerance) = tolerance {
                config.tolerance = tolerance;
            }
            if let Some(jobs) = jobs {
                config.jobs = jobs;
            }
            config.create_output_dir |= create_output_dir;
            config.progress |= progress;
            config.validate()?;

            convert_command(config, &inputs, output, summary.as_deref(), cli.verbose)
        }
        Commands::Analyze { meshes, json } => analyze_command(&meshes, json),
        Commands::Version => {
            println!("meshaudit v{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_OK)
        }
    }
}

fn convert_command(
    config: BatchConfig,
    inputs: &[PathBuf],
    output: PathBuf,
    summary: Option<&Path>,
    verbose: bool,
) -> Result<i32> {
    let registry = ConverterRegistry::with_defaults(config.converter.as_ref());
    let files = expand_inputs(inputs, &registry);

    if verbose {
        println!(
            "{} {} file(s) with tolerance {} ({})",
            "Converting".bold().cyan(),
            files.len(),
            config.tolerance,
            registry.extensions().join(", ")
        );
    }

    let coordinator = BatchCoordinator::new(config, registry);
    let request = BatchRequest::new(files, output);
    let result = coordinator.run(&request)?;

    BatchReporter::print_summary_with_verbose(&result, verbose);

    if let Some(path) = summary {
        BatchReporter::write_json(&result, path)?;
        println!("\n{} {}", "Summary written to".green(), path.display());
    }

    Ok(if result.has_failures() {
        EXIT_ITEM_FAILURE
    } else {
        EXIT_OK
    })
}

/// Replace directories by the convertible files beneath them, sorted
fn expand_inputs(inputs: &[PathBuf], registry: &ConverterRegistry) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| registry.handles(path))
                .collect();
            found.sort();
            tracing::debug!(dir = %input.display(), files = found.len(), "expanded input directory");
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    files
}

#[derive(Serialize)]
struct AnalyzedFile<'a> {
    path: &'a Path,
    analysis: AnalysisResult,
}

fn analyze_command(meshes: &[PathBuf], json: bool) -> Result<i32> {
    let mut analyzed = Vec::new();
    let mut failed = 0;

    for path in meshes {
        let analysis = load_stl(path)
            .map_err(anyhow::Error::from)
            .and_then(|mesh| analyze(&mesh).map_err(anyhow::Error::from))
            .with_context(|| format!("Failed to analyze {}", path.display()));

        match analysis {
            Ok(analysis) => analyzed.push(AnalyzedFile { path, analysis }),
            Err(e) => {
                eprintln!("{} {:#}", "✗".red(), e);
                failed += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&analyzed)?);
    } else {
        for (i, file) in analyzed.iter().enumerate() {
            if meshes.len() > 1 {
                if i > 0 {
                    println!();
                }
                println!("{}", format!("==> {} <==", file.path.display()).bold());
            }
            print!("{}", format_report(&file.analysis));
        }
    }

    Ok(if failed > 0 { EXIT_ITEM_FAILURE } else { EXIT_OK })
}
