// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch summary output: terminal and JSON

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use super::types::{BatchResult, BatchStatus, ConversionOutcome};

/// Batch reporter
pub struct BatchReporter;

impl BatchReporter {
    /// Write the full result as pretty JSON
    pub fn write_json(result: &BatchResult, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(result).context("Failed to serialize batch result")?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write batch summary: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Print terminal summary
    pub fn print_summary(result: &BatchResult) {
        Self::print_summary_with_verbose(result, false)
    }

    /// Print terminal summary; verbose mode lists successful items too
    pub fn print_summary_with_verbose(result: &BatchResult, verbose: bool) {
        println!("\n{}", "═".repeat(80).white());
        println!("{}", "Conversion Summary".bold());
        println!("{}", "═".repeat(80).white());
        println!("  {} {}", "Timestamp:".white(), result.timestamp.cyan());
        println!("  {} {}", "Inputs:".white(), result.total().to_string().cyan());
        println!("  {} {}", "Converted:".white(), result.succeeded.to_string().green());
        if result.failed > 0 {
            println!("  {} {}", "Failed:".white(), result.failed.to_string().red());
        } else {
            println!("  {} {}", "Failed:".white(), result.failed.to_string().green());
        }
        println!(
            "  {} {}",
            "Duration:".white(),
            format!("{:.2}s", result.duration.as_secs_f64()).cyan()
        );

        if !result.outcomes.is_empty() {
            println!("\n{}", "─".repeat(80).white());
        }

        for outcome in &result.outcomes {
            match outcome {
                ConversionOutcome::Success {
                    input,
                    mesh_path,
                    analysis,
                    ..
                } => {
                    if verbose {
                        println!(
                            "  {} {} → {} ({} triangles, {:.2}% watertight)",
                            "✓".green(),
                            input.display(),
                            mesh_path.display(),
                            analysis.triangle_count,
                            analysis.watertight_percent
                        );
                    }
                }
                ConversionOutcome::Failure { .. } => {
                    println!("  {} {}", "✗".red(), outcome.diagnostic());
                }
            }
        }

        println!("{}", "═".repeat(80).white());
        let line = result.summary_line();
        match result.status() {
            BatchStatus::NothingToDo => println!("{}", line.yellow()),
            BatchStatus::AllSucceeded => println!("{}", line.green().bold()),
            BatchStatus::PartialFailure => println!("{}", line.yellow().bold()),
            BatchStatus::AllFailed => println!("{}", line.red().bold()),
        }
    }
}
