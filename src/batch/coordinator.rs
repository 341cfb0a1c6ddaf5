// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch coordinator - plans, converts, analyzes and reports every input

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::config::BatchConfig;
use super::types::{BatchRequest, BatchResult, ConversionOutcome};
use crate::convert::TessellationConverter;
use crate::error::{BatchError, ErrorKind};
use crate::geometry::{analyze, AnalysisResult};
use crate::io::export_stl_with_format;
use crate::report::format_report;

/// Output locations for one input, or the reason it cannot run
#[derive(Debug, Clone)]
enum PlannedItem {
    Ready {
        input: PathBuf,
        mesh_path: PathBuf,
        report_path: PathBuf,
    },
    Rejected {
        input: PathBuf,
        kind: ErrorKind,
        message: String,
    },
}

#[derive(Debug)]
struct ItemFailure {
    kind: ErrorKind,
    message: String,
    mesh_kept: bool,
}

impl ItemFailure {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            mesh_kept: false,
        }
    }

    fn with_mesh_kept(mut self) -> Self {
        self.mesh_kept = true;
        self
    }
}

/// Runs batches of conversions with a single converter
pub struct BatchCoordinator<C> {
    config: BatchConfig,
    converter: C,
}

impl<C: TessellationConverter> BatchCoordinator<C> {
    pub fn new(config: BatchConfig, converter: C) -> Self {
        Self { config, converter }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Process every input of `request`.
    ///
    /// Item failures are recorded in the result; only whole-batch
    /// preconditions return `Err`, before any item runs.
    pub fn run(&self, request: &BatchRequest) -> Result<BatchResult, BatchError> {
        if request.is_empty() {
            tracing::info!("no input files selected; nothing to do");
            return Ok(BatchResult::nothing_to_do());
        }

        self.prepare_output_dir(&request.output_dir)?;

        let start = Instant::now();
        let plan = self.plan(request);
        let progress = self.progress_bar(plan.len());

        let jobs = self.config.effective_jobs();
        let outcomes: Vec<ConversionOutcome> = if jobs <= 1 {
            plan.iter().map(|item| self.execute(item, &progress)).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .thread_name(|i| format!("meshaudit-worker-{}", i))
                .build()
                .map_err(|e| BatchError::WorkerPool(e.to_string()))?;
            tracing::debug!(jobs, items = plan.len(), "fanning out batch");
            pool.install(|| {
                plan.par_iter()
                    .map(|item| self.execute(item, &progress))
                    .collect::<Vec<_>>()
            })
        };

        progress.finish_and_clear();

        let result = BatchResult::from_outcomes(outcomes, start.elapsed());
        if result.has_failures() {
            tracing::warn!(
                succeeded = result.succeeded,
                failed = result.failed,
                "{}",
                result.summary_line()
            );
        } else {
            tracing::info!(succeeded = result.succeeded, "{}", result.summary_line());
        }

        Ok(result)
    }

    fn prepare_output_dir(&self, dir: &Path) -> Result<(), BatchError> {
        if dir.is_dir() {
            return Ok(());
        }

        if dir.exists() {
            return Err(BatchError::OutputDirectory {
                path: dir.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        if !self.config.create_output_dir {
            return Err(BatchError::OutputDirectory {
                path: dir.to_path_buf(),
                reason: "does not exist".to_string(),
            });
        }

        std::fs::create_dir_all(dir).map_err(|e| BatchError::OutputDirectory {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::debug!(dir = %dir.display(), "created output directory");
        Ok(())
    }

    /// Derive output paths and reject inputs whose mesh path is already taken.
    ///
    /// Names are compared case-insensitively so that `Part.step` and
    /// `part.step` collide on case-insensitive filesystems too.
    fn plan(&self, request: &BatchRequest) -> Vec<PlannedItem> {
        let mut claimed: HashMap<String, &Path> = HashMap::new();

        request
            .inputs
            .iter()
            .map(|input| {
                let stem = match input.file_stem().and_then(|s| s.to_str()) {
                    Some(stem) if !stem.is_empty() => stem,
                    _ => {
                        return PlannedItem::Rejected {
                            input: input.clone(),
                            kind: ErrorKind::InvalidPath,
                            message: "input has no usable file name".to_string(),
                        }
                    }
                };

                let mesh_name = format!("{}.{}", stem, self.config.mesh_extension);
                let mesh_path = request.output_dir.join(&mesh_name);
                let report_path = request
                    .output_dir
                    .join(format!("{}{}", mesh_name, self.config.report_suffix));

                let key = mesh_name.to_lowercase();
                if let Some(owner) = claimed.get(&key) {
                    return PlannedItem::Rejected {
                        input: input.clone(),
                        kind: ErrorKind::OutputCollision,
                        message: format!(
                            "{} is already produced by {}",
                            mesh_path.display(),
                            owner.display()
                        ),
                    };
                }
                claimed.insert(key, input);

                tracing::debug!(input = %input.display(), mesh = %mesh_path.display(), "planned");
                PlannedItem::Ready {
                    input: input.clone(),
                    mesh_path,
                    report_path,
                }
            })
            .collect()
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    fn execute(&self, item: &PlannedItem, progress: &ProgressBar) -> ConversionOutcome {
        let start = Instant::now();

        let outcome = match item {
            PlannedItem::Rejected {
                input,
                kind,
                message,
            } => ConversionOutcome::Failure {
                input: input.clone(),
                kind: *kind,
                message: message.clone(),
                mesh_path: None,
                duration: start.elapsed(),
            },
            PlannedItem::Ready {
                input,
                mesh_path,
                report_path,
            } => {
                progress.set_message(input.display().to_string());
                match self.process(input, mesh_path, report_path) {
                    Ok(analysis) => ConversionOutcome::Success {
                        input: input.clone(),
                        mesh_path: mesh_path.clone(),
                        report_path: report_path.clone(),
                        analysis,
                        duration: start.elapsed(),
                    },
                    Err(failure) => ConversionOutcome::Failure {
                        input: input.clone(),
                        kind: failure.kind,
                        message: failure.message,
                        mesh_path: failure.mesh_kept.then(|| mesh_path.clone()),
                        duration: start.elapsed(),
                    },
                }
            }
        };

        match &outcome {
            ConversionOutcome::Success { input, analysis, .. } => tracing::info!(
                input = %input.display(),
                triangles = analysis.triangle_count,
                watertight = analysis.is_watertight,
                "{}",
                outcome.diagnostic()
            ),
            ConversionOutcome::Failure { input, kind, .. } => tracing::warn!(
                input = %input.display(),
                kind = kind.as_str(),
                "{}",
                outcome.diagnostic()
            ),
        }

        progress.inc(1);
        outcome
    }

    fn process(&self, input: &Path, mesh_path: &Path, report_path: &Path) -> Result<AnalysisResult, ItemFailure> {
        let mesh = self
            .converter
            .convert(input, self.config.tolerance)
            .map_err(|e| ItemFailure::new(ErrorKind::from(&e), e.to_string()))?;

        mesh.validate()
            .map_err(|e| ItemFailure::new(ErrorKind::MalformedMesh, e.to_string()))?;

        export_stl_with_format(&mesh, mesh_path, self.config.stl_format)
            .map_err(|e| ItemFailure::new(ErrorKind::Io, format!("{:#}", e)))?;

        let analysis = analyze(&mesh)
            .map_err(|e| ItemFailure::new(ErrorKind::from(&e), e.to_string()).with_mesh_kept())?;

        std::fs::write(report_path, format_report(&analysis)).map_err(|e| {
            ItemFailure::new(
                ErrorKind::Io,
                format!("failed to write report {}: {}", report_path.display(), e),
            )
            .with_mesh_kept()
        })?;

        Ok(analysis)
    }
}
