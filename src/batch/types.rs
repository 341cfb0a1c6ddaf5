// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch request, per-item outcome and aggregate result types

use crate::error::ErrorKind;
use crate::geometry::AnalysisResult;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

// Custom serialization for Duration
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Ok(Duration::from_secs_f64(secs.max(0.0)))
}

/// Files to convert and where to put the results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

impl BatchRequest {
    pub fn new<I, P>(inputs: I, output_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output_dir: output_dir.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Result of processing one input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Success {
        input: PathBuf,
        mesh_path: PathBuf,
        report_path: PathBuf,
        analysis: AnalysisResult,
        #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
        duration: Duration,
    },
    Failure {
        input: PathBuf,
        kind: ErrorKind,
        message: String,
        /// Mesh written before the failure, left in place
        #[serde(skip_serializing_if = "Option::is_none", default)]
        mesh_path: Option<PathBuf>,
        #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
        duration: Duration,
    },
}

impl ConversionOutcome {
    pub fn input(&self) -> &Path {
        match self {
            ConversionOutcome::Success { input, .. } | ConversionOutcome::Failure { input, .. } => input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ConversionOutcome::Success { .. } => None,
            ConversionOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match self {
            ConversionOutcome::Success { analysis, .. } => Some(analysis),
            ConversionOutcome::Failure { .. } => None,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            ConversionOutcome::Success { duration, .. } | ConversionOutcome::Failure { duration, .. } => {
                *duration
            }
        }
    }

    /// One human-readable line naming the input and what happened to it
    pub fn diagnostic(&self) -> String {
        match self {
            ConversionOutcome::Success {
                input,
                mesh_path,
                report_path,
                ..
            } => format!(
                "Converted {} to {}; report saved as {}",
                input.display(),
                mesh_path.display(),
                report_path.display()
            ),
            ConversionOutcome::Failure {
                input,
                kind,
                message,
                mesh_path,
                ..
            } => {
                let mut line = format!("Failed to convert {}: {} ({})", input.display(), kind, message);
                if let Some(mesh) = mesh_path {
                    line.push_str(&format!("; mesh kept at {}", mesh.display()));
                }
                line
            }
        }
    }
}

/// Overall verdict for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    NothingToDo,
    AllSucceeded,
    PartialFailure,
    AllFailed,
}

/// Ordered outcomes of a batch plus aggregate counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub timestamp: String,
    /// One entry per requested input, in request order
    pub outcomes: Vec<ConversionOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
}

impl BatchResult {
    /// Result for an empty request
    pub fn nothing_to_do() -> Self {
        Self::from_outcomes(Vec::new(), Duration::ZERO)
    }

    pub fn from_outcomes(outcomes: Vec<ConversionOutcome>, duration: Duration) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - succeeded;

        Self {
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            outcomes,
            succeeded,
            failed,
            duration,
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn status(&self) -> BatchStatus {
        match (self.succeeded, self.failed) {
            (0, 0) => BatchStatus::NothingToDo,
            (_, 0) => BatchStatus::AllSucceeded,
            (0, _) => BatchStatus::AllFailed,
            _ => BatchStatus::PartialFailure,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConversionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Aggregate line reflecting the actual per-item outcomes
    pub fn summary_line(&self) -> String {
        match self.status() {
            BatchStatus::NothingToDo => "No input files selected; nothing to do.".to_string(),
            BatchStatus::AllSucceeded => {
                format!("All {} selected files converted successfully.", self.total())
            }
            BatchStatus::PartialFailure => format!(
                "{} of {} files converted successfully; {} failed.",
                self.succeeded,
                self.total(),
                self.failed
            ),
            BatchStatus::AllFailed => format!("All {} selected files failed to convert.", self.total()),
        }
    }
}
