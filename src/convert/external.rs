// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! External tessellator process adapter

use super::TessellationConverter;
use crate::error::ConvertError;
use crate::geometry::Mesh;
use crate::io::load_stl;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// How to invoke an external BREP-to-STL tessellator.
///
/// `args` may contain the placeholders `{input}`, `{output}` and
/// `{tolerance}`; `{output}` is a scratch STL path the tool must write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalConverterConfig {
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_args() -> Vec<String> {
    vec![
        "{input}".to_string(),
        "{output}".to_string(),
        "{tolerance}".to_string(),
    ]
}

fn default_extensions() -> Vec<String> {
    vec!["step".to_string(), "stp".to_string()]
}

impl ExternalConverterConfig {
    pub fn for_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: default_args(),
            extensions: default_extensions(),
        }
    }
}

/// Runs a tessellator subprocess and loads the STL it produces
pub struct ExternalCommandConverter {
    config: ExternalConverterConfig,
}

impl ExternalCommandConverter {
    pub fn new(config: ExternalConverterConfig) -> Self {
        Self { config }
    }

    fn expand_args(&self, input: &Path, output: &Path, tolerance: f64) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        let tolerance = tolerance.to_string();

        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{output}", &output)
                    .replace("{tolerance}", &tolerance)
            })
            .collect()
    }
}

impl TessellationConverter for ExternalCommandConverter {
    fn convert(&self, input: &Path, tolerance: f64) -> Result<Mesh, ConvertError> {
        if !input.is_file() {
            return Err(ConvertError::InvalidGeometry(format!(
                "input file not found: {}",
                input.display()
            )));
        }

        let scratch = tempfile::Builder::new()
            .prefix("meshaudit-")
            .tempdir()
            .map_err(|e| ConvertError::InvalidGeometry(format!("cannot create scratch directory: {}", e)))?;
        let output = scratch.path().join("tessellated.stl");
        let args = self.expand_args(input, &output, tolerance);

        tracing::debug!(program = %self.config.program, ?args, "running external tessellator");
        let start = Instant::now();

        let result = Command::new(&self.config.program)
            .args(&args)
            .output()
            .map_err(|e| {
                ConvertError::InvalidGeometry(format!("failed to run {}: {}", self.config.program, e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let detail = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("no output");
            return Err(ConvertError::InvalidGeometry(format!(
                "{} exited with {}: {}",
                self.config.program,
                result.status,
                detail.trim()
            )));
        }

        if !output.exists() {
            return Err(ConvertError::InvalidGeometry(format!(
                "{} did not produce a mesh",
                self.config.program
            )));
        }

        // Output the loader rejects surfaces as ConvertError::Mesh (MalformedMesh)
        let mesh = load_stl(&output)?;
        tracing::debug!(
            input = %input.display(),
            triangles = mesh.triangle_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "external tessellation finished"
        );
        Ok(mesh)
    }

    fn name(&self) -> &str {
        &self.config.program
    }
}
