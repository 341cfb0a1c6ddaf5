// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch configuration

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::convert::ExternalConverterConfig;
use crate::io::StlFormat;

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "meshaudit.toml";

/// Batch conversion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Chordal tolerance handed to the tessellator
    pub tolerance: f64,
    /// Worker count; 1 runs sequentially, 0 uses every available core
    pub jobs: usize,
    /// Extension of written mesh files, without the dot
    pub mesh_extension: String,
    /// Appended to the mesh file name to name the report
    pub report_suffix: String,
    /// Encoding of written mesh files
    pub stl_format: StlFormat,
    /// Create the output directory when it does not exist
    pub create_output_dir: bool,
    /// Show a progress bar while the batch runs
    pub progress: bool,
    /// External BREP tessellator
    pub converter: Option<ExternalConverterConfig>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            jobs: 1,
            mesh_extension: "stl".to_string(),
            report_suffix: ".txt".to_string(),
            stl_format: StlFormat::Binary,
            create_output_dir: false,
            progress: false,
            converter: None,
        }
    }
}

impl BatchConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: BatchConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration from `explicit`, else `meshaudit.toml` when present,
    /// else defaults; then apply environment variable overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if PathBuf::from(CONFIG_FILE_NAME).exists() => Self::from_file(CONFIG_FILE_NAME)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `MESHAUDIT_*` overrides read through `lookup`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(tolerance) = lookup("MESHAUDIT_TOLERANCE") {
            match tolerance.parse() {
                Ok(value) => self.tolerance = value,
                Err(_) => tracing::warn!(value = %tolerance, "ignoring unparsable MESHAUDIT_TOLERANCE"),
            }
        }

        if let Some(jobs) = lookup("MESHAUDIT_JOBS") {
            match jobs.parse() {
                Ok(value) => self.jobs = value,
                Err(_) => tracing::warn!(value = %jobs, "ignoring unparsable MESHAUDIT_JOBS"),
            }
        }

        if let Some(program) = lookup("MESHAUDIT_CONVERTER") {
            match self.converter.as_mut() {
                Some(converter) => converter.program = program,
                None => self.converter = Some(ExternalConverterConfig::for_program(program)),
            }
        }
    }

    /// Reject settings no batch can run with
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            bail!("tolerance must be a positive number, got {}", self.tolerance);
        }
        if self.mesh_extension.is_empty() || self.mesh_extension.contains(['/', '\\', '.']) {
            bail!("invalid mesh extension {:?}", self.mesh_extension);
        }
        if self.report_suffix.is_empty() || self.report_suffix.contains(['/', '\\']) {
            bail!("invalid report suffix {:?}", self.report_suffix);
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Number of workers to run with
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 {
            rayon::current_num_threads()
        } else {
            self.jobs
        }
    }
}
