// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshaudit
//!
//! Converts solid CAD models to STL meshes in batches and reports a quality
//! analysis for every mesh: extents, triangle count, watertightness and how
//! much of the bounding box the enclosed volume fills.

pub mod batch;
pub mod convert;
pub mod error;
pub mod geometry;
pub mod io;
pub mod report;

pub use batch::{BatchConfig, BatchCoordinator, BatchRequest, BatchResult, BatchStatus, ConversionOutcome};
pub use convert::{ConverterRegistry, TessellationConverter};
pub use error::{AnalysisError, BatchError, ConvertError, ErrorKind, MeshError};
pub use geometry::{analyze, AnalysisResult, Mesh, Primitive};
pub use io::{export_stl, load_stl};
pub use report::format_report;

use anyhow::Result;
use std::path::Path;

/// Load an STL file and return its quality report text
pub fn report_for_file(path: impl AsRef<Path>) -> Result<String> {
    let mesh = load_stl(path)?;
    let analysis = analyze(&mesh)?;
    Ok(format_report(&analysis))
}
