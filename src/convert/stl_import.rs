// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pass-through converter for inputs that are already tessellated

use super::TessellationConverter;
use crate::error::{ConvertError, MeshError};
use crate::geometry::Mesh;
use crate::io::load_stl;
use std::path::Path;

/// Loads an STL input as-is; the tolerance has no effect
pub struct StlImportConverter;

impl TessellationConverter for StlImportConverter {
    fn convert(&self, input: &Path, _tolerance: f64) -> Result<Mesh, ConvertError> {
        match load_stl(input) {
            Ok(mesh) => Ok(mesh),
            Err(MeshError::Read { path, source }) => Err(ConvertError::InvalidGeometry(format!(
                "STL file {} could not be loaded: {}",
                path.display(),
                source
            ))),
            Err(e) => Err(ConvertError::Mesh(e)),
        }
    }

    fn name(&self) -> &str {
        "stl-import"
    }
}
