// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tessellation converters: turn an input CAD file into a triangle mesh

mod external;
mod stl_import;

pub use external::{ExternalCommandConverter, ExternalConverterConfig};
pub use stl_import::StlImportConverter;

use crate::error::ConvertError;
use crate::geometry::Mesh;
use std::path::Path;

/// Produces a triangle mesh from one input file.
///
/// Implementations must be deterministic for a fixed input and tolerance.
/// The call may block for a long time; it is the only suspension point of a
/// batch item.
pub trait TessellationConverter: Send + Sync {
    fn convert(&self, input: &Path, tolerance: f64) -> Result<Mesh, ConvertError>;

    /// Short name used in diagnostics
    fn name(&self) -> &str;
}

/// Dispatches inputs to converters by file extension
pub struct ConverterRegistry {
    entries: Vec<(Vec<String>, Box<dyn TessellationConverter>)>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// STL pass-through plus the external tessellator, when one is configured
    pub fn with_defaults(external: Option<&ExternalConverterConfig>) -> Self {
        let mut registry = Self::new();
        registry.register(&["stl"], StlImportConverter);
        if let Some(config) = external {
            let extensions: Vec<&str> = config.extensions.iter().map(String::as_str).collect();
            registry.register(&extensions, ExternalCommandConverter::new(config.clone()));
        }
        registry
    }

    /// Register a converter for the given extensions. Earlier registrations
    /// win when extensions overlap.
    pub fn register(&mut self, extensions: &[&str], converter: impl TessellationConverter + 'static) {
        let extensions = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self.entries.push((extensions, Box::new(converter)));
    }

    /// Converter responsible for the input, if any
    pub fn resolve(&self, input: &Path) -> Option<&dyn TessellationConverter> {
        let extension = input.extension()?.to_str()?.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(extensions, _)| extensions.iter().any(|e| *e == extension))
            .map(|(_, converter)| converter.as_ref())
    }

    pub fn handles(&self, input: &Path) -> bool {
        self.resolve(input).is_some()
    }

    /// All registered extensions, lower-case, in registration order
    pub fn extensions(&self) -> Vec<&str> {
        self.entries
            .iter()
            .flat_map(|(extensions, _)| extensions.iter().map(String::as_str))
            .collect()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults(None)
    }
}

impl TessellationConverter for ConverterRegistry {
    fn convert(&self, input: &Path, tolerance: f64) -> Result<Mesh, ConvertError> {
        let converter = self
            .resolve(input)
            .ok_or_else(|| ConvertError::Unsupported(input.to_path_buf()))?;
        tracing::debug!(input = %input.display(), converter = converter.name(), "dispatching conversion");
        converter.convert(input, tolerance)
    }

    fn name(&self) -> &str {
        "registry"
    }
}
