// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy for mesh loading, conversion, analysis and batching

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Structural problems in a triangle mesh
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to read mesh file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed STL data: {0}")]
    Parse(String),

    #[error("mesh has no triangles")]
    NoTriangles,

    #[error("triangle {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },
}

/// Failures of the tessellation step
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("no converter registered for {}", .0.display())]
    Unsupported(PathBuf),

    #[error("tessellator produced a malformed mesh: {0}")]
    Mesh(#[from] MeshError),
}

/// Failures of the mesh analyzer
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("degenerate mesh: {0}")]
    DegenerateMesh(String),

    #[error("non-finite {0} while analyzing mesh")]
    NonFinite(&'static str),

    #[error("invalid mesh topology: {0}")]
    InvalidMesh(#[from] MeshError),
}

/// Whole-batch precondition failures, reported before any item runs
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("output directory {} is not accessible: {reason}", path.display())]
    OutputDirectory { path: PathBuf, reason: String },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Per-item failure tag recorded in a batch outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidGeometry,
    MalformedMesh,
    DegenerateMesh,
    AnalysisError,
    Io,
    OutputCollision,
    InvalidPath,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidGeometry => "invalid geometry",
            ErrorKind::MalformedMesh => "malformed mesh",
            ErrorKind::DegenerateMesh => "degenerate mesh",
            ErrorKind::AnalysisError => "analysis error",
            ErrorKind::Io => "i/o error",
            ErrorKind::OutputCollision => "output name collision",
            ErrorKind::InvalidPath => "invalid input path",
        }
    }

    /// Whether the mesh file for the item was already written when it failed
    pub fn keeps_mesh(&self) -> bool {
        matches!(self, ErrorKind::DegenerateMesh | ErrorKind::AnalysisError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ConvertError> for ErrorKind {
    fn from(err: &ConvertError) -> Self {
        match err {
            ConvertError::Mesh(_) => ErrorKind::MalformedMesh,
            ConvertError::InvalidGeometry(_) | ConvertError::Unsupported(_) => {
                ErrorKind::InvalidGeometry
            }
        }
    }
}

impl From<&AnalysisError> for ErrorKind {
    fn from(err: &AnalysisError) -> Self {
        match err {
            AnalysisError::DegenerateMesh(_) => ErrorKind::DegenerateMesh,
            AnalysisError::NonFinite(_) | AnalysisError::InvalidMesh(_) => ErrorKind::AnalysisError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_error_kinds() {
        let invalid = ConvertError::InvalidGeometry("bad solid".into());
        assert_eq!(ErrorKind::from(&invalid), ErrorKind::InvalidGeometry);

        let unsupported = ConvertError::Unsupported(PathBuf::from("part.iges"));
        assert_eq!(ErrorKind::from(&unsupported), ErrorKind::InvalidGeometry);

        let malformed = ConvertError::from(MeshError::NoTriangles);
        assert_eq!(ErrorKind::from(&malformed), ErrorKind::MalformedMesh);
    }

    #[test]
    fn test_analysis_error_kinds() {
        let degenerate = AnalysisError::DegenerateMesh("flat".into());
        assert_eq!(ErrorKind::from(&degenerate), ErrorKind::DegenerateMesh);
        assert!(ErrorKind::DegenerateMesh.keeps_mesh());

        let fault = AnalysisError::NonFinite("volume");
        assert_eq!(ErrorKind::from(&fault), ErrorKind::AnalysisError);
        assert!(!ErrorKind::MalformedMesh.keeps_mesh());
    }

    #[test]
    fn test_messages_name_the_problem() {
        let err = MeshError::IndexOutOfRange {
            face: 3,
            index: 9,
            vertex_count: 8,
        };
        assert_eq!(
            err.to_string(),
            "triangle 3 references vertex 9, but the mesh has 8 vertices"
        );
        assert_eq!(ErrorKind::OutputCollision.to_string(), "output name collision");
    }
}
