// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and quality analysis

pub mod analytics;
mod bbox;
mod mesh;
mod primitives;

pub use analytics::{analyze, classify_edges, is_watertight, signed_volume, AnalysisResult, EdgeTopology};
pub use bbox::BoundingBox;
pub use mesh::{Mesh, Triangle, Vertex};
pub use primitives::Primitive;
