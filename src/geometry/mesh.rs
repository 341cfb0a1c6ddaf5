// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::BoundingBox;
use crate::error::MeshError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Mesh vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// Triangle defined by three vertex indices, counter-clockwise seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    /// The three directed edges implied by the winding order
    pub fn directed_edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.indices;
        [(a, b), (b, c), (c, a)]
    }

    /// Unit normal from the winding order, zero for a degenerate triangle.
    /// Indices must be in range.
    pub fn face_normal(&self, mesh: &Mesh) -> Vector3<f64> {
        let v0 = &mesh.vertices[self.indices[0]].position;
        let v1 = &mesh.vertices[self.indices[1]].position;
        let v2 = &mesh.vertices[self.indices[2]].position;

        let normal = (v1 - v0).cross(&(v2 - v0));
        let length = normal.norm();
        if length > 1e-12 {
            normal / length
        } else {
            Vector3::zeros()
        }
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Build a mesh from raw positions and index triples
    pub fn from_indexed(positions: &[[f64; 3]], faces: &[[usize; 3]]) -> Self {
        let mut mesh = Self::with_capacity(positions.len(), faces.len());
        for p in positions {
            mesh.add_vertex(Vertex::from_coords(p[0], p[1], p[2]));
        }
        for face in faces {
            mesh.add_triangle(Triangle::new(*face));
        }
        mesh
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle
    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check structural integrity: at least one triangle, every index in
    /// range, every coordinate finite.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.triangles.is_empty() {
            return Err(MeshError::NoTriangles);
        }

        let vertex_count = self.vertices.len();
        for (face, triangle) in self.triangles.iter().enumerate() {
            if let Some(&index) = triangle.indices.iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        if let Some(index) = self
            .vertices
            .iter()
            .position(|v| !v.position.coords.iter().all(|c| c.is_finite()))
        {
            return Err(MeshError::NonFiniteVertex { index });
        }

        Ok(())
    }
}
