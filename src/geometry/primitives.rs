// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed reference solids with shared vertices

use super::{Mesh, Triangle, Vertex};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};

/// Closed, consistently wound reference solids
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Icosphere { r: f64, subdivisions: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    /// Cube spanning [0, 1] on every axis
    pub fn unit_cube() -> Self {
        Self::cube(Vector3::new(1.0, 1.0, 1.0), false)
    }

    /// Subdivided icosahedron centered on the origin
    pub fn icosphere(r: f64, subdivisions: u32) -> Self {
        Self::Icosphere { r, subdivisions }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Cube { size, center } => generate_cube_mesh(*size, *center),
            Self::Icosphere { r, subdivisions } => generate_icosphere_mesh(*r, *subdivisions),
        }
    }
}

fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> Mesh {
    let offset = if center { size / 2.0 } else { Vector3::zeros() };
    let (min_x, max_x) = (-offset.x, size.x - offset.x);
    let (min_y, max_y) = (-offset.y, size.y - offset.y);
    let (min_z, max_z) = (-offset.z, size.z - offset.z);

    let positions = [
        [min_x, min_y, min_z],
        [max_x, min_y, min_z],
        [max_x, max_y, min_z],
        [min_x, max_y, min_z],
        [min_x, min_y, max_z],
        [max_x, min_y, max_z],
        [max_x, max_y, max_z],
        [min_x, max_y, max_z],
    ];

    // Two triangles per side, counter-clockwise seen from outside
    let faces = [
        // z+
        [4, 5, 6],
        [4, 6, 7],
        // z-
        [1, 0, 3],
        [1, 3, 2],
        // x+
        [5, 1, 2],
        [5, 2, 6],
        // x-
        [0, 4, 7],
        [0, 7, 3],
        // y+
        [7, 6, 2],
        [7, 2, 3],
        // y-
        [0, 1, 5],
        [0, 5, 4],
    ];

    Mesh::from_indexed(&positions, &faces)
}

fn generate_icosphere_mesh(radius: f64, subdivisions: u32) -> Mesh {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let corners = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];

    let mut mesh = Mesh::with_capacity(12, 20 * 4usize.pow(subdivisions));
    for [x, y, z] in corners {
        mesh.add_vertex(on_sphere(Vector3::new(x, y, z), radius));
    }

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        // Shared midpoints keep the refined surface closed
        let mut midpoints: AHashMap<(usize, usize), usize> = AHashMap::new();
        let mut refined = Vec::with_capacity(faces.len() * 4);

        for [a, b, c] in faces {
            let ab = midpoint(&mut mesh, &mut midpoints, a, b, radius);
            let bc = midpoint(&mut mesh, &mut midpoints, b, c, radius);
            let ca = midpoint(&mut mesh, &mut midpoints, c, a, radius);

            refined.push([a, ab, ca]);
            refined.push([b, bc, ab]);
            refined.push([c, ca, bc]);
            refined.push([ab, bc, ca]);
        }

        faces = refined;
    }

    for face in faces {
        mesh.add_triangle(Triangle::new(face));
    }

    mesh
}

fn on_sphere(direction: Vector3<f64>, radius: f64) -> Vertex {
    Vertex::new(Point3::from(direction.normalize() * radius))
}

fn midpoint(
    mesh: &mut Mesh,
    cache: &mut AHashMap<(usize, usize), usize>,
    a: usize,
    b: usize,
    radius: f64,
) -> usize {
    let key = (a.min(b), a.max(b));
    if let Some(&index) = cache.get(&key) {
        return index;
    }

    let pa = mesh.vertices[a].position.coords;
    let pb = mesh.vertices[b].position.coords;
    let index = mesh.add_vertex(on_sphere((pa + pb) / 2.0, radius));
    cache.insert(key, index);
    index
}
