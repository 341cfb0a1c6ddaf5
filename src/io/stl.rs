// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL loading and export

use crate::error::MeshError;
use crate::geometry::{Mesh, Triangle, Vertex};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

/// STL encoding used when writing meshes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

/// Load an STL file (binary or ASCII) and validate its structure
pub fn load_stl(path: impl AsRef<Path>) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MeshError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    read_stl(&mut BufReader::new(file))
}

/// Parse STL data from a reader and validate its structure.
///
/// Identical positions are welded into shared vertices, so a closed surface
/// written as STL reads back closed.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> Result<Mesh, MeshError> {
    let stl = stl_io::read_stl(reader).map_err(|e| MeshError::Parse(e.to_string()))?;

    let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());
    for v in &stl.vertices {
        mesh.add_vertex(Vertex::from_coords(
            f64::from(v[0]),
            f64::from(v[1]),
            f64::from(v[2]),
        ));
    }
    for face in &stl.faces {
        mesh.add_triangle(Triangle::new(face.vertices));
    }

    mesh.validate()?;
    Ok(mesh)
}

/// Export mesh to binary STL
pub fn export_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    export_stl_with_format(mesh, path, StlFormat::Binary)
}

/// Export mesh to STL in the requested encoding
pub fn export_stl_with_format(mesh: &Mesh, path: impl AsRef<Path>, format: StlFormat) -> Result<()> {
    let path = path.as_ref();
    mesh.validate()
        .with_context(|| format!("Refusing to export invalid mesh to {}", path.display()))?;
    ensure_single_precision(mesh)
        .with_context(|| format!("Refusing to export mesh to {}", path.display()))?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let written = match format {
        StlFormat::Binary => write_stl_binary(mesh, &mut writer),
        StlFormat::Ascii => write_stl_ascii(mesh, &mut writer),
    };
    written.with_context(|| format!("Failed to write STL file: {}", path.display()))?;

    writer
        .flush()
        .with_context(|| format!("Failed to flush STL file: {}", path.display()))?;
    Ok(())
}

/// STL stores `f32` coordinates; a vertex outside that range would be
/// written as infinity and the file could not be loaded back.
fn ensure_single_precision(mesh: &Mesh) -> Result<()> {
    let outside = mesh.vertices.iter().position(|v| {
        let p = &v.position;
        !((p.x as f32).is_finite() && (p.y as f32).is_finite() && (p.z as f32).is_finite())
    });

    match outside {
        Some(index) => bail!("vertex {} does not fit in single precision", index),
        None => Ok(()),
    }
}

fn write_stl_binary<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

    let to_stl = |index: usize| {
        let p = &mesh.vertices[index].position;
        StlVertex::new([p.x as f32, p.y as f32, p.z as f32])
    };

    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .map(|tri| {
            let normal = tri.face_normal(mesh);
            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [
                    to_stl(tri.indices[0]),
                    to_stl(tri.indices[1]),
                    to_stl(tri.indices[2]),
                ],
            }
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter())
}

fn write_stl_ascii<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "solid mesh")?;

    for tri in &mesh.triangles {
        let normal = tri.face_normal(mesh);
        writeln!(writer, "  facet normal {} {} {}", normal.x, normal.y, normal.z)?;
        writeln!(writer, "    outer loop")?;
        for &index in &tri.indices {
            let p = &mesh.vertices[index].position;
            writeln!(
                writer,
                "      vertex {} {} {}",
                p.x as f32, p.y as f32, p.z as f32
            )?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid mesh")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{is_watertight, Primitive};
    use nalgebra::Vector3;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_export_and_load_binary() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("cube.stl");
        let mesh = Primitive::unit_cube().to_mesh();

        export_stl(&mesh, &path)?;
        // 80 byte header + 4 byte count + 50 bytes per triangle
        assert_eq!(std::fs::metadata(&path)?.len(), 84 + 50 * 12);

        let loaded = load_stl(&path)?;
        assert_eq!(loaded.triangle_count(), 12);
        assert_eq!(loaded.vertex_count(), 8);
        assert!(is_watertight(&loaded));
        Ok(())
    }

    #[test]
    fn test_export_and_load_ascii() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("cube.stl");
        let mesh = Primitive::unit_cube().to_mesh();

        export_stl_with_format(&mesh, &path, StlFormat::Ascii)?;
        let text = std::fs::read_to_string(&path)?;
        assert!(text.starts_with("solid mesh"));
        assert_eq!(text.matches("facet normal").count(), 12);

        let loaded = load_stl(&path)?;
        assert_eq!(loaded.triangle_count(), 12);
        assert!(is_watertight(&loaded));
        Ok(())
    }

    #[test]
    fn test_garbage_is_malformed() {
        let mut data = Cursor::new(b"this is not a mesh".to_vec());
        assert!(matches!(read_stl(&mut data), Err(MeshError::Parse(_))));
    }

    #[test]
    fn test_zero_triangle_binary_is_rejected() {
        let mut bytes = vec![0u8; 80];
        bytes.extend_from_slice(&0u32.to_le_bytes());

        let mut data = Cursor::new(bytes);
        assert!(matches!(read_stl(&mut data), Err(MeshError::NoTriangles)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = load_stl("/nonexistent/definitely/missing.stl");
        assert!(matches!(result, Err(MeshError::Read { .. })));
    }

    #[test]
    fn test_export_refuses_invalid_mesh() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.stl");
        let mut mesh = Primitive::unit_cube().to_mesh();
        mesh.triangles[0] = Triangle::new([0, 1, 42]);

        assert!(export_stl(&mesh, &path).is_err());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_export_refuses_coordinates_beyond_f32() -> Result<()> {
        let dir = tempdir()?;
        let mesh = Primitive::cube(Vector3::new(1e39, 1e39, 1e39), false).to_mesh();

        for format in [StlFormat::Binary, StlFormat::Ascii] {
            let path = dir.path().join(format!("huge-{:?}.stl", format));
            let err = export_stl_with_format(&mesh, &path, format).unwrap_err();
            assert!(format!("{:#}", err).contains("single precision"));
            assert!(!path.exists());
        }
        Ok(())
    }
}
