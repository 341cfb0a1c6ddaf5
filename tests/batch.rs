// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end batch conversion tests

use anyhow::Result;
use meshaudit::batch::{BatchConfig, BatchCoordinator, BatchRequest, BatchStatus, ConversionOutcome};
use meshaudit::error::{BatchError, ConvertError, ErrorKind};
use meshaudit::geometry::{Mesh, Primitive};
use meshaudit::io::{export_stl, load_stl};
use meshaudit::{ConverterRegistry, TessellationConverter};
use nalgebra::Vector3;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const CUBE_REPORT: &str = "Dimensions: length : 1.0 x breadth : 1.0 x height : 1.0\n\
                           Watertight percentage: 100.00%\n\
                           Watertight: Yes\n\
                           Number of triangles: 12\n";

struct Workspace {
    _root: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new() -> Result<Self> {
        let root = tempdir()?;
        let input = root.path().join("parts");
        let output = root.path().join("meshes");
        fs::create_dir_all(&input)?;
        fs::create_dir_all(&output)?;
        Ok(Self {
            _root: root,
            input,
            output,
        })
    }

    fn write_mesh(&self, name: &str, mesh: &Mesh) -> Result<PathBuf> {
        let path = self.input.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        export_stl(mesh, &path)?;
        Ok(path)
    }

    fn write_raw(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.input.join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    fn output_files(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(&self.output)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }
}

fn coordinator(jobs: usize) -> BatchCoordinator<ConverterRegistry> {
    let mut config = BatchConfig::default();
    config.jobs = jobs;
    BatchCoordinator::new(config, ConverterRegistry::default())
}

fn flat_square() -> Mesh {
    Mesh::from_indexed(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        &[[0, 1, 2], [0, 2, 3]],
    )
}

#[test]
fn test_one_malformed_input_among_four() -> Result<()> {
    let ws = Workspace::new()?;
    let inputs = vec![
        ws.write_mesh("alpha.stl", &Primitive::unit_cube().to_mesh())?,
        ws.write_mesh("beta.stl", &Primitive::icosphere(2.0, 2).to_mesh())?,
        ws.write_raw("broken.stl", "this is not a mesh")?,
        ws.write_mesh("delta.stl", &Primitive::unit_cube().to_mesh())?,
    ];

    let result = coordinator(1).run(&BatchRequest::new(inputs.clone(), &ws.output))?;

    assert_eq!(result.outcomes.len(), 4);
    assert_eq!((result.succeeded, result.failed), (3, 1));
    assert_eq!(result.status(), BatchStatus::PartialFailure);

    let failures: Vec<&ConversionOutcome> = result.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].input(), inputs[2].as_path());
    assert_eq!(failures[0].error_kind(), Some(ErrorKind::MalformedMesh));

    assert_eq!(
        ws.output_files()?,
        vec![
            "alpha.stl",
            "alpha.stl.txt",
            "beta.stl",
            "beta.stl.txt",
            "delta.stl",
            "delta.stl.txt"
        ]
    );
    assert_eq!(fs::read_to_string(ws.output.join("alpha.stl.txt"))?, CUBE_REPORT);
    assert!(!result.summary_line().starts_with("All"));
    Ok(())
}

#[test]
fn test_empty_request_is_nothing_to_do() -> Result<()> {
    let result = coordinator(1).run(&BatchRequest::new(Vec::<PathBuf>::new(), "/nonexistent/output"))?;

    assert_eq!(result.status(), BatchStatus::NothingToDo);
    assert!(result.outcomes.is_empty());
    assert!(!result.has_failures());
    Ok(())
}

#[test]
fn test_missing_output_directory_aborts_before_any_item() -> Result<()> {
    let ws = Workspace::new()?;
    let input = ws.write_mesh("alpha.stl", &Primitive::unit_cube().to_mesh())?;
    let missing = ws.output.join("does-not-exist");

    let result = coordinator(1).run(&BatchRequest::new([input], &missing));
    match result {
        Err(BatchError::OutputDirectory { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected OutputDirectory error, got {:?}", other.map(|r| r.status())),
    }
    assert!(!missing.exists());
    Ok(())
}

#[test]
fn test_output_name_collision_keeps_first() -> Result<()> {
    let ws = Workspace::new()?;
    let first = ws.write_mesh("part.stl", &Primitive::unit_cube().to_mesh())?;
    let second = ws.write_mesh("revision/part.stl", &Primitive::icosphere(1.0, 1).to_mesh())?;

    let result = coordinator(1).run(&BatchRequest::new([first, second.clone()], &ws.output))?;

    assert_eq!((result.succeeded, result.failed), (1, 1));
    assert!(result.outcomes[0].is_success());
    assert_eq!(result.outcomes[1].input(), second.as_path());
    assert_eq!(result.outcomes[1].error_kind(), Some(ErrorKind::OutputCollision));

    let written = load_stl(ws.output.join("part.stl"))?;
    assert_eq!(written.triangle_count(), 12);
    Ok(())
}

#[test]
fn test_parallel_outcomes_follow_input_order() -> Result<()> {
    let ws = Workspace::new()?;
    let mut inputs = Vec::new();
    for i in 0..8 {
        let name = format!("part_{}.stl", i);
        let path = if i == 5 {
            ws.write_raw(&name, "garbage")?
        } else {
            ws.write_mesh(&name, &Primitive::icosphere(1.0 + i as f64, (i % 3) as u32).to_mesh())?
        };
        inputs.push(path);
    }

    let result = coordinator(3).run(&BatchRequest::new(inputs.clone(), &ws.output))?;

    let order: Vec<&Path> = result.outcomes.iter().map(|o| o.input()).collect();
    let expected: Vec<&Path> = inputs.iter().map(PathBuf::as_path).collect();
    assert_eq!(order, expected);
    assert_eq!((result.succeeded, result.failed), (7, 1));
    assert!(!result.outcomes[5].is_success());
    Ok(())
}

#[test]
fn test_degenerate_mesh_keeps_mesh_without_report() -> Result<()> {
    let ws = Workspace::new()?;
    let input = ws.write_mesh("sheet.stl", &flat_square())?;

    let result = coordinator(1).run(&BatchRequest::new([input], &ws.output))?;

    assert_eq!(result.status(), BatchStatus::AllFailed);
    match &result.outcomes[0] {
        ConversionOutcome::Failure { kind, mesh_path, .. } => {
            assert_eq!(*kind, ErrorKind::DegenerateMesh);
            assert_eq!(mesh_path.as_deref(), Some(ws.output.join("sheet.stl").as_path()));
        }
        other => panic!("expected a failure, got {:?}", other),
    }
    assert_eq!(ws.output_files()?, vec!["sheet.stl"]);
    Ok(())
}

#[test]
fn test_unsupported_extension_is_invalid_geometry() -> Result<()> {
    let ws = Workspace::new()?;
    let input = ws.write_raw("bracket.step", "ISO-10303-21;")?;

    let result = coordinator(1).run(&BatchRequest::new([input], &ws.output))?;

    assert_eq!(result.outcomes[0].error_kind(), Some(ErrorKind::InvalidGeometry));
    assert!(ws.output_files()?.is_empty());
    Ok(())
}

#[test]
fn test_missing_input_is_invalid_geometry() -> Result<()> {
    let ws = Workspace::new()?;
    let result = coordinator(1).run(&BatchRequest::new([ws.input.join("ghost.stl")], &ws.output))?;

    assert_eq!(result.outcomes[0].error_kind(), Some(ErrorKind::InvalidGeometry));
    assert!(result.outcomes[0].diagnostic().contains("ghost.stl"));
    Ok(())
}

#[test]
fn test_all_succeeded() -> Result<()> {
    let ws = Workspace::new()?;
    let inputs = vec![
        ws.write_mesh("a.stl", &Primitive::unit_cube().to_mesh())?,
        ws.write_mesh("b.stl", &Primitive::unit_cube().to_mesh())?,
    ];

    let result = coordinator(0).run(&BatchRequest::new(inputs, &ws.output))?;

    assert_eq!(result.status(), BatchStatus::AllSucceeded);
    assert_eq!(result.summary_line(), "All 2 selected files converted successfully.");
    for outcome in &result.outcomes {
        let analysis = outcome.analysis().expect("successful outcome carries analysis");
        assert!(analysis.is_watertight);
    }
    Ok(())
}

/// Returns the same mesh for every input
struct FixedMesh(Mesh);

impl TessellationConverter for FixedMesh {
    fn convert(&self, _input: &Path, _tolerance: f64) -> Result<Mesh, ConvertError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "fixed-mesh"
    }
}

#[test]
fn test_mesh_beyond_stl_precision_is_io_failure() -> Result<()> {
    let ws = Workspace::new()?;
    let huge = Primitive::cube(Vector3::new(1e39, 1e39, 1e39), false).to_mesh();
    let coordinator = BatchCoordinator::new(BatchConfig::default(), FixedMesh(huge));

    let result = coordinator.run(&BatchRequest::new(["big.step"], &ws.output))?;

    match &result.outcomes[0] {
        ConversionOutcome::Failure { kind, mesh_path, .. } => {
            assert_eq!(*kind, ErrorKind::Io);
            assert!(mesh_path.is_none());
        }
        other => panic!("expected an Io failure, got {:?}", other),
    }
    assert!(ws.output_files()?.is_empty());
    Ok(())
}

#[test]
fn test_mesh_write_failure_keeps_nothing() -> Result<()> {
    let ws = Workspace::new()?;
    fs::create_dir(ws.output.join("alpha.stl"))?;
    let coordinator = BatchCoordinator::new(BatchConfig::default(), FixedMesh(Primitive::unit_cube().to_mesh()));

    let result = coordinator.run(&BatchRequest::new(["alpha.step"], &ws.output))?;

    match &result.outcomes[0] {
        ConversionOutcome::Failure { kind, mesh_path, .. } => {
            assert_eq!(*kind, ErrorKind::Io);
            assert!(mesh_path.is_none());
        }
        other => panic!("expected an Io failure, got {:?}", other),
    }
    assert!(!ws.output.join("alpha.stl.txt").exists());
    Ok(())
}

#[test]
fn test_report_write_failure_keeps_mesh() -> Result<()> {
    let ws = Workspace::new()?;
    fs::create_dir(ws.output.join("beta.stl.txt"))?;
    let coordinator = BatchCoordinator::new(BatchConfig::default(), FixedMesh(Primitive::unit_cube().to_mesh()));

    let result = coordinator.run(&BatchRequest::new(["beta.step"], &ws.output))?;

    let mesh = ws.output.join("beta.stl");
    match &result.outcomes[0] {
        ConversionOutcome::Failure { kind, mesh_path, .. } => {
            assert_eq!(*kind, ErrorKind::Io);
            assert_eq!(mesh_path.as_deref(), Some(mesh.as_path()));
        }
        other => panic!("expected an Io failure, got {:?}", other),
    }
    assert_eq!(load_stl(&mesh)?.triangle_count(), 12);
    Ok(())
}
