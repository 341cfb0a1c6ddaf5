// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh loading and export

mod stl;

pub use stl::{export_stl, export_stl_with_format, load_stl, read_stl, StlFormat};
