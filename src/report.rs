// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-part quality report text

use crate::geometry::AnalysisResult;
use std::fmt::Write;

/// Render the four-line quality report for one analyzed part.
///
/// Extents are labelled length, breadth and height in x, y, z order.
pub fn format_report(result: &AnalysisResult) -> String {
    let [length, breadth, height] = result.extents;
    let mut report = String::with_capacity(160);

    // Writing into a String cannot fail
    let _ = writeln!(
        report,
        "Dimensions: length : {:.1} x breadth : {:.1} x height : {:.1}",
        length, breadth, height
    );
    let _ = writeln!(report, "Watertight percentage: {:.2}%", result.watertight_percent);
    let _ = writeln!(
        report,
        "Watertight: {}",
        if result.is_watertight { "Yes" } else { "No" }
    );
    let _ = writeln!(report, "Number of triangles: {}", result.triangle_count);

    report
}
