// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch conversion: plan, convert, analyze and report a list of CAD files

pub mod config;
pub mod coordinator;
pub mod reporter;
pub mod types;

pub use config::{BatchConfig, CONFIG_FILE_NAME};
pub use coordinator::BatchCoordinator;
pub use reporter::BatchReporter;
pub use types::{BatchRequest, BatchResult, BatchStatus, ConversionOutcome};
