//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - fetcher output rows (`IndicatorRow`) and tagged observations (`Observation`)
//! - the provenance tag (`Source`)
//! - run configuration (`PipelineConfig`, `WeoBackend`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
