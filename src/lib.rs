//! `sovereign-risk` library crate.
//!
//! The binary (`sovrisk`) is a thin wrapper around this library so that:
//!
//! - fetchers and the pipeline are testable against stub transports
//! - the collection pipeline can be reused for further pillars

pub mod app;
pub mod combine;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod mapping;
pub mod report;
