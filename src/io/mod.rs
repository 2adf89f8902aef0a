//! Output helpers: CSV + Parquet artifacts per pipeline stage (`export`).

pub mod export;

pub use export::*;
