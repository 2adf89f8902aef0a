//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - loads configuration from the environment
//! - runs the collection pipeline
//! - prints the completion summary and a preview of the combined table

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::PipelineConfig;
use crate::error::AppError;

pub mod pipeline;

/// Rows shown in the stdout preview.
pub const PREVIEW_ROWS: usize = 20;

/// Entry point for the `sovrisk` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    let config = PipelineConfig::from_env()?;
    debug!(?config, "configuration loaded");

    let output = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_run_summary(&output, &config));
    println!(
        "{}",
        crate::report::format_preview(&output.combined, PREVIEW_ROWS)
    );

    Ok(())
}

/// Log to stderr so stdout stays reserved for the summary and preview.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sovereign_risk=info"));

    // try_init: a global subscriber may already be installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
