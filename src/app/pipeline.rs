//! The collection pipeline: fetch -> tag -> write raw -> combine -> write combined.
//!
//! Sources are passed in as trait objects so the same workflow runs against
//! live HTTP clients or stubs.

use std::path::PathBuf;

use tracing::info;

use crate::combine::combine;
use crate::data::{HttpTransport, IndicatorSource, WdiClient, WeoClient};
use crate::domain::{Observation, PipelineConfig};
use crate::error::AppError;
use crate::io::write_table;
use crate::mapping::{Pillar, SeriesMap};

/// Everything a single run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub wdi: Vec<Observation>,
    pub weo: Vec<Observation>,
    pub combined: Vec<Observation>,
    /// Every file written, in write order.
    pub artifacts: Vec<PathBuf>,
}

/// Run against the live World Bank / IMF endpoints.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunOutput, AppError> {
    let transport = HttpTransport::new()?;
    let wdi = WdiClient::new(transport.clone(), &config.wb_base_url);
    let weo = WeoClient::from_config(transport, config);

    run_with_sources(config, &wdi, &weo)
}

pub fn run_with_sources(
    config: &PipelineConfig,
    wdi: &dyn IndicatorSource,
    weo: &dyn IndicatorSource,
) -> Result<RunOutput, AppError> {
    config.validate()?;
    let pillar = Pillar::by_name(&config.pillar)
        .ok_or_else(|| AppError::new(2, format!("Unknown pillar '{}'.", config.pillar)))?;

    let mut artifacts = Vec::new();

    let wdi_rows = collect(config, wdi, &pillar.wdi);
    artifacts.extend(write_table(&wdi_rows, &config.stage_base("wdi"))?);

    let weo_rows = collect(config, weo, &pillar.weo);
    artifacts.extend(write_table(&weo_rows, &config.stage_base("weo"))?);

    let combined = combine(vec![wdi_rows.clone(), weo_rows.clone()]);
    artifacts.extend(write_table(&combined, &config.stage_base("combined"))?);

    info!(
        pillar = pillar.name,
        wdi = wdi_rows.len(),
        weo = weo_rows.len(),
        combined = combined.len(),
        "pipeline finished"
    );

    Ok(RunOutput {
        wdi: wdi_rows,
        weo: weo_rows,
        combined,
        artifacts,
    })
}

fn collect(config: &PipelineConfig, source: &dyn IndicatorSource, map: &SeriesMap) -> Vec<Observation> {
    let rows = source.fetch(&config.countries, &map.codes(), config.start, config.end);
    let fetched = rows.len();
    let tagged = map.tag(rows);
    info!(
        source = %source.source(),
        fetched,
        kept = tagged.len(),
        "collected indicator rows"
    );
    tagged
}
