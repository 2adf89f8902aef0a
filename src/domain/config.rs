//! Run configuration.
//!
//! The binary takes no flags; everything is read from the environment (with
//! `.env` support) and passed into the pipeline explicitly.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

pub const DEFAULT_COUNTRIES: [&str; 3] = ["SEN", "GHA", "KEN"];
pub const DEFAULT_START: i32 = 2005;
pub const DEFAULT_END: i32 = 2030;
/// Widest accepted `end - start`; the DataMapper request lists every year.
pub const MAX_YEAR_SPAN: i64 = 200;
pub const DEFAULT_OUT_DIR: &str = "data/raw";
pub const DEFAULT_PILLAR: &str = "pillar1";

pub const WB_BASE_URL: &str = "https://api.worldbank.org/v2";
pub const IMF_SDMX_BASE_URL: &str = "http://dataservices.imf.org/REST/SDMX_JSON.svc";
pub const IMF_DATAMAPPER_BASE_URL: &str = "https://www.imf.org/external/datamapper/api/v1";
pub const DEFAULT_WEO_DATASET: &str = "IFS";

/// Which IMF client backs the WEO fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeoBackend {
    /// SDMX-JSON CompactData (long layout, column names vary by dataset).
    Sdmx,
    /// DataMapper API (wide layout, one column per year).
    DataMapper,
}

impl FromStr for WeoBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sdmx" => Ok(WeoBackend::Sdmx),
            "datamapper" => Ok(WeoBackend::DataMapper),
            other => Err(AppError::new(
                2,
                format!("Unknown WEO backend '{other}' (expected 'sdmx' or 'datamapper')."),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub countries: Vec<String>,
    pub start: i32,
    pub end: i32,
    pub out_dir: PathBuf,
    /// Artifact file prefix, e.g. `pillar1` -> `pillar1_wdi.csv`.
    pub pillar: String,
    pub weo_backend: WeoBackend,
    /// SDMX dataset id; ignored by the DataMapper backend.
    pub weo_dataset: String,
    pub wb_base_url: String,
    pub imf_sdmx_base_url: String,
    pub imf_datamapper_base_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            start: DEFAULT_START,
            end: DEFAULT_END,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            pillar: DEFAULT_PILLAR.to_string(),
            weo_backend: WeoBackend::Sdmx,
            weo_dataset: DEFAULT_WEO_DATASET.to_string(),
            wb_base_url: WB_BASE_URL.to_string(),
            imf_sdmx_base_url: IMF_SDMX_BASE_URL.to_string(),
            imf_datamapper_base_url: IMF_DATAMAPPER_BASE_URL.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load `.env` (if any) and build the config from `SOVRISK_*` variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get("SOVRISK_COUNTRIES") {
            config.countries = parse_countries(&raw);
        }
        if let Some(raw) = get("SOVRISK_START") {
            config.start = parse_year("SOVRISK_START", &raw)?;
        }
        if let Some(raw) = get("SOVRISK_END") {
            config.end = parse_year("SOVRISK_END", &raw)?;
        }
        if let Some(raw) = get("SOVRISK_OUT_DIR") {
            config.out_dir = PathBuf::from(raw.trim());
        }
        if let Some(raw) = get("SOVRISK_PILLAR") {
            config.pillar = raw.trim().to_string();
        }
        if let Some(raw) = get("SOVRISK_WEO_BACKEND") {
            config.weo_backend = raw.parse()?;
        }
        if let Some(raw) = get("SOVRISK_WEO_DATASET") {
            config.weo_dataset = raw.trim().to_string();
        }
        if let Some(raw) = get("SOVRISK_WB_BASE_URL") {
            config.wb_base_url = raw.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = get("SOVRISK_IMF_SDMX_BASE_URL") {
            config.imf_sdmx_base_url = raw.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = get("SOVRISK_IMF_DATAMAPPER_BASE_URL") {
            config.imf_datamapper_base_url = raw.trim().trim_end_matches('/').to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.countries.is_empty() {
            return Err(AppError::new(2, "Country list is empty."));
        }
        if self.start > self.end {
            return Err(AppError::new(
                2,
                format!("Invalid year range: start {} > end {}.", self.start, self.end),
            ));
        }
        let span = i64::from(self.end) - i64::from(self.start);
        if span > MAX_YEAR_SPAN {
            return Err(AppError::new(
                2,
                format!(
                    "Year range {}-{} spans {span} years (max {MAX_YEAR_SPAN}).",
                    self.start, self.end
                ),
            ));
        }
        if self.pillar.is_empty() {
            return Err(AppError::new(2, "Pillar name is empty."));
        }
        Ok(())
    }

    /// Base path (no extension) for one pipeline stage's artifacts.
    pub fn stage_base(&self, stage: &str) -> PathBuf {
        self.out_dir.join(format!("{}_{stage}", self.pillar))
    }
}

fn parse_countries(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}

fn parse_year(key: &str, raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|e| AppError::new(2, format!("Invalid {key} '{raw}': {e}")))
}
