//! Shared domain types.
//!
//! `Observation` is flat and serializable so it maps one-to-one onto the
//! CSV/Parquet column layout.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// Provenance of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    #[serde(rename = "WDI")]
    Wdi,
    #[serde(rename = "WEO")]
    Weo,
}

impl Source {
    pub fn tag(self) -> &'static str {
        match self {
            Source::Wdi => "WDI",
            Source::Weo => "WEO",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One row of fetcher output, still keyed by the source's indicator code.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    /// ISO3 country code, uppercase.
    pub iso3c: String,
    pub year: i32,
    /// `None` when the source reported the country-year without a value.
    pub value: Option<f64>,
    /// Source-specific indicator code.
    pub indicator: String,
}

/// One tidy observation in the internal vocabulary.
///
/// Field order is the persisted column order (`OBSERVATION_COLUMNS`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub iso3c: String,
    pub year: i32,
    pub value: Option<f64>,
    pub series_name: String,
    pub source: Source,
}

impl Observation {
    /// Output ordering key: country, then series, then year.
    pub fn cmp_key(&self, other: &Self) -> Ordering {
        (self.iso3c.as_str(), self.series_name.as_str(), self.year).cmp(&(
            other.iso3c.as_str(),
            other.series_name.as_str(),
            other.year,
        ))
    }
}

/// Column names of the persisted tidy table, in output order.
pub const OBSERVATION_COLUMNS: [&str; 5] = ["iso3c", "year", "value", "series_name", "source"];
