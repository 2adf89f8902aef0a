//! Internal series names <-> source indicator codes.
//!
//! Downstream consumers only ever see series names. The forward direction
//! drives which codes are requested; the inverse renames fetched rows and
//! drops rows for codes nobody asked for.

pub mod pillar1;

use crate::domain::{IndicatorRow, Observation, Source};

/// Ordered `series_name -> indicator_code` table for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesMap {
    source: Source,
    entries: Vec<(&'static str, &'static str)>,
}

impl SeriesMap {
    pub fn new(source: Source, entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            source,
            entries: entries.to_vec(),
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn entries(&self) -> &[(&'static str, &'static str)] {
        &self.entries
    }

    /// Indicator codes to request, in table order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(_, code)| *code).collect()
    }

    pub fn code_for(&self, series_name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == series_name)
            .map(|(_, code)| *code)
    }

    pub fn series_for(&self, code: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(name, _)| *name)
    }

    /// Rename `indicator` to `series_name` and attach this map's source.
    ///
    /// Rows whose code has no entry are dropped.
    pub fn tag(&self, rows: Vec<IndicatorRow>) -> Vec<Observation> {
        rows.into_iter()
            .filter_map(|row| {
                let series_name = self.series_for(&row.indicator)?;
                Some(Observation {
                    iso3c: row.iso3c,
                    year: row.year,
                    value: row.value,
                    series_name: series_name.to_string(),
                    source: self.source,
                })
            })
            .collect()
    }
}

/// A named grouping of series across sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pillar {
    pub name: &'static str,
    pub wdi: SeriesMap,
    pub weo: SeriesMap,
}

impl Pillar {
    pub fn by_name(name: &str) -> Option<Pillar> {
        match name {
            pillar1::NAME => Some(pillar1::pillar()),
            _ => None,
        }
    }
}
