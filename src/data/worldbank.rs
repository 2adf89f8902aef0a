//! World Bank WDI REST integration.
//!
//! One request per country (no batch endpoint is assumed). Responses are
//! `[metadata, observations]`; anything else is treated as "no data".

use serde_json::Value;
use tracing::{debug, warn};

use crate::data::IndicatorSource;
use crate::data::frame::{coerce_value, coerce_year, json_cell};
use crate::data::transport::JsonTransport;
use crate::domain::{IndicatorRow, Source};
use crate::error::FetchError;

const PER_PAGE: u32 = 20000;

pub struct WdiClient<T> {
    transport: T,
    base_url: String,
}

impl<T: JsonTransport> WdiClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    fn fetch_country(
        &self,
        iso3: &str,
        indicator: &str,
        start: i32,
        end: i32,
    ) -> Result<Vec<IndicatorRow>, FetchError> {
        let iso3 = iso3.trim().to_ascii_uppercase();
        let url = format!("{}/country/{iso3}/indicator/{indicator}", self.base_url);
        let base_query = [
            ("format", "json".to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("date", format!("{start}:{end}")),
        ];

        let mut rows = Vec::new();
        let mut page = 1u64;
        loop {
            let mut query = base_query.to_vec();
            if page > 1 {
                query.push(("page", page.to_string()));
            }
            let body = match self.transport.get_json(&url, &query) {
                Ok(body) => body,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    warn!(
                        country = %iso3,
                        indicator,
                        page,
                        kept = rows.len(),
                        error = %e,
                        "WDI page failed; keeping earlier pages"
                    );
                    break;
                }
            };

            let Some((pages, observations)) = split_page(&body) else {
                debug!(country = %iso3, indicator, page, "no observations in WDI response");
                break;
            };
            rows.extend(
                observations
                    .iter()
                    .filter_map(|obs| parse_observation(&iso3, indicator, obs, start, end)),
            );

            if page >= pages {
                break;
            }
            page += 1;
        }

        Ok(rows)
    }
}

impl<T: JsonTransport> IndicatorSource for WdiClient<T> {
    fn source(&self) -> Source {
        Source::Wdi
    }

    /// Fetch one indicator for every country. Failed countries are logged and skipped.
    fn fetch_indicator(
        &self,
        countries: &[String],
        indicator: &str,
        start: i32,
        end: i32,
    ) -> Vec<IndicatorRow> {
        let mut rows = Vec::new();
        for iso3 in countries {
            match self.fetch_country(iso3, indicator, start, end) {
                Ok(mut country_rows) => rows.append(&mut country_rows),
                Err(e) => {
                    warn!(country = %iso3, indicator, error = %e, "WDI fetch failed; skipping country");
                }
            }
        }
        rows
    }
}

/// Split a WDI page into `(total_pages, observations)`.
///
/// Returns `None` for error envelopes (`[{"message": ...}]`) and for pages
/// whose observation entry is null.
fn split_page(body: &Value) -> Option<(u64, &Vec<Value>)> {
    let parts = body.as_array()?;
    if parts.len() < 2 {
        return None;
    }
    let observations = parts[1].as_array()?;
    let pages = parts[0]
        .get("pages")
        .and_then(|p| p.as_u64().or_else(|| p.as_str()?.trim().parse().ok()))
        .unwrap_or(1);
    Some((pages, observations))
}

fn parse_observation(
    iso3: &str,
    indicator: &str,
    obs: &Value,
    start: i32,
    end: i32,
) -> Option<IndicatorRow> {
    if obs.is_null() {
        return None;
    }
    let year = obs.get("date").and_then(json_cell).as_deref().and_then(coerce_year)?;
    if year < start || year > end {
        return None;
    }
    let value = obs.get("value").and_then(json_cell).as_deref().and_then(coerce_value);
    Some(IndicatorRow {
        iso3c: iso3.to_string(),
        year,
        value,
        indicator: indicator.to_string(),
    })
}
