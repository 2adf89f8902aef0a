//! IMF WEO-style macro series.
//!
//! One request per indicator, batched across countries. Two backends:
//!
//! - SDMX-JSON `CompactData` (long, attribute names vary by dataset)
//! - DataMapper (wide, one key per year; melted to long before normalization)
//!
//! Both end in [`normalize`], which locates the time/country/value columns by name.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::data::IndicatorSource;
use crate::data::frame::{RawFrame, json_cell, normalize};
use crate::data::transport::JsonTransport;
use crate::domain::{IndicatorRow, PipelineConfig, Source, WeoBackend};
use crate::error::FetchError;

pub struct WeoClient<T> {
    transport: T,
    backend: WeoBackend,
    base_url: String,
    dataset: String,
}

impl<T: JsonTransport> WeoClient<T> {
    pub fn sdmx(transport: T, base_url: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            transport,
            backend: WeoBackend::Sdmx,
            base_url: base_url.into(),
            dataset: dataset.into(),
        }
    }

    pub fn datamapper(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            backend: WeoBackend::DataMapper,
            base_url: base_url.into(),
            dataset: String::new(),
        }
    }

    pub fn from_config(transport: T, config: &PipelineConfig) -> Self {
        match config.weo_backend {
            WeoBackend::Sdmx => Self::sdmx(transport, &config.imf_sdmx_base_url, &config.weo_dataset),
            WeoBackend::DataMapper => Self::datamapper(transport, &config.imf_datamapper_base_url),
        }
    }

    pub fn backend(&self) -> WeoBackend {
        self.backend
    }

    fn fetch_frame(
        &self,
        countries: &[String],
        indicator: &str,
        start: i32,
        end: i32,
    ) -> Result<RawFrame, FetchError> {
        match self.backend {
            WeoBackend::Sdmx => {
                let url = format!(
                    "{}/CompactData/{}/A.{}.{indicator}",
                    self.base_url,
                    self.dataset,
                    countries.join("+")
                );
                let query = [
                    ("startPeriod", start.to_string()),
                    ("endPeriod", end.to_string()),
                ];
                let body = self.transport.get_json(&url, &query)?;
                sdmx_frame(&body)
            }
            WeoBackend::DataMapper => {
                let url = format!("{}/{indicator}/{}", self.base_url, countries.join("/"));
                let periods: Vec<String> = (start..=end).map(|y| y.to_string()).collect();
                let query = [("periods", periods.join(","))];
                let body = self.transport.get_json(&url, &query)?;
                Ok(datamapper_frame(&body, indicator))
            }
        }
    }
}

impl<T: JsonTransport> IndicatorSource for WeoClient<T> {
    fn source(&self) -> Source {
        Source::Weo
    }

    /// Fetch one indicator for all countries in a single call.
    ///
    /// Any failure (transport, shape, column inference) skips the indicator.
    fn fetch_indicator(
        &self,
        countries: &[String],
        indicator: &str,
        start: i32,
        end: i32,
    ) -> Vec<IndicatorRow> {
        let result = self
            .fetch_frame(countries, indicator, start, end)
            .and_then(|frame| {
                debug!(indicator, columns = ?frame.columns(), rows = frame.len(), "WEO frame");
                normalize(&frame, indicator, start, end)
            });

        match result {
            Ok(rows) => rows,
            Err(e) => {
                warn!(indicator, backend = ?self.backend, error = %e, "WEO fetch failed; skipping indicator");
                Vec::new()
            }
        }
    }
}

/// SDMX nodes are a single object when there is one child, an array otherwise.
fn one_or_many(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

fn attribute_cells(obj: &Map<String, Value>, skip: &str) -> Vec<(String, Option<String>)> {
    obj.iter()
        .filter(|(k, v)| k.as_str() != skip && !v.is_object() && !v.is_array())
        .map(|(k, v)| (k.trim_start_matches('@').to_string(), json_cell(v)))
        .collect()
}

fn flat_records(records: &[Value]) -> RawFrame {
    let mut frame = RawFrame::new();
    for record in records {
        if let Some(obj) = record.as_object() {
            frame.push_record(attribute_cells(obj, ""));
        }
    }
    frame
}

/// Flatten an SDMX-JSON response into one row per observation.
///
/// Series attributes are repeated on every observation row.
fn sdmx_frame(body: &Value) -> Result<RawFrame, FetchError> {
    if let Some(records) = body.as_array() {
        return Ok(flat_records(records));
    }

    if let Some(compact) = body.get("CompactData") {
        let mut frame = RawFrame::new();
        let Some(dataset) = compact.get("DataSet").filter(|d| !d.is_null()) else {
            return Ok(frame);
        };
        for series in one_or_many(dataset.get("Series")) {
            let Some(series_obj) = series.as_object() else {
                continue;
            };
            let series_attrs = attribute_cells(series_obj, "Obs");
            for obs in one_or_many(series_obj.get("Obs")) {
                let Some(obs_obj) = obs.as_object() else {
                    continue;
                };
                let mut record = series_attrs.clone();
                record.extend(attribute_cells(obs_obj, ""));
                frame.push_record(record);
            }
        }
        return Ok(frame);
    }

    if let Some(records) = body.get("data").and_then(Value::as_array) {
        return Ok(flat_records(records));
    }

    Err(FetchError::Shape(
        "expected CompactData, a record array, or a data array".to_string(),
    ))
}

/// Melt a DataMapper `{"values": {code: {country: {year: value}}}}` payload.
///
/// An unknown indicator comes back without `values`, which is an empty frame.
fn datamapper_frame(body: &Value, indicator: &str) -> RawFrame {
    let mut wide = RawFrame::new();
    let Some(by_country) = body
        .get("values")
        .and_then(|v| v.get(indicator))
        .and_then(Value::as_object)
    else {
        return wide;
    };

    for (country, years) in by_country {
        let mut record = vec![("REF_AREA".to_string(), Some(country.clone()))];
        if let Some(years) = years.as_object() {
            record.extend(years.iter().map(|(year, v)| (year.clone(), json_cell(v))));
        }
        wide.push_record(record);
    }

    wide.melt(&["REF_AREA"], "TIME_PERIOD", "value")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::transport::stub::StubTransport;

    const SDMX: &str = "http://imf.test/SDMX_JSON.svc";
    const DM: &str = "http://imf.test/datamapper/api/v1";

    fn countries() -> Vec<String> {
        vec!["SEN".to_string(), "GHA".to_string()]
    }

    #[test]
    fn sdmx_compact_data_is_flattened_and_normalized() {
        let stub = StubTransport::new().on(
            &format!("{SDMX}/CompactData/IFS/A.SEN+GHA.NGDP_RPCH"),
            json!({"CompactData": {"DataSet": {"Series": [
                {"@FREQ": "A", "@REF_AREA": "SEN", "@INDICATOR": "NGDP_RPCH",
                 "Obs": [{"@TIME_PERIOD": "2019", "@OBS_VALUE": "4.6"},
                         {"@TIME_PERIOD": "2020", "@OBS_VALUE": "1.3"}]},
                {"@FREQ": "A", "@REF_AREA": "GHA", "@INDICATOR": "NGDP_RPCH",
                 "Obs": {"@TIME_PERIOD": "2020"}}
            ]}}}),
        );
        let client = WeoClient::sdmx(&stub, SDMX, "IFS");

        let rows = client.fetch_indicator(&countries(), "NGDP_RPCH", 2005, 2030);
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].iso3c.as_str(), rows[0].year, rows[0].value), ("SEN", 2019, Some(4.6)));
        assert_eq!((rows[2].iso3c.as_str(), rows[2].year, rows[2].value), ("GHA", 2020, None));

        let (_, query) = &stub.calls()[0];
        assert!(query.contains(&("startPeriod".to_string(), "2005".to_string())));
        assert!(query.contains(&("endPeriod".to_string(), "2030".to_string())));
    }

    #[test]
    fn sdmx_dataset_without_series_is_empty() {
        let stub = StubTransport::new().on(
            &format!("{SDMX}/CompactData/IFS/A.SEN+GHA.GGXONLB_NGDP"),
            json!({"CompactData": {"DataSet": {"@keyFamilyURI": "x"}}}),
        );
        let client = WeoClient::sdmx(&stub, SDMX, "IFS");
        assert!(client.fetch_indicator(&countries(), "GGXONLB_NGDP", 2005, 2030).is_empty());
    }

    #[test]
    fn record_arrays_use_pattern_inference() {
        let stub = StubTransport::new().on(
            &format!("{SDMX}/CompactData/IFS/A.SEN+GHA.GGB_NGDP"),
            json!([
                {"REF_AREA.id": "SEN", "time": "2021", "value": -6.3},
                {"REF_AREA.id": "GHA", "time": "2021", "value": "-9.2"}
            ]),
        );
        let client = WeoClient::sdmx(&stub, SDMX, "IFS");

        let rows = client.fetch_indicator(&countries(), "GGB_NGDP", 2005, 2030);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value, Some(-9.2));
    }

    #[test]
    fn failed_inference_and_transport_errors_skip_the_indicator() {
        let stub = StubTransport::new()
            .on(
                &format!("{SDMX}/CompactData/IFS/A.SEN+GHA.GGB_NGDP"),
                json!([{"country": "SEN", "year": "2021", "value": 1.0}]),
            )
            .on(&format!("{SDMX}/CompactData/IFS/A.SEN+GHA.ODD"), json!({"unexpected": true}));
        let client = WeoClient::sdmx(&stub, SDMX, "IFS");

        assert!(client.fetch_indicator(&countries(), "GGB_NGDP", 2005, 2030).is_empty());
        assert!(client.fetch_indicator(&countries(), "ODD", 2005, 2030).is_empty());
        assert!(client.fetch_indicator(&countries(), "MISSING", 2005, 2030).is_empty());
    }

    #[test]
    fn extra_sdmx_series_keep_their_code_and_are_dropped_by_the_mapper() {
        let stub = StubTransport::new().on(
            &format!("{SDMX}/CompactData/IFS/A.SEN.NGDP_RPCH"),
            json!({"CompactData": {"DataSet": {"Series": [
                {"@REF_AREA": "SEN", "@INDICATOR": "NGDP_RPCH",
                 "Obs": {"@TIME_PERIOD": "2010", "@OBS_VALUE": "4.1"}},
                {"@REF_AREA": "SEN", "@INDICATOR": "NGDP_UNMAPPED",
                 "Obs": {"@TIME_PERIOD": "2010", "@OBS_VALUE": "999"}}
            ]}}}),
        );
        let client = WeoClient::sdmx(&stub, SDMX, "IFS");

        let rows = client.fetch_indicator(&["SEN".to_string()], "NGDP_RPCH", 2005, 2030);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].indicator, "NGDP_UNMAPPED");

        let tagged = crate::mapping::pillar1::pillar().weo.tag(rows);
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].series_name, "gdp_growth_real_weo");
        assert_eq!(tagged[0].value, Some(4.1));
    }

    #[test]
    fn datamapper_wide_payload_is_melted() {
        let stub = StubTransport::new().on(
            &format!("{DM}/GGXWDN_NGDP/SEN/GHA"),
            json!({"values": {"GGXWDN_NGDP": {
                "SEN": {"2021": 68.4, "2022": 72.1},
                "GHA": {"2022": 88.1}
            }}, "api": {"version": "1"}}),
        );
        let client = WeoClient::datamapper(&stub, DM);

        let rows = client.fetch_indicator(&countries(), "GGXWDN_NGDP", 2021, 2022);
        assert_eq!(rows.len(), 4);
        let gha_2021 = rows.iter().find(|r| r.iso3c == "GHA" && r.year == 2021).unwrap();
        assert_eq!(gha_2021.value, None);
        let sen_2022 = rows.iter().find(|r| r.iso3c == "SEN" && r.year == 2022).unwrap();
        assert_eq!(sen_2022.value, Some(72.1));

        let (_, query) = &stub.calls()[0];
        assert_eq!(query, &vec![("periods".to_string(), "2021,2022".to_string())]);
    }

    #[test]
    fn datamapper_unknown_indicator_is_empty() {
        let stub = StubTransport::new().on(&format!("{DM}/NOPE/SEN/GHA"), json!({"api": {}}));
        let client = WeoClient::datamapper(&stub, DM);
        assert!(client.fetch_indicator(&countries(), "NOPE", 2005, 2030).is_empty());
    }

    #[test]
    fn from_config_selects_backend() {
        let stub = StubTransport::new();
        let mut config = PipelineConfig::default();
        assert_eq!(WeoClient::from_config(&stub, &config).backend(), WeoBackend::Sdmx);
        config.weo_backend = WeoBackend::DataMapper;
        assert_eq!(WeoClient::from_config(&stub, &config).backend(), WeoBackend::DataMapper);
    }
}
