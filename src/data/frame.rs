//! Loosely-typed response frames and their normalization to `IndicatorRow`s.
//!
//! IMF responses arrive with column names that depend on the client and the
//! dataset. We flatten them into a `RawFrame` of string cells, locate the
//! time/country/value columns by name, and coerce types:
//!
//! - `year`: integer; integral floats (`"2005.0"`) accepted, anything else drops the row
//! - `value`: float; coercion failures and non-finite values become null
//! - rows without a country or outside `[start, end]` are dropped

use serde_json::Value;

use crate::domain::IndicatorRow;
use crate::error::FetchError;

/// A small column-ordered table of optional string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Append one record. Unknown keys become new columns; earlier rows get nulls.
    pub fn push_record<I>(&mut self, record: I)
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut row = vec![None; self.columns.len()];
        for (key, value) in record {
            let idx = match self.column_index(&key) {
                Some(idx) => idx,
                None => {
                    self.columns.push(key);
                    for existing in &mut self.rows {
                        existing.push(None);
                    }
                    row.push(None);
                    self.columns.len() - 1
                }
            };
            row[idx] = value;
        }
        self.rows.push(row);
    }

    /// Wide-to-long: every non-id column becomes a `(var_name, value_name)` pair.
    pub fn melt(&self, id_columns: &[&str], var_name: &str, value_name: &str) -> RawFrame {
        let id_idx: Vec<usize> = id_columns
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();

        let mut out = RawFrame::new();
        for row in &self.rows {
            for (col, name) in self.columns.iter().enumerate() {
                if id_idx.contains(&col) {
                    continue;
                }
                let mut record: Vec<(String, Option<String>)> = id_idx
                    .iter()
                    .map(|&i| (self.columns[i].clone(), row[i].clone()))
                    .collect();
                record.push((var_name.to_string(), Some(name.clone())));
                record.push((value_name.to_string(), row[col].clone()));
                out.push_record(record);
            }
        }
        out
    }
}

/// Render a JSON scalar as a cell. Null stays null; nested values are kept as JSON text.
pub fn json_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn find_exact<'a>(columns: &'a [String], names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| columns.iter().find(|c| c == name))
        .map(String::as_str)
}

fn find_containing<'a>(columns: &'a [String], pred: impl Fn(&str) -> bool) -> Option<&'a str> {
    columns.iter().map(String::as_str).find(|c| pred(c))
}

pub fn infer_time_column(columns: &[String]) -> Option<&str> {
    find_exact(columns, &["TIME_PERIOD", "time"])
        .or_else(|| find_containing(columns, |c| c.contains("TIME") || c.contains("Period")))
}

pub fn infer_area_column(columns: &[String]) -> Option<&str> {
    find_exact(columns, &["REF_AREA", "REF_AREA.id"])
        .or_else(|| find_containing(columns, |c| c.contains("AREA") || c.contains("REF")))
}

pub fn infer_value_column(columns: &[String]) -> Option<&str> {
    find_exact(columns, &["value", "OBS_VALUE"])
        .or_else(|| find_containing(columns, |c| c.to_ascii_uppercase().contains("VALUE")))
}

/// The per-row indicator code, if the response carries one.
pub fn infer_indicator_column(columns: &[String]) -> Option<&str> {
    find_exact(columns, &["INDICATOR", "INDICATOR.id"])
}

pub fn coerce_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

pub fn coerce_value(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Turn a long frame into tidy rows for `indicator`.
///
/// When the frame has its own indicator column, each row keeps that code
/// (falling back to `indicator` for blank cells) so series the caller did
/// not ask for stay distinguishable.
///
/// A frame with no rows is a valid empty result. A non-empty frame whose
/// time/country/value columns cannot be located is a `Shape` error.
pub fn normalize(
    frame: &RawFrame,
    indicator: &str,
    start: i32,
    end: i32,
) -> Result<Vec<IndicatorRow>, FetchError> {
    if frame.is_empty() {
        return Ok(Vec::new());
    }

    let columns = frame.columns();
    let time_col = infer_time_column(columns)
        .ok_or_else(|| FetchError::Shape(format!("no time column among {columns:?}")))?;
    let area_col = infer_area_column(columns)
        .ok_or_else(|| FetchError::Shape(format!("no country column among {columns:?}")))?;
    let value_col = infer_value_column(columns)
        .ok_or_else(|| FetchError::Shape(format!("no value column among {columns:?}")))?;

    let (Some(t), Some(a), Some(v)) = (
        frame.column_index(time_col),
        frame.column_index(area_col),
        frame.column_index(value_col),
    ) else {
        return Err(FetchError::Shape("inferred column vanished".to_string()));
    };
    let code_col = infer_indicator_column(columns).and_then(|c| frame.column_index(c));

    let mut out = Vec::with_capacity(frame.len());
    for row in 0..frame.len() {
        let Some(year) = frame.cell(row, t).and_then(coerce_year) else {
            continue;
        };
        if year < start || year > end {
            continue;
        }
        let iso3c = match frame.cell(row, a).map(str::trim) {
            Some(code) if !code.is_empty() => code.to_ascii_uppercase(),
            _ => continue,
        };
        let code = code_col
            .and_then(|c| frame.cell(row, c))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(indicator);
        out.push(IndicatorRow {
            iso3c,
            year,
            value: frame.cell(row, v).and_then(coerce_value),
            indicator: code.to_string(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Option<&str>)]) -> Vec<(String, Option<String>)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn push_record_backfills_new_columns() {
        let mut frame = RawFrame::new();
        frame.push_record(record(&[("a", Some("1"))]));
        frame.push_record(record(&[("b", Some("2")), ("a", Some("3"))]));

        assert_eq!(frame.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(frame.cell(0, 1), None);
        assert_eq!(frame.cell(1, 0), Some("3"));
        assert_eq!(frame.cell(1, 1), Some("2"));
    }

    #[test]
    fn time_column_prefers_exact_names_then_patterns() {
        assert_eq!(infer_time_column(&cols(&["time", "TIME_PERIOD"])), Some("TIME_PERIOD"));
        assert_eq!(infer_time_column(&cols(&["REF_AREA", "time"])), Some("time"));
        assert_eq!(infer_time_column(&cols(&["obs_TIME", "x"])), Some("obs_TIME"));
        assert_eq!(infer_time_column(&cols(&["Period start"])), Some("Period start"));
        assert_eq!(infer_time_column(&cols(&["year", "value"])), None);
    }

    #[test]
    fn area_and_value_columns_are_inferred() {
        assert_eq!(infer_area_column(&cols(&["REF_AREA.id", "x"])), Some("REF_AREA.id"));
        assert_eq!(infer_area_column(&cols(&["x", "COUNTRY_AREA"])), Some("COUNTRY_AREA"));
        assert_eq!(infer_area_column(&cols(&["country"])), None);
        assert_eq!(infer_value_column(&cols(&["OBS_VALUE", "x"])), Some("OBS_VALUE"));
        assert_eq!(infer_value_column(&cols(&["obs_value"])), Some("obs_value"));
    }

    #[test]
    fn year_and_value_coercion() {
        assert_eq!(coerce_year(" 2005 "), Some(2005));
        assert_eq!(coerce_year("2005.0"), Some(2005));
        assert_eq!(coerce_year("2005.5"), None);
        assert_eq!(coerce_year("2005-Q1"), None);
        assert_eq!(coerce_value("1.25"), Some(1.25));
        assert_eq!(coerce_value("n/a"), None);
        assert_eq!(coerce_value("NaN"), None);
    }

    #[test]
    fn normalize_drops_missing_year_keeps_missing_value() {
        let mut frame = RawFrame::new();
        frame.push_record(record(&[("REF_AREA", Some("sen")), ("TIME_PERIOD", Some("2010")), ("value", Some("4.2"))]));
        frame.push_record(record(&[("REF_AREA", Some("SEN")), ("TIME_PERIOD", None), ("value", Some("1.0"))]));
        frame.push_record(record(&[("REF_AREA", Some("SEN")), ("TIME_PERIOD", Some("2011")), ("value", Some("--"))]));
        frame.push_record(record(&[("REF_AREA", Some("SEN")), ("TIME_PERIOD", Some("1999")), ("value", Some("2.0"))]));

        let rows = normalize(&frame, "NGDP_RPCH", 2005, 2030).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].iso3c, "SEN");
        assert_eq!(rows[0].value, Some(4.2));
        assert_eq!(rows[1].year, 2011);
        assert_eq!(rows[1].value, None);
        assert!(rows.iter().all(|r| r.indicator == "NGDP_RPCH"));
    }

    #[test]
    fn normalize_fails_when_inference_fails() {
        let mut frame = RawFrame::new();
        frame.push_record(record(&[("country", Some("SEN")), ("year", Some("2010")), ("value", Some("1"))]));
        assert!(matches!(normalize(&frame, "X", 2005, 2030), Err(FetchError::Shape(_))));
        assert_eq!(normalize(&RawFrame::new(), "X", 2005, 2030).unwrap(), Vec::new());
    }

    #[test]
    fn normalize_keeps_row_level_indicator_codes() {
        let mut frame = RawFrame::new();
        frame.push_record(record(&[("INDICATOR", Some("NGDP_RPCH")), ("REF_AREA", Some("SEN")), ("TIME_PERIOD", Some("2010")), ("OBS_VALUE", Some("4.1"))]));
        frame.push_record(record(&[("INDICATOR", Some("NGDP_OTHER")), ("REF_AREA", Some("SEN")), ("TIME_PERIOD", Some("2010")), ("OBS_VALUE", Some("999"))]));
        frame.push_record(record(&[("INDICATOR", Some(" ")), ("REF_AREA", Some("SEN")), ("TIME_PERIOD", Some("2011")), ("OBS_VALUE", Some("3.0"))]));

        let rows = normalize(&frame, "NGDP_RPCH", 2005, 2030).unwrap();
        let codes: Vec<&str> = rows.iter().map(|r| r.indicator.as_str()).collect();
        assert_eq!(codes, vec!["NGDP_RPCH", "NGDP_OTHER", "NGDP_RPCH"]);
        assert_eq!(infer_indicator_column(&cols(&["INDICATOR.id", "x"])), Some("INDICATOR.id"));
        assert_eq!(infer_indicator_column(&cols(&["x"])), None);
    }

    #[test]
    fn melt_turns_year_columns_into_rows() {
        let mut wide = RawFrame::new();
        wide.push_record(record(&[("REF_AREA", Some("GHA")), ("2020", Some("0.5")), ("2021", Some("5.1"))]));
        wide.push_record(record(&[("REF_AREA", Some("KEN")), ("2021", Some("7.6"))]));

        let long = wide.melt(&["REF_AREA"], "TIME_PERIOD", "value");
        assert_eq!(long.columns(), &cols(&["REF_AREA", "TIME_PERIOD", "value"]));
        assert_eq!(long.len(), 4);
        assert_eq!(long.cell(2, 0), Some("KEN"));
        assert_eq!(long.cell(2, 1), Some("2020"));
        assert_eq!(long.cell(2, 2), None);
    }
}
