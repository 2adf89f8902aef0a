//! Persist tidy observation tables as CSV and Parquet.
//!
//! Both files share a base path: `{base}.csv` and `{base}.parquet`. Zero-row
//! tables still carry the full header/schema so downstream readers never
//! special-case an empty run.

use std::ffi::OsString;
use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use polars::prelude::{Column, DataFrame, ParquetWriter};
use tracing::info;

use crate::domain::{OBSERVATION_COLUMNS, Observation};
use crate::error::AppError;

/// Write `rows` to `{base}.csv` and `{base}.parquet`, returning both paths.
pub fn write_table(rows: &[Observation], base: &Path) -> Result<Vec<PathBuf>, AppError> {
    if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| {
            AppError::new(2, format!("Failed to create output dir '{}': {e}", parent.display()))
        })?;
    }

    let csv_path = with_suffix(base, "csv");
    let parquet_path = with_suffix(base, "parquet");
    write_csv(rows, &csv_path)?;
    write_parquet(rows, &parquet_path)?;

    info!(rows = rows.len(), base = %base.display(), "wrote csv + parquet");
    Ok(vec![csv_path, parquet_path])
}

/// `base` + `.ext`, without touching dots already in the file name.
fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Write the header explicitly, then serialize rows with header generation off,
/// so a zero-row table still gets its header line.
pub fn write_csv(rows: &[Observation], path: &Path) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;

    writer
        .write_record(OBSERVATION_COLUMNS)
        .map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// Columnar view of the observations: `iso3c, year (i32), value (nullable f64), series_name, source`.
pub fn observations_frame(rows: &[Observation]) -> Result<DataFrame, AppError> {
    let iso3c: Vec<&str> = rows.iter().map(|r| r.iso3c.as_str()).collect();
    let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
    let values: Vec<Option<f64>> = rows.iter().map(|r| r.value).collect();
    let series: Vec<&str> = rows.iter().map(|r| r.series_name.as_str()).collect();
    let sources: Vec<&str> = rows.iter().map(|r| r.source.tag()).collect();

    DataFrame::new(vec![
        Column::new(OBSERVATION_COLUMNS[0].into(), iso3c),
        Column::new(OBSERVATION_COLUMNS[1].into(), years),
        Column::new(OBSERVATION_COLUMNS[2].into(), values),
        Column::new(OBSERVATION_COLUMNS[3].into(), series),
        Column::new(OBSERVATION_COLUMNS[4].into(), sources),
    ])
    .map_err(|e| AppError::new(2, format!("Failed to build observation frame: {e}")))
}

pub fn write_parquet(rows: &[Observation], path: &Path) -> Result<(), AppError> {
    let mut df = observations_frame(rows)?;
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create Parquet '{}': {e}", path.display())))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| AppError::new(2, format!("Failed to write Parquet '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use polars::prelude::{DataType, ParquetReader, SerReader};

    use super::*;
    use crate::domain::Source;

    fn sample() -> Vec<Observation> {
        vec![
            Observation {
                iso3c: "SEN".to_string(),
                year: 2010,
                value: Some(4.2),
                series_name: "gdp_growth_real_wdi".to_string(),
                source: Source::Wdi,
            },
            Observation {
                iso3c: "SEN".to_string(),
                year: 2012,
                value: None,
                series_name: "gdp_growth_real_wdi".to_string(),
                source: Source::Wdi,
            },
        ]
    }

    #[test]
    fn writes_csv_with_empty_field_for_null_value() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nested/pillar1_wdi");

        let paths = write_table(&sample(), &base).unwrap();
        assert_eq!(paths[0], dir.path().join("nested/pillar1_wdi.csv"));
        assert_eq!(paths[1], dir.path().join("nested/pillar1_wdi.parquet"));

        let text = std::fs::read_to_string(&paths[0]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "iso3c,year,value,series_name,source");
        assert_eq!(lines[1], "SEN,2010,4.2,gdp_growth_real_wdi,WDI");
        assert_eq!(lines[2], "SEN,2012,,gdp_growth_real_wdi,WDI");
    }

    #[test]
    fn parquet_keeps_types_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_table(&sample(), &dir.path().join("t")).unwrap();

        let df = ParquetReader::new(File::open(&paths[1]).unwrap()).finish().unwrap();
        assert_eq!(df.height(), 2);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, OBSERVATION_COLUMNS.to_vec());
        assert_eq!(df.column("year").unwrap().dtype(), &DataType::Int32);
        assert_eq!(df.column("value").unwrap().null_count(), 1);
    }

    #[test]
    fn empty_table_keeps_header_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_table(&[], &dir.path().join("pillar1_combined")).unwrap();

        let text = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(text.trim_end(), "iso3c,year,value,series_name,source");

        let df = ParquetReader::new(File::open(&paths[1]).unwrap()).finish().unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 5);
    }

    #[test]
    fn existing_files_are_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("again");
        write_table(&sample(), &base).unwrap();
        let paths = write_table(&sample()[..1], &base).unwrap();

        let text = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
