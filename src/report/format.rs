//! Formatted terminal output.
//!
//! Formatting lives here so the pipeline returns plain data and output
//! changes stay localized.

use crate::app::pipeline::RunOutput;
use crate::domain::{OBSERVATION_COLUMNS, Observation, PipelineConfig, WeoBackend};

/// Completion summary: run parameters, row counts per stage, files written.
pub fn format_run_summary(output: &RunOutput, config: &PipelineConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== sovrisk - {} collection ===\n", config.pillar));
    out.push_str(&format!(
        "Countries: {} | years {}-{} | WEO backend: {}\n",
        config.countries.join(", "),
        config.start,
        config.end,
        match config.weo_backend {
            WeoBackend::Sdmx => format!("sdmx ({})", config.weo_dataset),
            WeoBackend::DataMapper => "datamapper".to_string(),
        }
    ));
    out.push_str(&format!(
        "Rows: WDI={} | WEO={} | combined={}\n",
        output.wdi.len(),
        output.weo.len(),
        output.combined.len()
    ));

    out.push_str("Saved:\n");
    for path in &output.artifacts {
        out.push_str(&format!(" - {}\n", path.display()));
    }

    out
}

/// Fixed-width preview of the first `n` rows, with a row index column.
pub fn format_preview(rows: &[Observation], n: usize) -> String {
    if rows.is_empty() {
        return "(combined table is empty)".to_string();
    }

    let shown: Vec<[String; 6]> = rows
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, r)| {
            [
                i.to_string(),
                r.iso3c.clone(),
                r.year.to_string(),
                r.value.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string()),
                r.series_name.clone(),
                r.source.tag().to_string(),
            ]
        })
        .collect();

    let mut header: [String; 6] = std::array::from_fn(|_| String::new());
    for (slot, name) in header.iter_mut().skip(1).zip(OBSERVATION_COLUMNS) {
        *slot = name.to_string();
    }

    let mut widths = [0usize; 6];
    for line in std::iter::once(&header).chain(shown.iter()) {
        for (w, cell) in widths.iter_mut().zip(line) {
            *w = (*w).max(cell.len());
        }
    }

    let render = |cells: &[String; 6]| -> String {
        cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, w))| {
                // Numbers right-aligned, text left-aligned.
                if matches!(col, 0 | 2 | 3) {
                    format!("{cell:>w$}")
                } else {
                    format!("{cell:<w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = render(&header);
    for line in &shown {
        out.push('\n');
        out.push_str(&render(line));
    }
    if rows.len() > n {
        out.push_str(&format!("\n... {} more rows", rows.len() - n));
    }
    out
}
