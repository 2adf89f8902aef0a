//! Concatenate per-source tables into one sorted table.

use std::cmp::Ordering;

use crate::domain::Observation;

/// Concatenate all tables and sort by `(iso3c, series_name, year)`.
///
/// No deduplication or aggregation; duplicates keep their input order.
pub fn combine(tables: Vec<Vec<Observation>>) -> Vec<Observation> {
    let mut out: Vec<Observation> = tables.into_iter().flatten().collect();
    out.sort_by(Observation::cmp_key);
    out
}

pub fn is_sorted(rows: &[Observation]) -> bool {
    rows.windows(2)
        .all(|w| w[0].cmp_key(&w[1]) != Ordering::Greater)
}
