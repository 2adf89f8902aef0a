//! Indicator fetchers and their shared interface.
//!
//! Every source answers the same question, "give me these indicators for these
//! countries over these years", and never fails: units that error are logged
//! and skipped, so the result is always a (possibly empty) tidy table.

pub mod frame;
pub mod imf_weo;
pub mod transport;
pub mod worldbank;

pub use imf_weo::WeoClient;
pub use transport::{HttpTransport, JsonTransport};
pub use worldbank::WdiClient;

use crate::domain::{IndicatorRow, Source};

pub trait IndicatorSource {
    fn source(&self) -> Source;

    /// Fetch a single indicator code for all `countries` within `[start, end]`.
    fn fetch_indicator(
        &self,
        countries: &[String],
        indicator: &str,
        start: i32,
        end: i32,
    ) -> Vec<IndicatorRow>;

    /// Fetch several indicator codes, one after another.
    fn fetch(
        &self,
        countries: &[String],
        indicators: &[&str],
        start: i32,
        end: i32,
    ) -> Vec<IndicatorRow> {
        indicators
            .iter()
            .flat_map(|code| self.fetch_indicator(countries, code, start, end))
            .collect()
    }
}
