//! HTTP capability used by the fetchers: `GET url?query -> JSON`.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{AppError, FetchError};

/// Fixed per-request deadline.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub trait JsonTransport {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError>;
}

impl<T: JsonTransport + ?Sized> JsonTransport for &T {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        (**self).get_json(url, query)
    }
}

/// Blocking `reqwest` transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl JsonTransport for HttpTransport {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        debug!(url, ?query, "GET");
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        resp.json::<Value>()
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}
