//! Run configuration.

use crate::error::{Error, Result};
use crate::rates::NBP_API_URL;
use std::path::PathBuf;
use std::time::Duration;

/// Everything one run needs to know, passed explicitly to
/// [`Pipeline`](crate::pipeline::Pipeline).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory with statement files.
    pub input_dir: PathBuf,
    /// CSV report path; truncated at the start of a run.
    pub output_path: PathBuf,
    /// Only read files with this extension.
    pub extension: Option<String>,
    /// Currency rates are expressed in.
    pub base_currency: String,
    /// Rate API endpoint.
    pub rate_api_url: String,
    /// Per-request timeout of the rate API.
    pub rate_timeout: Duration,
    /// How many days before a transaction a rate may have been published.
    pub rate_lookback_days: u32,
    /// CSV field delimiter.
    pub delimiter: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            output_path: PathBuf::from("results.csv"),
            extension: None,
            base_currency: "PLN".to_string(),
            rate_api_url: NBP_API_URL.to_string(),
            rate_timeout: Duration::from_secs(10),
            rate_lookback_days: 7,
            delimiter: b',',
        }
    }
}

impl Config {
    /// Reject settings no run can work with.
    pub fn validate(&self) -> Result<()> {
        let code = &self.base_currency;
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(Error::Config(format!(
                "base currency must be a three-letter ISO code, got {:?}",
                code
            )));
        }
        if !self.delimiter.is_ascii() || self.delimiter == b'"' || self.delimiter == b'\n' {
            return Err(Error::Config(format!(
                "unusable CSV delimiter {:?}",
                char::from(self.delimiter)
            )));
        }
        if self.rate_timeout.is_zero() {
            return Err(Error::Config("rate API timeout must be positive".to_string()));
        }
        if self.rate_api_url.trim().is_empty() {
            return Err(Error::Config("rate API URL is empty".to_string()));
        }
        Ok(())
    }
}
