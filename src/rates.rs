//! Exchange rate lookup.
//!
//! Rates come from the National Bank of Poland (NBP) table A mid rates and are
//! expressed in the base currency (PLN by default). The API publishes nothing
//! on weekends and holidays, so [`NbpClient`] asks for a short window ending
//! at the transaction date and takes the latest published rate in it.
//!
//! [`RateLookup`] sits in front of any [`RateProvider`] and adds the
//! base-currency shortcut, the per-run cache and the "failure means no rate"
//! policy.

use crate::error::{Error, Result};
use chrono::{Duration, NaiveDate};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, warn};

/// Default NBP endpoint for table A rates.
pub const NBP_API_URL: &str = "https://api.nbp.pl/api/exchangerates/rates/A";

/// Source of exchange rates.
pub trait RateProvider {
    /// Rate of `currency` in the base currency, published on or before `date`.
    fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<Decimal>;
}

impl<P: RateProvider + ?Sized> RateProvider for &P {
    fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<Decimal> {
        (**self).fetch_rate(currency, date)
    }
}

impl<P: RateProvider + ?Sized> RateProvider for Box<P> {
    fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<Decimal> {
        (**self).fetch_rate(currency, date)
    }
}

/// Blocking client for the NBP exchange rate API.
#[derive(Debug, Clone)]
pub struct NbpClient {
    http: Client,
    base_url: String,
    lookback_days: u32,
}

impl NbpClient {
    /// Create a client.
    ///
    /// `lookback_days` bounds how far before the transaction date a rate may
    /// have been published.
    pub fn new(base_url: &str, timeout: std::time::Duration, lookback_days: u32) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            lookback_days,
        })
    }

    fn series_url(&self, currency: &str, date: NaiveDate) -> String {
        let start = date - Duration::days(i64::from(self.lookback_days));
        format!(
            "{}/{}/{}/{}/",
            self.base_url,
            currency.to_lowercase(),
            start.format("%Y-%m-%d"),
            date.format("%Y-%m-%d")
        )
    }
}

impl RateProvider for NbpClient {
    fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<Decimal> {
        let url = self.series_url(currency, date);
        debug!(%url, "requesting exchange rate");

        let response = self
            .http
            .get(&url)
            .query(&[("format", "json")])
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RateUnavailable(format!(
                "{} on {}: HTTP {}",
                currency, date, status
            )));
        }

        let body = response.text()?;
        parse_rate_response(&body, date)
    }
}

#[derive(Debug, Deserialize)]
struct NbpSeries {
    code: String,
    rates: Vec<NbpRate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NbpRate {
    effective_date: NaiveDate,
    mid: serde_json::Number,
}

/// Pick the latest rate published on or before `date` from an NBP series.
fn parse_rate_response(body: &str, date: NaiveDate) -> Result<Decimal> {
    let series: NbpSeries = serde_json::from_str(body.trim_start_matches('\u{feff}'))?;

    let latest = series
        .rates
        .iter()
        .filter(|r| r.effective_date <= date)
        .max_by_key(|r| r.effective_date)
        .ok_or_else(|| {
            Error::RateUnavailable(format!("no {} rate published on or before {}", series.code, date))
        })?;

    let text = latest.mid.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| Error::RateUnavailable(format!("unreadable rate {}", text)))
}

/// Cached rate lookup for one run.
pub struct RateLookup<P> {
    provider: P,
    base_currency: String,
    cache: HashMap<(String, NaiveDate), Option<Decimal>>,
    requests: usize,
}

impl<P: RateProvider> RateLookup<P> {
    pub fn new(provider: P, base_currency: &str) -> Self {
        Self {
            provider,
            base_currency: base_currency.to_uppercase(),
            cache: HashMap::new(),
            requests: 0,
        }
    }

    /// Rate of `currency` on `date`, or `None` when none could be obtained.
    ///
    /// The base currency is always `1`. Every other pair reaches the provider
    /// at most once per lookup instance, failures included.
    pub fn lookup(&mut self, currency: &str, date: NaiveDate) -> Option<Decimal> {
        let currency = currency.to_uppercase();
        if currency == self.base_currency {
            return Some(Decimal::ONE);
        }

        let key = (currency, date);
        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        self.requests += 1;
        let rate = match self.provider.fetch_rate(&key.0, date) {
            Ok(rate) => {
                debug!(currency = %key.0, %date, %rate, "exchange rate");
                Some(rate)
            }
            Err(e) => {
                warn!(currency = %key.0, %date, error = %e, "exchange rate unavailable");
                None
            }
        };
        self.cache.insert(key, rate);
        rate
    }

    /// Number of provider calls made so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }
}
