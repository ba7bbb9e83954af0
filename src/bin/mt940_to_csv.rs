//! MT940 to CSV - exports bank statement transactions with exchange rates.
//!
//! ```bash
//! RUST_LOG=debug mt940_to_csv --input-dir data --output results.csv
//! ```

use clap::Parser;
use mt940_rates::{Config, Pipeline, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mt940_to_csv")]
#[command(version, about = "Export MT940 statement transactions with NBP exchange rates to CSV", long_about = None)]
struct Cli {
    /// Directory with MT940 statement files
    #[arg(long, env = "MT940_INPUT_DIR", default_value = "data")]
    input_dir: PathBuf,

    /// CSV report path (overwritten)
    #[arg(short, long, env = "MT940_OUTPUT", default_value = "results.csv")]
    output: PathBuf,

    /// Only read files with this extension (e.g. txt)
    #[arg(long, env = "MT940_EXTENSION")]
    extension: Option<String>,

    /// Currency the rates are expressed in
    #[arg(long, env = "MT940_BASE_CURRENCY", default_value = "PLN")]
    base_currency: String,

    /// Exchange rate API endpoint
    #[arg(long, env = "MT940_RATE_API_URL", default_value = mt940_rates::rates::NBP_API_URL)]
    rate_api_url: String,

    /// Rate API request timeout in seconds
    #[arg(long, env = "MT940_RATE_TIMEOUT_SECS", default_value_t = 10)]
    rate_timeout_secs: u64,

    /// Days before a transaction to search for a published rate
    #[arg(long, env = "MT940_RATE_LOOKBACK_DAYS", default_value_t = 7)]
    rate_lookback_days: u32,

    /// CSV field delimiter
    #[arg(long, env = "MT940_DELIMITER", default_value_t = ',')]
    delimiter: char,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            input_dir: self.input_dir,
            output_path: self.output,
            extension: self.extension,
            base_currency: self.base_currency.to_uppercase(),
            rate_api_url: self.rate_api_url,
            rate_timeout: Duration::from_secs(self.rate_timeout_secs),
            rate_lookback_days: self.rate_lookback_days,
            // Non-ASCII delimiters are rejected by Config::validate.
            delimiter: u8::try_from(self.delimiter).unwrap_or(0xff),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Cli::parse().into_config();
    config.validate()?;
    Pipeline::with_nbp(config)?.run()?;
    Ok(())
}
