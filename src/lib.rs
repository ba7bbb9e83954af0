//! MT940 statement to CSV exporter with exchange rates.
//!
//! Reads bank statements in the SWIFT MT940 format, decodes their
//! transactions, attaches the central-bank exchange rate of each transaction's
//! currency on its value date, and writes everything to a CSV report.
//!
//! # Modules
//!
//! - [`mt940_format`]: statement blocks, tagged fields and `:61:` slicing
//! - [`normalize`]: typed dates, signed amounts, currencies and titles
//! - [`rates`]: NBP rate client and the cached per-run lookup
//! - [`walker`]: input directory listing and file decoding
//! - [`csv_format`]: the report writer
//! - [`pipeline`]: the batch run tying it all together
//!
//! # Examples
//!
//! ## Decoding a statement
//!
//! ```
//! use mt940_rates::mt940_format::parse_blocks;
//!
//! let text = ":20:ST1\n:25:/PL61109010140000071219812874\n:60F:C230509EUR0,00\n\
//!             :61:230510C100,50NTRFINV17\n:86:Invoice 17\n";
//! let block = parse_blocks(text).remove(0)?;
//! let record = block.transactions().next().unwrap()?;
//! assert_eq!(record.amount.to_string(), "100.50");
//! assert_eq!(record.currency, "EUR");
//! assert_eq!(record.title, "Invoice 17");
//! # Ok::<(), mt940_rates::Error>(())
//! ```
//!
//! ## Running a batch
//!
//! ```no_run
//! use mt940_rates::{Config, Pipeline};
//!
//! let config = Config {
//!     input_dir: "statements".into(),
//!     ..Config::default()
//! };
//! let summary = Pipeline::with_nbp(config)?.run()?;
//! println!("{} rows written", summary.rows_written);
//! # Ok::<(), mt940_rates::Error>(())
//! ```

pub mod config;
pub mod csv_format;
pub mod error;
pub mod mt940_format;
pub mod normalize;
pub mod pipeline;
pub mod rates;
pub mod types;
pub mod walker;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use pipeline::{Pipeline, RunSummary};
pub use rates::{NbpClient, RateLookup, RateProvider};
pub use types::{Balance, BalanceType, DebitCredit, RatedTransactionRow, TransactionRecord};
