//! CSV report writer.
//!
//! The report has a fixed header and one row per rated transaction:
//!
//! ```text
//! Account,Transaction date,Transaction amount,Transaction currency,Currency rate (to PLN),Transaction ID,Transaction title
//! ```

use crate::error::Result;
use crate::types::RatedTransactionRow;
use csv::{Writer, WriterBuilder};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// Column titles; the rate column is completed with the base currency.
pub fn header(base_currency: &str) -> [String; 7] {
    [
        "Account".to_string(),
        "Transaction date".to_string(),
        "Transaction amount".to_string(),
        "Transaction currency".to_string(),
        format!("Currency rate (to {})", base_currency),
        "Transaction ID".to_string(),
        "Transaction title".to_string(),
    ]
}

/// One CSV row.
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    account: &'a str,
    date: String,
    amount: String,
    currency: &'a str,
    rate: Option<String>,
    transaction_id: &'a str,
    title: &'a str,
}

impl<'a> From<&'a RatedTransactionRow> for CsvRecord<'a> {
    fn from(row: &'a RatedTransactionRow) -> Self {
        let record = &row.record;
        CsvRecord {
            account: &record.account,
            date: record.transaction_date.format("%Y-%m-%d").to_string(),
            amount: format_amount(record.amount),
            currency: &record.currency,
            rate: row.rate.map(|r| r.normalize().to_string()),
            transaction_id: &record.transaction_id,
            title: &record.title,
        }
    }
}

/// At least two decimals, never fewer digits than the amount carries.
fn format_amount(amount: Decimal) -> String {
    let mut amount = amount.normalize();
    if amount.scale() < 2 {
        amount.rescale(2);
    }
    amount.to_string()
}

/// Streams rated transactions into CSV.
///
/// The header is written by [`CsvReportWriter::new`], so it appears exactly
/// once even if no row follows.
pub struct CsvReportWriter<W: Write> {
    inner: Writer<W>,
    rows: usize,
}

impl<W: Write> CsvReportWriter<W> {
    /// Wrap `writer` and emit the header.
    ///
    /// # Examples
    ///
    /// ```
    /// use mt940_rates::csv_format::CsvReportWriter;
    ///
    /// let mut out = Vec::new();
    /// let writer = CsvReportWriter::new(&mut out, "PLN", b',')?;
    /// writer.finish()?;
    /// assert!(String::from_utf8(out)?.starts_with("Account,Transaction date,"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(writer: W, base_currency: &str, delimiter: u8) -> Result<Self> {
        let mut inner = WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(writer);
        inner.write_record(header(base_currency))?;
        Ok(Self { inner, rows: 0 })
    }

    /// Append one row.
    pub fn write_row(&mut self, row: &RatedTransactionRow) -> Result<()> {
        self.inner.serialize(CsvRecord::from(row))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush everything to the underlying writer.
    pub fn finish(mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
