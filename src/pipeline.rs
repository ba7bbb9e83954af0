//! The batch run: statement files in, rated CSV out.
//!
//! Every stage isolates its own failures. An unreadable file, a statement
//! without an account, a truncated `:61:` line or a record without currency
//! is logged and skipped; only configuration and output errors end the run.

use crate::config::Config;
use crate::csv_format::CsvReportWriter;
use crate::error::{Error, ErrorKind, Result};
use crate::mt940_format;
use crate::rates::{NbpClient, RateLookup, RateProvider};
use crate::types::{Balance, RatedTransactionRow};
use crate::walker;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub blocks_parsed: usize,
    pub blocks_skipped: usize,
    /// `:61:` lines that could not be sliced.
    pub lines_skipped: usize,
    /// Records without a usable date, amount or currency.
    pub records_dropped: usize,
    pub rows_written: usize,
    /// Rows written with an empty rate cell.
    pub rows_without_rate: usize,
}

/// Walks the input directory and writes the rated report.
pub struct Pipeline<P> {
    config: Config,
    rates: RateLookup<P>,
}

impl Pipeline<NbpClient> {
    /// Pipeline backed by the NBP API as configured.
    pub fn with_nbp(config: Config) -> Result<Self> {
        let client = NbpClient::new(
            &config.rate_api_url,
            config.rate_timeout,
            config.rate_lookback_days,
        )
        .map_err(|e| Error::Config(format!("cannot set up HTTP client: {}", e)))?;
        Ok(Self::new(config, client))
    }
}

impl<P: RateProvider> Pipeline<P> {
    pub fn new(config: Config, provider: P) -> Self {
        let rates = RateLookup::new(provider, &config.base_currency);
        Self { config, rates }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rates(&self) -> &RateLookup<P> {
        &self.rates
    }

    /// Run the whole batch.
    ///
    /// The input directory is listed before the output file is touched, so a
    /// missing directory leaves any previous report as it was.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.config.validate()?;

        let files =
            walker::list_statement_files(&self.config.input_dir, self.config.extension.as_deref())?;
        info!(
            dir = %self.config.input_dir.display(),
            files = files.len(),
            "found statement files"
        );

        let output = File::create(&self.config.output_path).map_err(|source| Error::OutputFile {
            path: self.config.output_path.clone(),
            source,
        })?;
        let mut writer = CsvReportWriter::new(
            BufWriter::new(output),
            self.rates.base_currency(),
            self.config.delimiter,
        )?;

        let summary = self.process_files(&files, &mut writer)?;
        writer.finish()?;

        info!(
            output = %self.config.output_path.display(),
            files = summary.files_processed,
            files_skipped = summary.files_skipped,
            blocks = summary.blocks_parsed,
            blocks_skipped = summary.blocks_skipped,
            lines_skipped = summary.lines_skipped,
            records_dropped = summary.records_dropped,
            rows = summary.rows_written,
            rows_without_rate = summary.rows_without_rate,
            rate_requests = self.rates.requests(),
            "report written"
        );
        Ok(summary)
    }

    /// Process `files` in order, appending rows to `writer`.
    pub fn process_files<W: Write>(
        &mut self,
        files: &[PathBuf],
        writer: &mut CsvReportWriter<W>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for path in files {
            self.process_file(path, writer, &mut summary)?;
        }
        Ok(summary)
    }

    fn process_file<W: Write>(
        &mut self,
        path: &Path,
        writer: &mut CsvReportWriter<W>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        info!(file = %path.display(), "processing file");
        let text = match walker::read_statement_file(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %path.display(), kind = ?e.kind(), error = %e, "skipping file");
                summary.files_skipped += 1;
                return Ok(());
            }
        };

        let source = path.display().to_string();
        self.process_text(&source, &text, writer, summary)?;
        summary.files_processed += 1;
        Ok(())
    }

    /// Process the text of one statement file.
    ///
    /// Only a failure to write the report is returned; everything else is
    /// counted in `summary` and logged.
    pub fn process_text<W: Write>(
        &mut self,
        source: &str,
        text: &str,
        writer: &mut CsvReportWriter<W>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let blocks = mt940_format::parse_blocks(text);
        if blocks.is_empty() {
            warn!(file = source, "no MT940 statements found");
        }

        for parsed in blocks {
            let block = match parsed {
                Ok(block) => block,
                Err(e) => {
                    warn!(file = source, kind = ?e.kind(), error = %e, "skipping statement");
                    summary.blocks_skipped += 1;
                    continue;
                }
            };
            summary.blocks_parsed += 1;
            debug!(
                file = source,
                reference = %block.header.reference,
                account = %block.header.account,
                number = ?block.header.statement_number,
                opening = ?block.header.opening_balance.as_ref().map(Balance::signed_amount),
                entries = block.entries.len(),
                "statement"
            );

            for result in block.transactions() {
                let record = match result {
                    Ok(record) => record,
                    Err(e) => {
                        match e.kind() {
                            ErrorKind::ParseSkip => summary.lines_skipped += 1,
                            _ => summary.records_dropped += 1,
                        }
                        warn!(file = source, kind = ?e.kind(), error = %e, "skipping transaction");
                        continue;
                    }
                };

                let rate = self.rates.lookup(&record.currency, record.transaction_date);
                if rate.is_none() {
                    summary.rows_without_rate += 1;
                }
                debug!(
                    date = %record.transaction_date,
                    amount = %record.amount,
                    currency = %record.currency,
                    kind = %record.transaction_type,
                    id = %record.transaction_id,
                    "transaction"
                );

                writer.write_row(&RatedTransactionRow { record, rate })?;
                summary.rows_written += 1;
            }
        }
        Ok(())
    }
}
