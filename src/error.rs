//! Error types for the mt940-rates library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while parsing statements, looking up rates
/// and writing the report.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A statement file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input directory is missing or cannot be listed.
    #[error("cannot list input directory {}: {source}", .path.display())]
    InputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output file cannot be created.
    #[error("cannot create output file {}: {source}", .path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid run configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error writing CSV output.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error parsing MT940 format.
    #[error("MT940 parsing error at line {line}: {message}")]
    Mt940ParseError { line: usize, message: String },

    /// General parsing error.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid date format.
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid amount format.
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    /// Currency code is not three uppercase letters.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// The rate service had no usable rate.
    #[error("Rate unavailable: {0}")]
    RateUnavailable(String),

    /// HTTP transport error talking to the rate service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed rate service response.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How far an error is allowed to propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A line or block failed structural extraction; drop it.
    ParseSkip,
    /// A record is missing date, amount or currency; drop it.
    ValidationSkip,
    /// No exchange rate; the row is still written with an empty rate.
    RateUnavailable,
    /// A statement file could not be read; skip the file.
    IoFailure,
    /// Nothing useful can be done; abort the run.
    FatalConfig,
}

impl Error {
    /// Classify the error for the pipeline's skip/abort policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Mt940ParseError { .. } | Error::ParseError(_) => ErrorKind::ParseSkip,
            Error::InvalidDate(_)
            | Error::InvalidAmount(_)
            | Error::InvalidCurrency(_)
            | Error::MissingField(_) => ErrorKind::ValidationSkip,
            Error::RateUnavailable(_) | Error::Http(_) | Error::Json(_) => {
                ErrorKind::RateUnavailable
            }
            Error::Io(_) | Error::ReadFile { .. } => ErrorKind::IoFailure,
            Error::InputDirectory { .. }
            | Error::OutputFile { .. }
            | Error::Config(_)
            | Error::Csv(_) => ErrorKind::FatalConfig,
        }
    }

    /// Whether the run must stop.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::FatalConfig
    }
}
