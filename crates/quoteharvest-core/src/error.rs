use std::path::PathBuf;

use thiserror::Error;

/// Validation errors for domain inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },
    #[error("symbol '{symbol}' appears more than once in the batch")]
    DuplicateSymbol { symbol: String },

    #[error("timestamp is not ISO-8601: '{value}'")]
    InvalidTimestamp { value: String },

    #[error("pacing bounds are inverted: min {min_ms}ms > max {max_ms}ms")]
    InvalidPacing { min_ms: u64, max_ms: u64 },
    #[error("retry policy requires at least one attempt")]
    ZeroAttempts,
}

/// Batch and file level failures surfaced to the caller.
///
/// Per-symbol failures never appear here; they are recorded on the
/// [`RawRecord`](crate::RawRecord) of the symbol that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no symbols were supplied")]
    NoSymbols,

    #[error("no data collected: all {attempted} symbol(s) failed")]
    NoData { attempted: usize },

    #[error("input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("input file has no records: {}", path.display())]
    EmptyInput { path: PathBuf },

    #[error("dataset is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error(transparent)]
    Extract(#[from] crate::extractor::ExtractError),

    #[error("http client setup failed: {0}")]
    Client(#[from] crate::http_client::HttpError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True when the whole batch produced nothing usable.
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}
