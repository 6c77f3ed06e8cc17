//! # Domain Models
//!
//! Typed records flowing through the ingestion pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker, unique within a batch |
//! | [`RawRecord`] | Fields extracted from one quote page |
//! | [`Dataset`] | Ordered raw records for one batch |
//! | [`ProcessedRecord`] | Cleaned, imputed record with derived indicators |
//! | [`ProcessedDataset`] | Output of the processing pipeline |
//! | [`NumericColumn`] | Closed set of floating-point columns |
//! | [`MarketCapCategory`] / [`PerformanceCategory`] | Fixed categorical buckets |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Records carry explicit optional fields instead of a string-keyed map, so a
//! misspelled column is a compile error rather than a silently empty value.

mod category;
mod models;
mod symbol;
mod timestamp;

pub use category::{MarketCapCategory, PerformanceCategory};
pub use models::{
    Dataset, NumericColumn, ProcessedDataset, ProcessedRecord, QuoteFields, RawRecord,
    DEFAULT_SOURCE,
};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
