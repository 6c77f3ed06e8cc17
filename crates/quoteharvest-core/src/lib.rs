//! # Quoteharvest Core
//!
//! Ingestion pipeline for per-symbol market-quote pages.
//!
//! ## Overview
//!
//! This crate provides every stage between a list of tickers and an analysis
//! ready table:
//!
//! - **Fetching** quote pages over one pooled HTTP client, with bounded retry
//! - **Extraction** of a sparse field set from page markup
//! - **Aggregation** of a symbol batch into an ordered raw dataset
//! - **Normalization** of currency, percent and K/M/B/T notations
//! - **Cleaning and imputation** with a per-column missing-value policy
//! - **Feature derivation**: momentum, volatility and categorical tiers
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`aggregator`] | Sequential batch collection with pacing and cancellation |
//! | [`cleaner`] | Failed-row removal and type coercion |
//! | [`config`] | Run configuration and environment overrides |
//! | [`dataset`] | CSV read/write and timestamped file names |
//! | [`domain`] | Domain models (Symbol, RawRecord, ProcessedRecord, categories) |
//! | [`error`] | Core error types |
//! | [`extractor`] | Field extraction from quote page markup |
//! | [`features`] | Derived indicators and market-cap classification |
//! | [`fetcher`] | Page retrieval with retry |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`imputer`] | Missing-value policy |
//! | [`normalize`] | Text-to-number conversion |
//! | [`pipeline`] | `collect` / `process` entry points |
//! | [`retry`] | Backoff, retry and pacing policies |
//! | [`summary`] | Batch summary and data quality report |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quoteharvest_core::{HarvestConfig, Pipeline, ReqwestHttpClient, Symbol, TokioSleeper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HarvestConfig::default();
//!     let collector = config.collector(
//!         Arc::new(ReqwestHttpClient::new()?),
//!         Arc::new(TokioSleeper),
//!     )?;
//!     let pipeline = Pipeline::new(collector, &config.output_dir);
//!
//!     let symbols = Symbol::parse_batch(["AAPL", "MSFT"])?;
//!     let raw = pipeline.collect(&symbols).await?;
//!     println!("collected {} records", raw.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! symbols ──▶ PageFetcher ──▶ Extractor ──▶ BatchCollector ──▶ Dataset (raw CSV)
//!                 │                                               │
//!                 ▼                                               ▼
//!            HttpClient                      Cleaner ──▶ Imputer ──▶ FeatureDeriver
//!                                                                 │
//!                                                                 ▼
//!                                                 ProcessedDataset (processed CSV)
//! ```
//!
//! ## Error Handling
//!
//! Per-symbol failures never abort a batch. They are recorded on the
//! symbol's [`RawRecord`] and dropped during cleaning. Batch and file level
//! failures surface as [`PipelineError`]:
//!
//! ```rust
//! use quoteharvest_core::PipelineError;
//!
//! fn describe(error: &PipelineError) -> &'static str {
//!     match error {
//!         PipelineError::NoData { .. } => "every symbol failed",
//!         PipelineError::MissingInput { .. } => "input file not found",
//!         _ => "other failure",
//!     }
//! }
//! ```

pub mod aggregator;
pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod features;
pub mod fetcher;
pub mod http_client;
pub mod imputer;
pub mod normalize;
pub mod pipeline;
pub mod retry;
pub mod summary;

// Batch collection
pub use aggregator::{BatchCollector, CancelToken, CANCELLED_ERROR};

// Cleaning and imputation
pub use cleaner::Cleaner;
pub use imputer::{FillPolicy, Imputer};

// Configuration
pub use config::{HarvestConfig, DEFAULT_SYMBOLS};

// Dataset files
pub use dataset::Table;

// Domain models
pub use domain::{
    Dataset, MarketCapCategory, NumericColumn, PerformanceCategory, ProcessedDataset,
    ProcessedRecord, QuoteFields, RawRecord, Symbol, UtcDateTime, DEFAULT_SOURCE,
};

// Error types
pub use error::{PipelineError, ValidationError};

// Extraction and fetching
pub use extractor::{ExtractError, Extractor};
pub use fetcher::{FetchError, PageFetcher, DEFAULT_BASE_URL};

// Derived features
pub use features::{
    FeatureDeriver, MarketCapClassifier, SubstringMarketCapClassifier, SuffixMarketCapClassifier,
};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Pipeline facade
pub use pipeline::{Pipeline, Processor, RunOutput};

// Retry and pacing
pub use retry::{Backoff, Pacing, RetryConfig, Sleeper, TokioSleeper};

// Summaries
pub use summary::{BatchSummary, ColumnStats, ColumnType, DataQualityReport, SymbolChange};
