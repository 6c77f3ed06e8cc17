//! Runtime configuration for a harvesting run.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregator::BatchCollector;
use crate::extractor::Extractor;
use crate::fetcher::{PageFetcher, DEFAULT_BASE_URL};
use crate::http_client::HttpClient;
use crate::retry::{Backoff, Pacing, RetryConfig, Sleeper};
use crate::{PipelineError, Symbol, ValidationError, DEFAULT_SOURCE};

pub const BASE_URL_ENV: &str = "QUOTEHARVEST_BASE_URL";
pub const OUTPUT_DIR_ENV: &str = "QUOTEHARVEST_OUTPUT_DIR";

pub const DEFAULT_SYMBOLS: [&str; 10] = [
    "AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "META", "NFLX", "NVDA", "AMD", "INTC",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Symbols used when a run names none.
    pub symbols: Vec<String>,
    pub base_url: String,
    pub output_dir: PathBuf,
    pub source: String,
    pub timeout_ms: u64,
    pub max_attempts: u32,
    /// Base delay of the exponential retry backoff.
    pub retry_base_ms: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| (*s).to_owned()).collect(),
            base_url: String::from(DEFAULT_BASE_URL),
            output_dir: PathBuf::from("data"),
            source: String::from(DEFAULT_SOURCE),
            timeout_ms: 10_000,
            max_attempts: 3,
            retry_base_ms: 1_000,
            min_delay_ms: 2_000,
            max_delay_ms: 5_000,
        }
    }
}

impl HarvestConfig {
    /// Read a JSON config file; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|error| PipelineError::InvalidConfig {
            message: error.to_string(),
        })
    }

    /// Apply `QUOTEHARVEST_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(base_url) = non_empty_var(BASE_URL_ENV) {
            self.base_url = base_url;
        }
        if let Some(output_dir) = non_empty_var(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(output_dir);
        }
        self
    }

    pub fn default_symbols(&self) -> Result<Vec<Symbol>, ValidationError> {
        Symbol::parse_batch(&self.symbols)
    }

    pub fn retry(&self) -> Result<RetryConfig, ValidationError> {
        let base = Duration::from_millis(self.retry_base_ms);
        RetryConfig::new(
            self.max_attempts,
            Backoff::Exponential {
                base,
                factor: 2.0,
                max: base.saturating_mul(8),
                jitter: true,
            },
        )
    }

    pub fn pacing(&self) -> Result<Pacing, ValidationError> {
        Pacing::new(
            Duration::from_millis(self.min_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }

    /// Wire a collector over `client`, sleeping through `sleeper`.
    pub fn collector(
        &self,
        client: Arc<dyn HttpClient>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<BatchCollector, PipelineError> {
        let fetcher = PageFetcher::new(client)
            .with_base_url(self.base_url.as_str())
            .with_timeout_ms(self.timeout_ms)
            .with_retry(self.retry()?)
            .with_sleeper(sleeper.clone());
        let extractor = Extractor::new(self.source.as_str())?;
        Ok(BatchCollector::new(fetcher, extractor)
            .with_pacing(self.pacing()?)
            .with_sleeper(sleeper))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_documented_values() {
        let config = HarvestConfig::default();
        assert_eq!(config.symbols.len(), 10);
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.retry().expect("valid").max_attempts, 3);
        let pacing = config.pacing().expect("valid");
        assert_eq!(pacing.min(), Duration::from_secs(2));
        assert_eq!(pacing.max(), Duration::from_secs(5));
        assert_eq!(config.default_symbols().expect("valid")[0].as_str(), "AAPL");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("harvest.json");
        std::fs::write(&path, r#"{"symbols":["amd"],"max_attempts":5}"#).expect("write");

        let config = HarvestConfig::from_json_file(&path).expect("load");
        assert_eq!(config.symbols, ["amd"]);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("harvest.json");
        std::fs::write(&path, "{ not json").expect("write");

        let error = HarvestConfig::from_json_file(&path).expect_err("must fail");
        assert!(matches!(error, PipelineError::InvalidConfig { .. }));
    }

    #[test]
    fn inverted_pacing_and_zero_attempts_are_rejected() {
        let config = HarvestConfig {
            min_delay_ms: 10,
            max_delay_ms: 1,
            max_attempts: 0,
            ..HarvestConfig::default()
        };
        assert!(matches!(
            config.pacing(),
            Err(ValidationError::InvalidPacing { .. })
        ));
        assert_eq!(config.retry(), Err(ValidationError::ZeroAttempts));
    }
}
