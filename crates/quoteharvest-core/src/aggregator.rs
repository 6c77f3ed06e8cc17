//! Batch collection: fetch and extract every symbol, in order.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::extractor::Extractor;
use crate::fetcher::PageFetcher;
use crate::retry::{Pacing, Sleeper, TokioSleeper};
use crate::{Dataset, PipelineError, RawRecord, Symbol, ValidationError};

/// Error tag written on symbols skipped after cancellation.
pub const CANCELLED_ERROR: &str = "batch cancelled before fetch";

/// Cooperative cancellation for a running batch.
///
/// Cancelling wakes any pacing delay or fetch currently awaiting
/// [`CancelToken::cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<CancelState>);

#[derive(Debug, Default)]
struct CancelState {
    flag: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.flag.store(true, Ordering::SeqCst);
        self.0.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.flag.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let notified = self.0.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel is not lost.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Drives the fetcher and extractor across a symbol batch.
pub struct BatchCollector {
    fetcher: PageFetcher,
    extractor: Extractor,
    pacing: Pacing,
    sleeper: Arc<dyn Sleeper>,
}

impl BatchCollector {
    pub fn new(fetcher: PageFetcher, extractor: Extractor) -> Self {
        Self {
            fetcher,
            extractor,
            pacing: Pacing::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Fetch and extract one symbol. Failures come back as a tagged record.
    pub async fn scrape(&self, symbol: &Symbol) -> RawRecord {
        match self.fetcher.fetch(symbol).await {
            Ok(body) => {
                let record = self.extractor.extract(symbol, &body);
                if record.quote.current_price.is_none() {
                    warn!(symbol = %symbol, "page had no current price; keeping partial record");
                }
                record
            }
            Err(error) => RawRecord::failed(symbol.clone(), self.extractor.source(), error.to_string()),
        }
    }

    pub async fn collect(&self, symbols: &[Symbol]) -> Result<Dataset, PipelineError> {
        self.collect_with_cancel(symbols, &CancelToken::new()).await
    }

    /// Collect a batch, one record per symbol in input order.
    ///
    /// Duplicate symbols are rejected before anything is fetched. Returns
    /// [`PipelineError::NoData`] when not a single symbol succeeded.
    pub async fn collect_with_cancel(
        &self,
        symbols: &[Symbol],
        cancel: &CancelToken,
    ) -> Result<Dataset, PipelineError> {
        if symbols.is_empty() {
            return Err(PipelineError::NoSymbols);
        }
        let mut seen = HashSet::with_capacity(symbols.len());
        if let Some(duplicate) = symbols.iter().find(|symbol| !seen.insert(*symbol)) {
            return Err(ValidationError::DuplicateSymbol {
                symbol: duplicate.as_str().to_owned(),
            }
            .into());
        }

        info!(count = symbols.len(), "collecting quote batch");
        let total = symbols.len();
        let mut records = Vec::with_capacity(total);

        for (index, symbol) in symbols.iter().enumerate() {
            if cancel.is_cancelled() {
                records.push(RawRecord::failed(
                    symbol.clone(),
                    self.extractor.source(),
                    CANCELLED_ERROR,
                ));
                continue;
            }

            info!(symbol = %symbol, position = index + 1, total, "scraping symbol");
            let record = tokio::select! {
                record = self.scrape(symbol) => record,
                () = cancel.cancelled() => {
                    warn!(symbol = %symbol, "fetch interrupted by cancellation");
                    RawRecord::failed(symbol.clone(), self.extractor.source(), CANCELLED_ERROR)
                }
            };
            if let Some(reason) = &record.error {
                warn!(symbol = %symbol, error = %reason, "symbol failed");
            }
            records.push(record);

            if index + 1 < total && !cancel.is_cancelled() {
                tokio::select! {
                    () = self.sleeper.sleep(self.pacing.next_delay()) => {}
                    () = cancel.cancelled() => {}
                }
            }
        }

        let dataset = Dataset::new(records);
        let succeeded = dataset.success_count();
        if succeeded == 0 {
            error!(attempted = total, "no stock data scraped successfully");
            return Err(PipelineError::NoData { attempted: total });
        }

        info!(
            batch_id = %dataset.batch_id(),
            succeeded,
            failed = total - succeeded,
            "batch collected"
        );
        Ok(dataset)
    }
}
