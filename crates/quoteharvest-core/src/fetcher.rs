//! Quote page retrieval with bounded retry.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::http_client::{browser_headers, HttpClient, HttpRequest};
use crate::retry::{RetryConfig, Sleeper, TokioSleeper};
use crate::Symbol;

pub const DEFAULT_BASE_URL: &str = "https://finance.yahoo.com";

/// Per-symbol transport failure. Always carries the symbol it belongs to.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{symbol}: transport error after {attempts} attempt(s): {message}")]
    Transport {
        symbol: Symbol,
        attempts: u32,
        message: String,
    },
    #[error("{symbol}: upstream returned status {status} after {attempts} attempt(s)")]
    Status {
        symbol: Symbol,
        status: u16,
        attempts: u32,
    },
}

impl FetchError {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Self::Transport { symbol, .. } | Self::Status { symbol, .. } => symbol,
        }
    }
}

/// Fetches one quote page per call over a shared transport.
#[derive(Clone)]
pub struct PageFetcher {
    client: Arc<dyn HttpClient>,
    sleeper: Arc<dyn Sleeper>,
    base_url: String,
    headers: BTreeMap<String, String>,
    timeout_ms: u64,
    retry: RetryConfig,
}

impl PageFetcher {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            sleeper: Arc::new(TokioSleeper),
            base_url: String::from(DEFAULT_BASE_URL),
            headers: browser_headers(),
            timeout_ms: 10_000,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn url_for(&self, symbol: &Symbol) -> String {
        format!(
            "{}/quote/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(symbol.as_str())
        )
    }

    /// Fetch the page body for `symbol`, retrying transient failures.
    pub async fn fetch(&self, symbol: &Symbol) -> Result<String, FetchError> {
        let url = self.url_for(symbol);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = HttpRequest::get(url.as_str())
                .with_headers(&self.headers)
                .with_timeout_ms(self.timeout_ms);

            let failure = match self.client.execute(request).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => {
                    let retryable = self.retry.should_retry_status(response.status);
                    let error = FetchError::Status {
                        symbol: symbol.clone(),
                        status: response.status,
                        attempts: attempt,
                    };
                    (error, retryable)
                }
                Err(error) => {
                    let retryable = error.retryable();
                    let error = FetchError::Transport {
                        symbol: symbol.clone(),
                        attempts: attempt,
                        message: error.message().to_owned(),
                    };
                    (error, retryable)
                }
            };

            let (error, retryable) = failure;
            if !retryable || attempt >= max_attempts {
                warn!(symbol = %symbol, attempts = attempt, error = %error, "page fetch failed");
                return Err(error);
            }

            let delay = self.retry.delay_for_attempt(attempt - 1);
            debug!(
                symbol = %symbol,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "retrying page fetch"
            );
            self.sleeper.sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::retry::Backoff;

    struct Scripted {
        responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
        urls: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                urls: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for Scripted {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.urls.lock().expect("lock").push(request.url);
            let next = self
                .responses
                .lock()
                .expect("lock")
                .pop()
                .unwrap_or_else(|| Err(HttpError::non_retryable("script exhausted")));
            Box::pin(async move { next })
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<Duration>>);

    impl Sleeper for Recording {
        fn sleep<'a>(&'a self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
            self.0.lock().expect("lock").push(duration);
            Box::pin(async {})
        }
    }

    fn fixed_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig::new(
            max_attempts,
            Backoff::Fixed {
                delay: Duration::from_millis(250),
            },
        )
        .expect("valid retry")
    }

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[tokio::test]
    async fn retries_transient_failures_then_succeeds() {
        let client = Arc::new(Scripted::new(vec![
            Err(HttpError::new("connection reset")),
            Ok(HttpResponse::with_status(503, "busy")),
            Ok(HttpResponse::ok("<html>ok</html>")),
        ]));
        let sleeper = Arc::new(Recording::default());
        let fetcher = PageFetcher::new(client.clone())
            .with_retry(fixed_retry(3))
            .with_sleeper(sleeper.clone());

        let body = fetcher.fetch(&symbol("AAPL")).await.expect("third attempt succeeds");

        assert_eq!(body, "<html>ok</html>");
        assert_eq!(client.urls.lock().expect("lock").len(), 3);
        assert_eq!(
            *sleeper.0.lock().expect("lock"),
            vec![Duration::from_millis(250), Duration::from_millis(250)]
        );
    }

    #[tokio::test]
    async fn gives_up_at_attempt_cap() {
        let client = Arc::new(Scripted::new(vec![
            Err(HttpError::new("timeout")),
            Err(HttpError::new("timeout")),
            Err(HttpError::new("timeout")),
            Ok(HttpResponse::ok("never reached")),
        ]));
        let fetcher = PageFetcher::new(client.clone())
            .with_retry(fixed_retry(3))
            .with_sleeper(Arc::new(Recording::default()));

        let error = fetcher.fetch(&symbol("MSFT")).await.expect_err("must fail");

        assert_eq!(error.symbol().as_str(), "MSFT");
        assert!(matches!(error, FetchError::Transport { attempts: 3, .. }));
        assert_eq!(client.urls.lock().expect("lock").len(), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_status() {
        let client = Arc::new(Scripted::new(vec![Ok(HttpResponse::with_status(404, "nope"))]));
        let sleeper = Arc::new(Recording::default());
        let fetcher = PageFetcher::new(client.clone())
            .with_retry(fixed_retry(3))
            .with_sleeper(sleeper.clone());

        let error = fetcher.fetch(&symbol("ZZZZ")).await.expect_err("must fail");

        assert!(matches!(error, FetchError::Status { status: 404, attempts: 1, .. }));
        assert!(sleeper.0.lock().expect("lock").is_empty());
    }

    #[test]
    fn url_encodes_symbol_and_trims_base() {
        let fetcher = PageFetcher::new(Arc::new(Scripted::new(Vec::new())))
            .with_base_url("https://quotes.example.test/");

        assert_eq!(
            fetcher.url_for(&symbol("^GSPC")),
            "https://quotes.example.test/quote/%5EGSPC"
        );
    }
}
