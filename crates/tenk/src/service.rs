//! Report service: batch extraction with per-ticker failure isolation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use tenk_core::{
    CashFlowsSource, CashFlowsStatement, Report, ReportId, ReportStore, Result, TenkError,
    TickerList, TickerSymbol,
};

/// User-facing message for any ticker whose extraction failed.
pub const FAILED_RETRIEVING_DATA: &str = "Failed retrieving data";

/// A ticker whose extraction failed.
///
/// Displays as [`FAILED_RETRIEVING_DATA`] whatever the cause; the underlying
/// fault is kept as the error source.
#[derive(Debug, Clone, Error)]
#[error("{}", FAILED_RETRIEVING_DATA)]
pub struct TickerFailure {
    /// The ticker that failed.
    pub ticker: TickerSymbol,
    /// The fault raised by the pipeline.
    #[source]
    pub source: TenkError,
}

/// Outcome of running the pipeline over a set of tickers.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Sanitized markup per successful ticker.
    pub extracted: BTreeMap<TickerSymbol, String>,
    /// Failed tickers, sorted by ticker.
    pub failures: Vec<TickerFailure>,
}

/// A stored report together with the tickers that could not be extracted.
#[derive(Debug)]
pub struct Submission {
    /// The newly created report.
    pub report: Report,
    /// Failed tickers, sorted by ticker.
    pub failures: Vec<TickerFailure>,
}

/// Runs extractions and persists reports.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tenk::{ReportService, SqliteStore, TickerList};
///
/// let store = Arc::new(SqliteStore::new("tenk.db")?);
/// let service = ReportService::with_edgar("MyApp/1.0 (contact@example.com)", store)?;
///
/// let list = TickerList::parse("aapl\nmsft\n");
/// let submission = service.submit(&list.tickers).await?;
/// println!("report {} ({} failed)", submission.report.id, submission.failures.len());
/// ```
pub struct ReportService {
    source: Arc<dyn CashFlowsSource>,
    store: Arc<dyn ReportStore>,
    concurrency: usize,
}

impl std::fmt::Debug for ReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportService")
            .field("source", &self.source.name())
            .field("store", &"configured")
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl ReportService {
    /// Create a service that processes tickers one at a time.
    #[must_use]
    pub fn new(source: Arc<dyn CashFlowsSource>, store: Arc<dyn ReportStore>) -> Self {
        Self {
            source,
            store,
            concurrency: 1,
        }
    }

    /// Create a service backed by the SEC EDGAR scraper.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    #[cfg(feature = "edgar")]
    pub fn with_edgar(user_agent: &str, store: Arc<dyn ReportStore>) -> Result<Self> {
        let scraper = tenk_edgar::EdgarScraper::new(user_agent)?;
        Ok(Self::new(Arc::new(scraper), store))
    }

    /// Set how many tickers may be extracted at once (at least one).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Returns the configured source.
    #[must_use]
    pub fn source(&self) -> &dyn CashFlowsSource {
        self.source.as_ref()
    }

    /// Runs the pipeline for a single ticker.
    ///
    /// # Errors
    /// Any fault is wrapped in a [`TickerFailure`] for that ticker.
    pub async fn extract(&self, ticker: &TickerSymbol) -> std::result::Result<String, TickerFailure> {
        debug!(source = self.source.name(), ticker = %ticker, "Extracting cash flows");

        self.source
            .fetch_cash_flows(ticker)
            .await
            .map_err(|source| {
                if source.is_pipeline_fault() {
                    warn!(ticker = %ticker, error = %source, "{}", FAILED_RETRIEVING_DATA);
                } else {
                    error!(ticker = %ticker, error = %source, "{}", FAILED_RETRIEVING_DATA);
                }
                TickerFailure {
                    ticker: ticker.clone(),
                    source,
                }
            })
    }

    /// Runs the pipeline for every ticker. One ticker's failure never aborts
    /// the others.
    pub async fn extract_all(&self, tickers: &BTreeSet<TickerSymbol>) -> BatchOutcome {
        let results: Vec<(TickerSymbol, std::result::Result<String, TickerFailure>)> =
            stream::iter(tickers.iter().cloned())
                .map(|ticker| async move {
                    let result = self.extract(&ticker).await;
                    (ticker, result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut outcome = BatchOutcome::default();
        for (ticker, result) in results {
            match result {
                Ok(markup) => {
                    outcome.extracted.insert(ticker, markup);
                }
                Err(failure) => outcome.failures.push(failure),
            }
        }
        outcome.failures.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        outcome
    }

    /// Extracts every ticker and stores the successes as a new report.
    ///
    /// The report is created even if every ticker failed.
    ///
    /// # Errors
    /// Only storage errors are returned; extraction failures are reported in
    /// [`Submission::failures`].
    pub async fn submit(&self, tickers: &BTreeSet<TickerSymbol>) -> Result<Submission> {
        let outcome = self.extract_all(tickers).await;
        let report = self.store.create_report(&outcome.extracted).await?;

        info!(
            report_id = %report.id,
            extracted = outcome.extracted.len(),
            failed = outcome.failures.len(),
            "Created report"
        );

        Ok(Submission {
            report,
            failures: outcome.failures,
        })
    }

    /// Submits a parsed ticker list.
    ///
    /// Valid tickers go through [`submit`](Self::submit). Entries that failed
    /// validation are never fetched and are reported as failures next to the
    /// pipeline failures.
    ///
    /// # Errors
    /// Only storage errors are returned.
    pub async fn submit_list(&self, list: &TickerList) -> Result<Submission> {
        let mut submission = self.submit(&list.tickers).await?;

        for (entry, source) in &list.rejected {
            warn!(entry = %entry, error = %source, "{}", FAILED_RETRIEVING_DATA);
            submission.failures.push(TickerFailure {
                ticker: TickerSymbol::new(entry),
                source: source.clone(),
            });
        }
        submission.failures.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        submission.failures.dedup_by(|a, b| a.ticker == b.ticker);

        Ok(submission)
    }

    /// Fetches a report with its statements.
    ///
    /// # Errors
    /// Storage errors.
    pub async fn report(&self, id: ReportId) -> Result<Option<Report>> {
        self.store.get_report(id).await
    }

    /// Fetches the statement of one ticker within a report.
    ///
    /// # Errors
    /// Storage errors.
    pub async fn statement(
        &self,
        id: ReportId,
        ticker: &TickerSymbol,
    ) -> Result<Option<CashFlowsStatement>> {
        self.store.get_statement(id, ticker).await
    }

    /// Lists all reports, newest first.
    ///
    /// # Errors
    /// Storage errors.
    pub async fn reports(&self) -> Result<Vec<Report>> {
        self.store.list_reports().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::error::Error as _;
    use std::sync::Mutex;
    use tenk_store::InMemoryStore;

    /// Source answering from a fixed table and recording every call.
    #[derive(Debug, Default)]
    struct StubSource {
        responses: HashMap<TickerSymbol, Result<String>>,
        calls: Mutex<Vec<TickerSymbol>>,
    }

    impl StubSource {
        fn ok(mut self, ticker: &str, markup: &str) -> Self {
            self.responses
                .insert(TickerSymbol::new(ticker), Ok(markup.to_string()));
            self
        }

        fn err(mut self, ticker: &str, err: TenkError) -> Self {
            self.responses.insert(TickerSymbol::new(ticker), Err(err));
            self
        }

        fn calls(&self) -> Vec<TickerSymbol> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CashFlowsSource for StubSource {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch_cash_flows(&self, ticker: &TickerSymbol) -> Result<String> {
            self.calls.lock().unwrap().push(ticker.clone());
            self.responses
                .get(ticker)
                .cloned()
                .unwrap_or_else(|| Err(TenkError::Network("unreachable".to_string())))
        }
    }

    /// Store whose writes always fail.
    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl ReportStore for BrokenStore {
        async fn create_report(&self, _: &BTreeMap<TickerSymbol, String>) -> Result<Report> {
            Err(TenkError::Store("disk full".to_string()))
        }

        async fn get_report(&self, _: ReportId) -> Result<Option<Report>> {
            Ok(None)
        }

        async fn get_statement(
            &self,
            _: ReportId,
            _: &TickerSymbol,
        ) -> Result<Option<CashFlowsStatement>> {
            Ok(None)
        }

        async fn list_reports(&self) -> Result<Vec<Report>> {
            Ok(Vec::new())
        }

        async fn delete_report(&self, _: ReportId) -> Result<bool> {
            Ok(false)
        }
    }

    fn tickers(list: &[&str]) -> BTreeSet<TickerSymbol> {
        list.iter().map(|t| TickerSymbol::new(t)).collect()
    }

    fn service(source: StubSource) -> (Arc<StubSource>, Arc<InMemoryStore>, ReportService) {
        let source = Arc::new(source);
        let store = Arc::new(InMemoryStore::new());
        let service = ReportService::new(source.clone(), store.clone());
        (source, store, service)
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_ticker() {
        let (source, _, service) = service(
            StubSource::default()
                .ok("AAPL", "<table>a</table>")
                .err("MSFT", TenkError::Lookup("no cash-flows statement found".into())),
        );

        let outcome = service
            .extract_all(&tickers(&["AAPL", "MSFT", "ZZZZ"]))
            .await;

        assert_eq!(outcome.extracted.len(), 1);
        assert_eq!(
            outcome.extracted.get(&TickerSymbol::new("AAPL")).unwrap(),
            "<table>a</table>"
        );

        let failed: Vec<&str> = outcome.failures.iter().map(|f| f.ticker.as_str()).collect();
        assert_eq!(failed, vec!["MSFT", "ZZZZ"]);
        assert_eq!(source.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_failure_message_and_source() {
        let (_, _, service) = service(
            StubSource::default().err("MSFT", TenkError::Parse("empty".into())),
        );

        let failure = service.extract(&TickerSymbol::new("MSFT")).await.unwrap_err();
        assert_eq!(failure.to_string(), FAILED_RETRIEVING_DATA);

        let cause = failure.source().unwrap();
        assert_eq!(cause.to_string(), "Parse error: empty");
        assert_eq!(failure.source, TenkError::Parse("empty".into()));
    }

    #[tokio::test]
    async fn test_submit_stores_only_successes() {
        let (_, store, service) = service(StubSource::default().ok("AAPL", "<table>a</table>"));

        let submission = service.submit(&tickers(&["aapl", "msft"])).await.unwrap();
        assert_eq!(submission.failures.len(), 1);
        assert_eq!(submission.failures[0].ticker.as_str(), "MSFT");

        let report = store.get_report(submission.report.id).await.unwrap().unwrap();
        assert_eq!(report.statements.len(), 1);
        assert_eq!(report.statements[0].ticker_symbol.as_str(), "AAPL");
        assert_eq!(report.statements[0].data, "<table>a</table>");

        assert!(
            service
                .statement(report.id, &TickerSymbol::new("MSFT"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_submit_list_reports_invalid_entries() {
        let (source, store, service) = service(
            StubSource::default()
                .ok("AAPL", "<table>a</table>")
                .ok("GOOG", "<table>g</table>"),
        );

        let list = TickerList::parse("aapl\ngoog\nabcdef\nab cd\nabcdef\n");
        let submission = service.submit_list(&list).await.unwrap();

        let failed: Vec<&str> = submission
            .failures
            .iter()
            .map(|f| f.ticker.as_str())
            .collect();
        assert_eq!(failed, vec!["AB CD", "ABCDEF"]);
        assert!(
            submission
                .failures
                .iter()
                .all(|f| matches!(f.source, TenkError::InvalidParameter(_)))
        );
        assert_eq!(source.calls(), vec![TickerSymbol::new("AAPL"), TickerSymbol::new("GOOG")]);

        let report = store.get_report(submission.report.id).await.unwrap().unwrap();
        assert_eq!(report.statements.len(), 2);
    }

    #[tokio::test]
    async fn test_report_created_when_everything_fails() {
        let (_, _, service) = service(StubSource::default());

        let submission = service.submit(&tickers(&["AAPL", "MSFT"])).await.unwrap();
        assert_eq!(submission.failures.len(), 2);

        let report = service.report(submission.report.id).await.unwrap().unwrap();
        assert!(report.statements.is_empty());
        assert_eq!(service.reports().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_extraction_attributes_errors() {
        let (source, _, service) = service(
            StubSource::default()
                .ok("A", "<table>a</table>")
                .ok("C", "<table>c</table>")
                .err("B", TenkError::Lookup("b".into()))
                .err("D", TenkError::Network("d".into())),
        );
        let service = service.with_concurrency(4);

        let outcome = service.extract_all(&tickers(&["A", "B", "C", "D"])).await;

        let extracted: Vec<&str> = outcome.extracted.keys().map(TickerSymbol::as_str).collect();
        assert_eq!(extracted, vec!["A", "C"]);
        assert_eq!(outcome.failures[0].ticker.as_str(), "B");
        assert_eq!(outcome.failures[0].source, TenkError::Lookup("b".into()));
        assert_eq!(outcome.failures[1].ticker.as_str(), "D");
        assert_eq!(outcome.failures[1].source, TenkError::Network("d".into()));
        assert_eq!(source.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let source = Arc::new(StubSource::default().ok("AAPL", "<table>a</table>"));
        let service = ReportService::new(source, Arc::new(BrokenStore));

        let err = service.submit(&tickers(&["AAPL"])).await.unwrap_err();
        assert_eq!(err, TenkError::Store("disk full".to_string()));
    }

    #[test]
    fn test_concurrency_floor() {
        let (_, _, service) = service(StubSource::default());
        let service = service.with_concurrency(0);
        assert_eq!(service.concurrency, 1);
        assert_eq!(service.source().name(), "stub");
    }
}
