#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tenk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR scraper for 10-K cash flows statements.
//!
//! The pipeline for one ticker is strictly sequential:
//!
//! - [`locator`] - filings index → first 10-K filing entry
//! - [`resolver`] - XBRL viewer menu → cash flows report id
//! - [`extractor`] - report page → `<table class="report">`
//! - [`markup`] - presentation attribute stripping and serialization
//!
//! # Example
//!
//! ```no_run
//! use tenk_edgar::EdgarScraper;
//! use tenk_core::{CashFlowsSource, TickerSymbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scraper = EdgarScraper::new("MyApp/1.0 (contact@example.com)")?;
//!
//!     let table = scraper.fetch_cash_flows(&TickerSymbol::new("AAPL")).await?;
//!     println!("{table}");
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use tenk_core::{CashFlowsSource, Result, TickerSymbol};
use tracing::{debug, instrument};

/// Extraction of the report table.
pub mod extractor;
/// HTTP fetching and rate limiting.
pub mod fetch;
/// Location of the most recent 10-K filing.
pub mod locator;
/// Owned markup tree and sanitizer.
pub mod markup;
/// Resolution of the cash flows report id.
pub mod resolver;

pub use extractor::report_url;
pub use fetch::{Fetcher, HttpFetcher, StaticFetcher};
pub use locator::FilingEntry;
pub use markup::{Element, Node, sanitize};

/// SEC EDGAR cash flows scraper.
///
/// Generic over its [`Fetcher`] so that the pipeline can run against canned
/// documents.
#[derive(Debug)]
pub struct EdgarScraper<F = HttpFetcher> {
    fetcher: F,
}

impl EdgarScraper<HttpFetcher> {
    /// Create a new scraper with the specified user agent.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self> {
        Ok(Self::with_fetcher(HttpFetcher::new(user_agent)?))
    }
}

impl<F: Fetcher> EdgarScraper<F> {
    /// Create a scraper on top of an existing fetcher.
    pub const fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Returns the underlying fetcher.
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs the full pipeline for one ticker and returns the sanitized table
    /// markup.
    ///
    /// # Errors
    /// The first network, parse or lookup fault raised by any step.
    #[instrument(skip_all, fields(ticker = %ticker))]
    pub async fn cash_flows_markup(&self, ticker: &TickerSymbol) -> Result<String> {
        let filing = locator::locate_filing(&self.fetcher, ticker).await?;
        let report_id = resolver::resolve_report_id(&self.fetcher, &filing.xbrl_url).await?;
        let url = report_url(&filing.filing_url, &report_id)?;
        let table = extractor::extract_table(&self.fetcher, &url).await?;

        let markup = sanitize(table);
        debug!(bytes = markup.len(), "Sanitized cash flows table");
        Ok(markup)
    }
}

#[async_trait]
impl<F: Fetcher> CashFlowsSource for EdgarScraper<F> {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    async fn fetch_cash_flows(&self, ticker: &TickerSymbol) -> Result<String> {
        self.cash_flows_markup(ticker).await
    }
}
