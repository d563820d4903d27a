//! Source trait for extracting cash flows statements.
//!
//! This module defines [`CashFlowsSource`], the seam between the batch
//! orchestration and a concrete extraction pipeline such as the EDGAR scraper.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::Result, types::TickerSymbol};

/// Source of cash flows statement markup.
///
/// Implementations locate the most recent annual filing for a ticker and
/// return the sanitized markup of its cash flows statement table.
#[async_trait]
pub trait CashFlowsSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Fetches the sanitized cash flows table markup for a single ticker.
    ///
    /// # Errors
    /// Any network, parse or lookup fault raised while walking the source's
    /// documents.
    async fn fetch_cash_flows(&self, ticker: &TickerSymbol) -> Result<String>;
}
