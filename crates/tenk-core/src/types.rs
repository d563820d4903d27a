//! Core data types for cash flows reports.
//!
//! This module defines the fundamental data structures:
//!
//! - [`TickerSymbol`] - Normalized stock ticker
//! - [`ReportId`] - Identifier of a persisted report
//! - [`Report`] - A submission and the statements extracted for it
//! - [`CashFlowsStatement`] - Sanitized cash flows table markup for one ticker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TenkError};

/// Maximum length of a ticker symbol.
pub const MAX_TICKER_LEN: usize = 5;

/// A stock ticker symbol.
///
/// Symbols are trimmed and uppercased on creation. [`TickerSymbol::parse`]
/// additionally validates length and characters.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Creates a new ticker from a string, trimming and converting to uppercase.
    #[must_use]
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_uppercase())
    }

    /// Creates a validated ticker.
    ///
    /// # Errors
    /// Returns [`TenkError::InvalidParameter`] if the normalized ticker is empty,
    /// longer than [`MAX_TICKER_LEN`], or contains characters other than ASCII
    /// alphanumerics, `.` and `-`.
    pub fn parse(s: impl AsRef<str>) -> Result<Self> {
        let ticker = Self::new(s);
        if ticker.0.is_empty() {
            return Err(TenkError::InvalidParameter("Empty ticker".to_string()));
        }
        if ticker.0.chars().count() > MAX_TICKER_LEN {
            return Err(TenkError::InvalidParameter(format!(
                "Ticker {} is longer than {} characters",
                ticker.0, MAX_TICKER_LEN
            )));
        }
        if !ticker
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(TenkError::InvalidParameter(format!(
                "Ticker {} contains invalid characters",
                ticker.0
            )));
        }
        Ok(ticker)
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TickerSymbol {
    type Err = TenkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&str> for TickerSymbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TickerSymbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Result of splitting a newline-separated ticker list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickerList {
    /// Distinct valid tickers, in sorted order.
    pub tickers: BTreeSet<TickerSymbol>,
    /// Entries that failed validation, with the reason.
    pub rejected: Vec<(String, TenkError)>,
}

impl TickerList {
    /// Splits `input` on newlines, trims and uppercases every entry, drops
    /// blank entries and collapses duplicates.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut list = Self::default();
        for line in input.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match TickerSymbol::parse(line) {
                Ok(ticker) => {
                    list.tickers.insert(ticker);
                }
                Err(e) => list.rejected.push((line.trim().to_uppercase(), e)),
            }
        }
        list
    }

    /// Returns true if no entry (valid or rejected) was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty() && self.rejected.is_empty()
    }
}

/// Identifier of a persisted [`Report`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportId(pub i64);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = TenkError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|e| TenkError::InvalidParameter(format!("Invalid report id {s:?}: {e}")))
    }
}

/// A cash flows statement extracted for one ticker.
///
/// `data` is the sanitized table markup, stored and rendered as an opaque blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowsStatement {
    /// Owning report.
    pub report_id: ReportId,
    /// Normalized ticker symbol.
    pub ticker_symbol: TickerSymbol,
    /// Sanitized HTML of the cash flows table.
    pub data: String,
}

impl CashFlowsStatement {
    /// Creates a new statement.
    #[must_use]
    pub fn new(report_id: ReportId, ticker_symbol: TickerSymbol, data: impl Into<String>) -> Self {
        Self {
            report_id,
            ticker_symbol,
            data: data.into(),
        }
    }
}

/// A report created for one submission of tickers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Report identifier.
    pub id: ReportId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Statements owned by this report, sorted by ticker.
    pub statements: Vec<CashFlowsStatement>,
}

impl Report {
    /// Creates a report without statements.
    #[must_use]
    pub const fn new(id: ReportId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            statements: Vec::new(),
        }
    }

    /// Attaches statements, sorting them by ticker.
    #[must_use]
    pub fn with_statements(mut self, mut statements: Vec<CashFlowsStatement>) -> Self {
        statements.sort_by(|a, b| a.ticker_symbol.cmp(&b.ticker_symbol));
        self.statements = statements;
        self
    }

    /// Looks up the statement for a ticker.
    #[must_use]
    pub fn statement(&self, ticker: &TickerSymbol) -> Option<&CashFlowsStatement> {
        self.statements.iter().find(|s| &s.ticker_symbol == ticker)
    }

    /// Returns the tickers this report holds statements for.
    pub fn tickers(&self) -> impl Iterator<Item = &TickerSymbol> {
        self.statements.iter().map(|s| &s.ticker_symbol)
    }
}
