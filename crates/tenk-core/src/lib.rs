#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tenk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for cash flows statement extraction.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`CashFlowsSource`](source::CashFlowsSource) - Extracts statement markup for a ticker
//! - [`ReportStore`](store::ReportStore) - Persists reports and their statements
//! - [`TickerSymbol`](types::TickerSymbol) / [`TickerList`](types::TickerList) - Ticker normalization

/// Error types for extraction and storage.
pub mod error;
/// Source trait for extracting statements.
pub mod source;
/// Store trait for persisting reports.
pub mod store;
/// Core data types (TickerSymbol, Report, CashFlowsStatement, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{Result, TenkError};
pub use source::CashFlowsSource;
pub use store::ReportStore;
pub use types::{
    CashFlowsStatement, MAX_TICKER_LEN, Report, ReportId, TickerList, TickerSymbol,
};
