#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tenk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cash flows statement extraction from 10-K filings.
//!
//! This crate re-exports the core types, the store implementations and the
//! EDGAR scraper, and provides a [`ReportService`] that runs the extraction
//! pipeline over a set of tickers.
//!
//! # Features
//!
//! - `edgar` - SEC EDGAR scraper
//! - `store-sqlite` - SQLite-based report store
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tenk::{InMemoryStore, ReportService, TickerList};
//!
//! #[tokio::main]
//! async fn main() -> tenk::Result<()> {
//!     let service = ReportService::with_edgar(
//!         "MyApp/1.0 (contact@example.com)",
//!         Arc::new(InMemoryStore::new()),
//!     )?;
//!
//!     let list = TickerList::parse("aapl\nmsft\n");
//!     let submission = service.submit(&list.tickers).await?;
//!     for failure in &submission.failures {
//!         println!("{}: {}", failure.ticker, failure);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use tenk_core::*;

// Store implementations
pub use tenk_store::InMemoryStore;
#[cfg(feature = "store-sqlite")]
pub use tenk_store::SqliteStore;

// Sources
#[cfg(feature = "edgar")]
pub use tenk_edgar::EdgarScraper;

mod service;
pub use service::{BatchOutcome, FAILED_RETRIEVING_DATA, ReportService, Submission, TickerFailure};
