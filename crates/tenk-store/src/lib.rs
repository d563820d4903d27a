#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tenk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Storage implementations for tenk reports.
//!
//! This crate provides implementations of the [`ReportStore`] trait from `tenk-core`:
//!
//! - [`SqliteStore`] - Persistent SQLite-based store (default, requires `sqlite` feature)
//! - [`InMemoryStore`] - Simple in-memory store

/// In-memory store implementation.
pub mod memory;

/// SQLite-based store implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use tenk_core::ReportStore;

// Re-export implementations
pub use memory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
