//! Store trait for persisting reports and their statements.
//!
//! This module defines the [`ReportStore`] trait that provides a unified
//! interface over the persistence backends (SQLite, in-memory).

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::{
    error::Result,
    types::{CashFlowsStatement, Report, ReportId, TickerSymbol},
};

/// Trait for persisting reports.
///
/// Reports are immutable once created. The only removal path is
/// [`ReportStore::delete_report`], which also removes every statement owned
/// by the report.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Creates a report together with its statements.
    ///
    /// Either the report and every statement are stored, or nothing is.
    /// `statements` may be empty.
    async fn create_report(&self, statements: &BTreeMap<TickerSymbol, String>) -> Result<Report>;

    /// Retrieves a report with its statements.
    ///
    /// Returns `Ok(None)` if no report has this id.
    async fn get_report(&self, id: ReportId) -> Result<Option<Report>>;

    /// Retrieves the statement for a (report, ticker) pair.
    ///
    /// Returns `Ok(None)` if the report or the ticker is unknown.
    async fn get_statement(
        &self,
        id: ReportId,
        ticker: &TickerSymbol,
    ) -> Result<Option<CashFlowsStatement>>;

    /// Lists all reports, newest first, without their statements.
    async fn list_reports(&self) -> Result<Vec<Report>>;

    /// Deletes a report and all its statements.
    ///
    /// Returns `true` if the report existed.
    async fn delete_report(&self, id: ReportId) -> Result<bool>;
}
