//! In-memory store implementation.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tenk_core::{
    CashFlowsStatement, Report, ReportId, ReportStore, Result, TickerSymbol,
};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    reports: BTreeMap<ReportId, Report>,
}

/// Simple in-memory store for testing and ephemeral servers.
///
/// Reports own their statements directly, so deleting a report drops its
/// statements with it. Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    #[instrument(skip(self, statements), fields(count = statements.len()))]
    async fn create_report(&self, statements: &BTreeMap<TickerSymbol, String>) -> Result<Report> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = ReportId(inner.last_id);

        let report = Report::new(id, Utc::now()).with_statements(
            statements
                .iter()
                .map(|(ticker, data)| CashFlowsStatement::new(id, ticker.clone(), data.clone()))
                .collect(),
        );
        inner.reports.insert(id, report.clone());

        debug!(report_id = %id, "Stored report");
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn get_report(&self, id: ReportId) -> Result<Option<Report>> {
        Ok(self.inner.read().await.reports.get(&id).cloned())
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn get_statement(
        &self,
        id: ReportId,
        ticker: &TickerSymbol,
    ) -> Result<Option<CashFlowsStatement>> {
        Ok(self
            .inner
            .read()
            .await
            .reports
            .get(&id)
            .and_then(|report| report.statement(ticker))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_reports(&self) -> Result<Vec<Report>> {
        Ok(self
            .inner
            .read()
            .await
            .reports
            .values()
            .rev()
            .map(|report| Report::new(report.id, report.created_at))
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_report(&self, id: ReportId) -> Result<bool> {
        let removed = self.inner.write().await.reports.remove(&id).is_some();
        if removed {
            debug!(report_id = %id, "Deleted report");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements() -> BTreeMap<TickerSymbol, String> {
        BTreeMap::from([
            (TickerSymbol::new("MSFT"), "<table>m</table>".to_string()),
            (TickerSymbol::new("AAPL"), "<table>a</table>".to_string()),
        ])
    }

    #[tokio::test]
    async fn test_create_and_get_report() {
        let store = InMemoryStore::new();
        let report = store.create_report(&statements()).await.unwrap();
        assert_eq!(report.id, ReportId(1));

        let fetched = store.get_report(report.id).await.unwrap().unwrap();
        assert_eq!(fetched, report);
        let tickers: Vec<&str> = fetched.tickers().map(TickerSymbol::as_str).collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);

        assert!(store.get_report(ReportId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_statement() {
        let store = InMemoryStore::new();
        let report = store.create_report(&statements()).await.unwrap();

        let stmt = store
            .get_statement(report.id, &TickerSymbol::new("AAPL"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stmt.data, "<table>a</table>");

        assert!(
            store
                .get_statement(report.id, &TickerSymbol::new("GOOG"))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .get_statement(ReportId(42), &TickerSymbol::new("AAPL"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_empty_report_and_listing() {
        let store = InMemoryStore::new();
        let first = store.create_report(&BTreeMap::new()).await.unwrap();
        let second = store.create_report(&statements()).await.unwrap();
        assert!(first.statements.is_empty());

        let listed = store.list_reports().await.unwrap();
        let ids: Vec<ReportId> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert!(listed.iter().all(|r| r.statements.is_empty()));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let store = InMemoryStore::new();
        let report = store.create_report(&statements()).await.unwrap();

        assert!(store.delete_report(report.id).await.unwrap());
        assert!(!store.delete_report(report.id).await.unwrap());
        assert!(
            store
                .get_statement(report.id, &TickerSymbol::new("AAPL"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
