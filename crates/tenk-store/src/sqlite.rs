//! SQLite-based store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use tenk_core::{
    CashFlowsStatement, Report, ReportId, ReportStore, Result, TenkError, TickerSymbol,
};
use tracing::{debug, instrument};

/// SQLite-based report store.
///
/// Statements reference their report with `ON DELETE CASCADE`; foreign keys
/// are enabled on every connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn store_err(e: impl std::fmt::Display) -> TenkError {
    TenkError::Store(e.to_string())
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(store_err)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(store_err)?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

             CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL
             );

             CREATE TABLE IF NOT EXISTS cash_flows_statements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                report_id INTEGER NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
                ticker_symbol TEXT NOT NULL,
                data TEXT NOT NULL,
                UNIQUE (report_id, ticker_symbol)
             );

             CREATE INDEX IF NOT EXISTS idx_statements_report
             ON cash_flows_statements(report_id);",
        )
        .map_err(store_err)?;

        debug!("SQLite store schema initialized");
        Ok(())
    }

    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| TenkError::Parse(format!("Invalid timestamp {s}: {e}")))
    }

    fn load_statements(conn: &Connection, id: ReportId) -> Result<Vec<CashFlowsStatement>> {
        let mut stmt = conn
            .prepare(
                "SELECT ticker_symbol, data FROM cash_flows_statements
                 WHERE report_id = ?1
                 ORDER BY ticker_symbol ASC",
            )
            .map_err(store_err)?;

        let rows = stmt
            .query_map(params![id.0], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(store_err)?;

        let mut statements = Vec::new();
        for row in rows {
            let (ticker, data) = row.map_err(store_err)?;
            statements.push(CashFlowsStatement::new(id, TickerSymbol::new(ticker), data));
        }
        Ok(statements)
    }
}

#[async_trait]
impl ReportStore for SqliteStore {
    #[instrument(skip(self, statements), fields(count = statements.len()))]
    async fn create_report(&self, statements: &BTreeMap<TickerSymbol, String>) -> Result<Report> {
        let created_at = Utc::now();

        let conn = self.conn.lock().map_err(store_err)?;
        let tx = conn.unchecked_transaction().map_err(store_err)?;

        tx.execute(
            "INSERT INTO reports (created_at) VALUES (?1)",
            params![created_at.to_rfc3339()],
        )
        .map_err(store_err)?;
        let id = ReportId(tx.last_insert_rowid());

        for (ticker, data) in statements {
            tx.execute(
                "INSERT INTO cash_flows_statements (report_id, ticker_symbol, data)
                 VALUES (?1, ?2, ?3)",
                params![id.0, ticker.as_str(), data],
            )
            .map_err(store_err)?;
        }

        tx.commit().map_err(store_err)?;
        debug!(report_id = %id, "Stored report");

        Ok(Report::new(id, created_at).with_statements(
            statements
                .iter()
                .map(|(ticker, data)| CashFlowsStatement::new(id, ticker.clone(), data.clone()))
                .collect(),
        ))
    }

    #[instrument(skip(self))]
    async fn get_report(&self, id: ReportId) -> Result<Option<Report>> {
        let conn = self.conn.lock().map_err(store_err)?;

        let created_at = conn
            .query_row(
                "SELECT created_at FROM reports WHERE id = ?1",
                params![id.0],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(store_err)?;

        match created_at {
            Some(created_at) => {
                let statements = Self::load_statements(&conn, id)?;
                debug!("Found report with {} statements", statements.len());
                Ok(Some(
                    Report::new(id, Self::parse_timestamp(&created_at)?)
                        .with_statements(statements),
                ))
            }
            None => {
                debug!("No report found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn get_statement(
        &self,
        id: ReportId,
        ticker: &TickerSymbol,
    ) -> Result<Option<CashFlowsStatement>> {
        let conn = self.conn.lock().map_err(store_err)?;

        let data = conn
            .query_row(
                "SELECT data FROM cash_flows_statements
                 WHERE report_id = ?1 AND ticker_symbol = ?2",
                params![id.0, ticker.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(store_err)?;

        Ok(data.map(|data| CashFlowsStatement::new(id, ticker.clone(), data)))
    }

    #[instrument(skip(self))]
    async fn list_reports(&self) -> Result<Vec<Report>> {
        let conn = self.conn.lock().map_err(store_err)?;

        let mut stmt = conn
            .prepare("SELECT id, created_at FROM reports ORDER BY id DESC")
            .map_err(store_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(store_err)?;

        let mut reports = Vec::new();
        for row in rows {
            let (id, created_at) = row.map_err(store_err)?;
            reports.push(Report::new(ReportId(id), Self::parse_timestamp(&created_at)?));
        }
        Ok(reports)
    }

    #[instrument(skip(self))]
    async fn delete_report(&self, id: ReportId) -> Result<bool> {
        let conn = self.conn.lock().map_err(store_err)?;

        let deleted = conn
            .execute("DELETE FROM reports WHERE id = ?1", params![id.0])
            .map_err(store_err)?;

        if deleted > 0 {
            debug!(report_id = %id, "Deleted report");
        }
        Ok(deleted > 0)
    }
}
