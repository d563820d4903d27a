//! Command line and environment configuration.

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tenk::{InMemoryStore, ReportStore, Result, SqliteStore};

/// Database path that selects the in-memory store.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "tenk-web", version, about = "Cash flows statements from 10-K filings")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "TENK_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// SQLite database path, or ":memory:" for a non-persistent store
    #[arg(long, env = "TENK_DATABASE", default_value = "tenk.db")]
    pub database: String,

    /// User agent sent to SEC EDGAR ("AppName/Version (contact@email.com)")
    #[arg(
        long,
        env = "TENK_USER_AGENT",
        default_value = "tenk/0.1 (admin@example.com)"
    )]
    pub user_agent: String,

    /// Number of tickers processed at once
    #[arg(long, env = "TENK_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for the verbosity level.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Opens the configured report store.
    ///
    /// # Errors
    /// Returns an error if the SQLite database cannot be opened.
    pub fn open_store(&self) -> Result<Arc<dyn ReportStore>> {
        if self.database == IN_MEMORY_DATABASE {
            Ok(Arc::new(InMemoryStore::new()))
        } else {
            Ok(Arc::new(SqliteStore::new(&self.database)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "tenk-web",
            "--bind",
            "0.0.0.0:9000",
            "--database",
            ":memory:",
            "--concurrency",
            "4",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.bind.port(), 9000);
        assert_eq!(cli.database, IN_MEMORY_DATABASE);
        assert_eq!(cli.concurrency, 4);
        assert_eq!(cli.log_level(), "trace");
    }

    #[test]
    fn test_rejects_bad_bind_address() {
        assert!(Cli::try_parse_from(["tenk-web", "--bind", "localhost"]).is_err());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let cli = Cli::try_parse_from(["tenk-web", "--database", ":memory:"]).unwrap();
        let store = cli.open_store().unwrap();

        let report = store.create_report(&BTreeMap::new()).await.unwrap();
        assert!(store.get_report(report.id).await.unwrap().is_some());
    }
}
