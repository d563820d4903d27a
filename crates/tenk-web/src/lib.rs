#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tenk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tenk::ReportService;
use tower_http::trace::TraceLayer;

/// Command line and environment configuration.
pub mod config;
/// Request-level error type.
pub mod error;
/// Request handlers.
pub mod routes;
/// Embedded templates.
pub mod views;

pub use config::Cli;
pub use error::AppError;
pub use views::Templates;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Extraction and persistence.
    pub service: Arc<ReportService>,
    /// Compiled page templates.
    pub templates: Arc<Templates>,
}

impl AppState {
    /// Wraps `service` and compiles the templates.
    ///
    /// # Errors
    /// Returns an error if a template does not compile.
    pub fn new(service: ReportService) -> Result<Self, AppError> {
        Ok(Self {
            service: Arc::new(service),
            templates: Arc::new(Templates::new()?),
        })
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(routes::create_report_form).post(routes::create_report),
        )
        .route("/report/:pk/", get(routes::view_report))
        .route(
            "/report/:pk/statement/:ticker_symbol/",
            get(routes::view_statement),
        )
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
