//! Request-level error type.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tenk::TenkError;
use thiserror::Error;
use tracing::error;

const NOT_FOUND_PAGE: &str = "<!DOCTYPE html><html><head><title>Not Found</title></head>\
<body><h1>Not Found</h1><p>The requested resource was not found on this server.</p></body></html>";

const SERVER_ERROR_PAGE: &str = "<!DOCTYPE html><html><head><title>Server Error</title></head>\
<body><h1>Server Error (500)</h1></body></html>";

/// Errors raised while serving a request or starting the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown report, unknown statement or unparseable path.
    #[error("Not found")]
    NotFound,

    /// Store or service failure.
    #[error(transparent)]
    Tenk(#[from] TenkError),

    /// Template loading or rendering failure.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Socket failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response(),
            other => {
                error!(error = %other, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
            }
        }
    }
}
