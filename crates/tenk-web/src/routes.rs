//! Request handlers.

use axum::extract::{Form, Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tenk::{FAILED_RETRIEVING_DATA, ReportId, TickerFailure, TickerList, TickerSymbol};
use tera::Context;
use tracing::{debug, info};

use crate::AppState;
use crate::error::AppError;
use crate::views::{self, ReportSummary};

/// Error shown when the form is submitted without any ticker.
pub const FIELD_REQUIRED: &str = "This field is required.";

/// Body of `POST /`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportForm {
    /// Newline-separated ticker symbols.
    #[serde(default)]
    pub ticker_symbols: String,
}

/// Query string of the report page.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Comma-separated tickers whose extraction failed.
    pub failed: Option<String>,
}

pub(crate) async fn create_report_form(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    render_form(&state, "", &[]).await
}

pub(crate) async fn create_report(
    State(state): State<AppState>,
    Form(form): Form<ReportForm>,
) -> Result<Response, AppError> {
    let list = TickerList::parse(&form.ticker_symbols);

    if list.is_empty() {
        let errors = [FIELD_REQUIRED.to_string()];
        return Ok(render_form(&state, &form.ticker_symbols, &errors)
            .await?
            .into_response());
    }
    if !list.rejected.is_empty() {
        debug!(rejected = list.rejected.len(), "Invalid entries in ticker list");
    }

    let submission = state.service.submit_list(&list).await?;
    let location = report_location(submission.report.id, &submission.failures);
    info!(report_id = %submission.report.id, %location, "Redirecting to report");

    Ok(Redirect::to(&location).into_response())
}

pub(crate) async fn view_report(
    State(state): State<AppState>,
    Path(pk): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Html<String>, AppError> {
    let id = parse_report_id(&pk)?;
    let report = state.service.report(id).await?.ok_or(AppError::NotFound)?;

    let tickers: Vec<&str> = report.tickers().map(TickerSymbol::as_str).collect();
    let failures: Vec<TickerSymbol> = query
        .failed
        .as_deref()
        .map(parse_failed)
        .unwrap_or_default();

    let mut context = Context::new();
    context.insert("report_id", &report.id);
    context.insert("created_at", &views::display_time(&report));
    context.insert("tickers", &tickers);
    context.insert("failures", &failures);
    context.insert("failure_message", FAILED_RETRIEVING_DATA);

    Ok(Html(state.templates.render(views::REPORT, &context)?))
}

pub(crate) async fn view_statement(
    State(state): State<AppState>,
    Path((pk, ticker_symbol)): Path<(String, String)>,
) -> Result<Html<String>, AppError> {
    let id = parse_report_id(&pk)?;
    let ticker = TickerSymbol::new(ticker_symbol);
    let statement = state
        .service
        .statement(id, &ticker)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut context = Context::new();
    context.insert("report_id", &statement.report_id);
    context.insert("ticker_symbol", &statement.ticker_symbol);
    context.insert("data", &statement.data);

    Ok(Html(state.templates.render(views::DETAIL, &context)?))
}

pub(crate) async fn not_found() -> AppError {
    AppError::NotFound
}

async fn render_form(
    state: &AppState,
    ticker_symbols: &str,
    errors: &[String],
) -> Result<Html<String>, AppError> {
    let reports: Vec<ReportSummary> = state
        .service
        .reports()
        .await?
        .iter()
        .map(ReportSummary::from)
        .collect();

    let mut context = Context::new();
    context.insert("ticker_symbols", ticker_symbols);
    context.insert("errors", errors);
    context.insert("reports", &reports);

    Ok(Html(state.templates.render(views::CREATE_REPORT, &context)?))
}

fn parse_report_id(pk: &str) -> Result<ReportId, AppError> {
    pk.parse().map_err(|_| AppError::NotFound)
}

/// Rejected entries may hold any character, so each one is percent-encoded.
fn report_location(id: ReportId, failures: &[TickerFailure]) -> String {
    if failures.is_empty() {
        return format!("/report/{id}/");
    }
    let failed: Vec<_> = failures
        .iter()
        .map(|f| urlencoding::encode(f.ticker.as_str()))
        .collect();
    format!("/report/{id}/?failed={}", failed.join(","))
}

fn parse_failed(failed: &str) -> Vec<TickerSymbol> {
    failed
        .split(',')
        .map(TickerSymbol::new)
        .filter(|t| !t.as_str().is_empty())
        .collect()
}
