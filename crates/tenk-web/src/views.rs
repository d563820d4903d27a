//! Embedded templates.

use serde::Serialize;
use tenk::{Report, ReportId};
use tera::{Context, Tera};

use crate::error::AppError;

/// Submission form page.
pub const CREATE_REPORT: &str = "create_report.html";
/// Report summary page.
pub const REPORT: &str = "report.html";
/// Statement detail page.
pub const DETAIL: &str = "detail.html";

/// Template set compiled into the binary.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Parses the embedded templates.
    ///
    /// # Errors
    /// Returns an error if a template does not compile.
    pub fn new() -> Result<Self, AppError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            (CREATE_REPORT, include_str!("../templates/create_report.html")),
            (REPORT, include_str!("../templates/report.html")),
            (DETAIL, include_str!("../templates/detail.html")),
        ])?;
        Ok(Self { tera })
    }

    /// Renders `name` with `context`.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, AppError> {
        Ok(self.tera.render(name, context)?)
    }
}

/// Row of the previous reports list.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    /// Report id.
    pub id: ReportId,
    /// Creation time, formatted for display.
    pub created_at: String,
}

impl From<&Report> for ReportSummary {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id,
            created_at: display_time(report),
        }
    }
}

/// Creation time of `report` as shown on every page.
pub fn display_time(report: &Report) -> String {
    report.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
