//! Table extractor: filing URL + report id → the report's `<table>`.

use scraper::Selector;
use tenk_core::{Result, TenkError};
use tracing::debug;

use crate::fetch::Fetcher;
use crate::markup::Element;
use crate::resolver::parse_html;

/// Builds the report page URL by replacing the last path segment of
/// `filing_url` with `<REPORT_ID>.htm`.
///
/// # Errors
/// Returns [`TenkError::InvalidParameter`] if `filing_url` has no `/`.
///
/// # Example
/// ```
/// use tenk_edgar::report_url;
///
/// let url = report_url("https://x/Archives/edgar/data/1/abc-20200101.htm", "r7").unwrap();
/// assert_eq!(url, "https://x/Archives/edgar/data/1/R7.htm");
/// ```
pub fn report_url(filing_url: &str, report_id: &str) -> Result<String> {
    let (base, _) = filing_url.rsplit_once('/').ok_or_else(|| {
        TenkError::InvalidParameter(format!("Filing URL has no path: {filing_url}"))
    })?;
    Ok(format!("{}/{}.htm", base, report_id.to_uppercase()))
}

/// Fetches a report page and returns an owned copy of its report table.
///
/// # Errors
/// Network faults from the fetcher, [`TenkError::Parse`] for an empty
/// document and [`TenkError::Lookup`] when no report table exists.
pub async fn extract_table<F: Fetcher + ?Sized>(fetcher: &F, url: &str) -> Result<Element> {
    let body = fetcher.get(url, &[]).await?;
    let table = parse_report_table(&body, url)?;
    debug!(url, "Extracted report table");
    Ok(table)
}

/// Selects the first `table` whose `class` attribute is exactly `report`.
///
/// # Errors
/// See [`extract_table`].
pub fn parse_report_table(body: &[u8], url: &str) -> Result<Element> {
    let doc = parse_html(body)
        .ok_or_else(|| TenkError::Parse(format!("cannot parse report page: {url}")))?;

    let table_sel = Selector::parse(r#"table[class="report"]"#)
        .map_err(|e| TenkError::Parse(format!("invalid selector: {e:?}")))?;

    doc.select(&table_sel)
        .next()
        .map(Element::from_parsed)
        .ok_or_else(|| TenkError::Lookup(format!("no report table at {url}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.sec.gov/Archives/edgar/data/320193/000032019323000106/R7.htm";

    #[test]
    fn test_report_url_uppercases_id() {
        assert_eq!(
            report_url("https://x/Archives/edgar/data/1/abc-20200101.htm", "r7").unwrap(),
            "https://x/Archives/edgar/data/1/R7.htm"
        );
        assert_eq!(
            report_url("https://x/Archives/edgar/data/1/abc-20200101.htm", "R12").unwrap(),
            "https://x/Archives/edgar/data/1/R12.htm"
        );
        assert!(report_url("no-slashes", "r7").is_err());
    }

    #[test]
    fn test_exact_class_match() {
        let body = r#"<html><body>
<table class="authRefData"><tr><td>ref</td></tr></table>
<table class="report wide"><tr><td>wide</td></tr></table>
<table class="report" border="0"><tr><td>cash</td></tr></table>
</body></html>"#;
        let table = parse_report_table(body.as_bytes(), URL).unwrap();
        assert_eq!(table.name, "table");
        assert_eq!(table.attr("border"), Some("0"));
        assert_eq!(table.attr("class"), Some("report"));
        assert!(
            table
                .to_markup()
                .ends_with("<tbody><tr><td>cash</td></tr></tbody></table>")
        );
    }

    #[test]
    fn test_missing_table_is_lookup_error() {
        let err = parse_report_table(b"<html><body><p>gone</p></body></html>", URL).unwrap_err();
        assert_eq!(err, TenkError::Lookup(format!("no report table at {URL}")));
    }

    #[test]
    fn test_empty_page_is_parse_error() {
        let err = parse_report_table(b"", URL).unwrap_err();
        assert!(matches!(err, TenkError::Parse(_)));
    }
}
