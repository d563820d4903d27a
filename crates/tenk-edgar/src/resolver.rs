//! Report resolver: XBRL viewer → report id of the cash flows statement.

use scraper::{ElementRef, Html, Selector};
use tenk_core::{Result, TenkError};
use tracing::debug;

use crate::fetch::Fetcher;

/// Id of the anchor heading the "Financial Statements" menu category.
pub const STATEMENTS_MENU_ANCHOR_ID: &str = "menu_cat2";

/// Label fragment identifying the cash flows statement (case-insensitive).
pub const CASH_FLOWS_LABEL: &str = "cash flows";

/// Fetches the viewer at `xbrl_url` and returns the id of its cash flows
/// report, e.g. `r7`.
///
/// # Errors
/// Network faults from the fetcher, [`TenkError::Parse`] for an empty
/// document and [`TenkError::Lookup`] when the menu or entry is missing.
pub async fn resolve_report_id<F: Fetcher + ?Sized>(fetcher: &F, xbrl_url: &str) -> Result<String> {
    let body = fetcher.get(xbrl_url, &[]).await?;
    let report_id = parse_report_id(&body, xbrl_url)?;
    debug!(xbrl_url, report_id = %report_id, "Resolved cash flows report");
    Ok(report_id)
}

/// Finds the cash flows entry of a viewer page's statements menu.
///
/// The menu is the parent of `<a id="menu_cat2">`; its `ul > li` children are
/// scanned in order and the first whose `a` label contains "cash flows"
/// (ignoring case) wins.
///
/// # Errors
/// See [`resolve_report_id`].
pub fn parse_report_id(body: &[u8], xbrl_url: &str) -> Result<String> {
    let doc = parse_html(body)
        .ok_or_else(|| TenkError::Parse(format!("invalid viewer URL: {xbrl_url}")))?;

    let anchor_sel = Selector::parse(&format!(r#"a[id="{STATEMENTS_MENU_ANCHOR_ID}"]"#))
        .map_err(|e| TenkError::Parse(format!("invalid selector: {e:?}")))?;

    let menu = doc
        .select(&anchor_sel)
        .next()
        .and_then(|anchor| anchor.parent())
        .and_then(ElementRef::wrap)
        .ok_or_else(|| {
            TenkError::Lookup(format!("no financial statements menu at {xbrl_url}"))
        })?;

    let entry = child_elements(menu, "ul")
        .flat_map(|ul| child_elements(ul, "li"))
        .find(|li| {
            child_elements(*li, "a").any(|a| {
                a.text()
                    .collect::<String>()
                    .to_lowercase()
                    .contains(CASH_FLOWS_LABEL)
            })
        })
        .ok_or_else(|| {
            TenkError::Lookup(format!("no cash-flows statement found at {xbrl_url}"))
        })?;

    entry
        .value()
        .id()
        .map(str::to_string)
        .ok_or_else(|| {
            TenkError::Lookup(format!("cash-flows menu entry at {xbrl_url} has no id"))
        })
}

/// Parses an HTML document. Returns `None` for an empty (or whitespace-only)
/// body, the only input the HTML parser cannot make a document of.
pub(crate) fn parse_html(body: &[u8]) -> Option<Html> {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        return None;
    }
    Some(Html::parse_document(&text))
}

/// Direct element children of `parent` with tag `name`.
pub(crate) fn child_elements<'a>(
    parent: ElementRef<'a>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == name)
}
