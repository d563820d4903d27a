//! Filing locator: ticker → most recent 10-K filing entry.

use quick_xml::Reader;
use quick_xml::events::Event;
use tenk_core::{Result, TenkError, TickerSymbol};
use tracing::debug;

use crate::fetch::Fetcher;

/// SEC EDGAR company filings index.
pub const FILING_INDEX_URL: &str = "https://www.sec.gov/cgi-bin/browse-edgar";

/// Form type requested from the filings index.
pub const ANNUAL_FORM_TYPE: &str = "10-K";

/// One `<filing>` entry of the filings index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilingEntry {
    /// URL of the filing document index.
    pub filing_url: String,
    /// URL of the filing's XBRL viewer.
    pub xbrl_url: String,
}

#[derive(Clone, Copy)]
enum Field {
    FilingHref,
    XbrlRef,
}

/// Query parameters of the filings index request for a ticker.
#[must_use]
pub fn index_query(ticker: &TickerSymbol) -> [(&str, &str); 4] {
    [
        ("action", "getcompany"),
        ("CIK", ticker.as_str()),
        ("type", ANNUAL_FORM_TYPE),
        ("output", "xml"),
    ]
}

/// Fetches the filings index for `ticker` and returns its first filing entry.
///
/// # Errors
/// Network faults from the fetcher, or [`TenkError::Lookup`] when the index
/// has no usable filing entry.
pub async fn locate_filing<F: Fetcher + ?Sized>(
    fetcher: &F,
    ticker: &TickerSymbol,
) -> Result<FilingEntry> {
    let body = fetcher.get(FILING_INDEX_URL, &index_query(ticker)).await?;
    let entry = parse_filing_index(&body, ticker)?;
    debug!(ticker = %ticker, filing_url = %entry.filing_url, "Located 10-K filing");
    Ok(entry)
}

/// Extracts the first `<filing>` entry of a filings index document.
///
/// Element names are matched case-insensitively. A body that is not
/// well-formed XML is treated the same as one without filings.
///
/// # Errors
/// Returns [`TenkError::Lookup`] if no filing is found or the first filing
/// lacks its `filingHREF` or `XBRLREF` child.
pub fn parse_filing_index(body: &[u8], ticker: &TickerSymbol) -> Result<FilingEntry> {
    let not_found = || TenkError::Lookup(format!("no 10-K filing found for {ticker}"));

    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_filing = false;
    let mut field: Option<Field> = None;
    let mut filing_url: Option<String> = None;
    let mut xbrl_url: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                let name = name.as_ref();
                if !in_filing {
                    in_filing = name.eq_ignore_ascii_case(b"filing");
                } else if name.eq_ignore_ascii_case(b"filinghref") {
                    field = Some(Field::FilingHref);
                } else if name.eq_ignore_ascii_case(b"xbrlref") {
                    field = Some(Field::XbrlRef);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(f) = field {
                    let text = e.unescape().map_err(|_| not_found())?;
                    let target = match f {
                        Field::FilingHref => &mut filing_url,
                        Field::XbrlRef => &mut xbrl_url,
                    };
                    // Text split by comments arrives as several events.
                    target.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Ok(Event::End(e)) => {
                field = None;
                if in_filing && e.local_name().as_ref().eq_ignore_ascii_case(b"filing") {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!(ticker = %ticker, error = %e, "Filings index is not well-formed XML");
                return Err(not_found());
            }
            _ => {}
        }
        buf.clear();
    }

    if !in_filing {
        return Err(not_found());
    }

    let filing_url = filing_url.ok_or_else(|| {
        TenkError::Lookup(format!("filing entry for {ticker} has no filingHREF"))
    })?;
    let xbrl_url = xbrl_url
        .ok_or_else(|| TenkError::Lookup(format!("filing entry for {ticker} has no XBRLREF")))?;

    Ok(FilingEntry {
        filing_url,
        xbrl_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<companyFilings>
  <companyInfo>
    <CIK>0000320193</CIK>
    <name>Apple Inc.</name>
  </companyInfo>
  <results>
    <filing>
      <dateFiled>2023-11-03</dateFiled>
      <filingHREF>https://www.sec.gov/Archives/edgar/data/320193/000032019323000106/0000320193-23-000106-index.htm</filingHREF>
      <formName>Annual report [Section 13 and 15(d), not S-K Item 405]</formName>
      <type>10-K</type>
      <XBRLREF>https://www.sec.gov/cgi-bin/viewer?action=view&amp;cik=320193&amp;accession_number=0000320193-23-000106&amp;xbrl_type=v</XBRLREF>
    </filing>
    <filing>
      <dateFiled>2022-10-28</dateFiled>
      <filingHREF>https://www.sec.gov/Archives/edgar/data/320193/000032019322000108/0000320193-22-000108-index.htm</filingHREF>
      <type>10-K</type>
      <XBRLREF>https://www.sec.gov/cgi-bin/viewer?action=view&amp;cik=320193&amp;accession_number=0000320193-22-000108&amp;xbrl_type=v</XBRLREF>
    </filing>
  </results>
</companyFilings>"#;

    fn ticker() -> TickerSymbol {
        TickerSymbol::new("AAPL")
    }

    #[test]
    fn test_first_filing_is_selected() {
        let entry = parse_filing_index(INDEX.as_bytes(), &ticker()).unwrap();
        assert_eq!(
            entry.filing_url,
            "https://www.sec.gov/Archives/edgar/data/320193/000032019323000106/0000320193-23-000106-index.htm"
        );
        assert_eq!(
            entry.xbrl_url,
            "https://www.sec.gov/cgi-bin/viewer?action=view&cik=320193&accession_number=0000320193-23-000106&xbrl_type=v"
        );
    }

    #[test]
    fn test_element_names_are_case_insensitive() {
        let body = "<results><FILING><filinghref>https://x/a/b.htm</filinghref><xbrlref>https://x/v</xbrlref></FILING></results>";
        let entry = parse_filing_index(body.as_bytes(), &ticker()).unwrap();
        assert_eq!(entry.filing_url, "https://x/a/b.htm");
        assert_eq!(entry.xbrl_url, "https://x/v");
    }

    #[test]
    fn test_no_filing_is_lookup_error() {
        let body = "<companyFilings><results></results></companyFilings>";
        let err = parse_filing_index(body.as_bytes(), &ticker()).unwrap_err();
        assert_eq!(
            err,
            TenkError::Lookup("no 10-K filing found for AAPL".to_string())
        );
    }

    #[test]
    fn test_malformed_body_is_lookup_error() {
        let body = "<html><body><h1>No matching Ticker Symbol.</h2></body></html>";
        let err = parse_filing_index(body.as_bytes(), &ticker()).unwrap_err();
        assert!(matches!(err, TenkError::Lookup(_)));

        let err = parse_filing_index(b"", &ticker()).unwrap_err();
        assert!(matches!(err, TenkError::Lookup(_)));
    }

    #[test]
    fn test_filing_without_xbrl_is_lookup_error() {
        let body = "<results><filing><filingHREF>https://x/a/b.htm</filingHREF></filing></results>";
        let err = parse_filing_index(body.as_bytes(), &ticker()).unwrap_err();
        assert_eq!(
            err,
            TenkError::Lookup("filing entry for AAPL has no XBRLREF".to_string())
        );
    }

    #[test]
    fn test_split_text_is_joined() {
        let body = "<results><filing>\
<filingHREF>https://x/a<!-- c -->/b.htm</filingHREF>\
<XBRLREF>https://x/viewer?a=1&amp;<!-- c -->b=2</XBRLREF>\
</filing></results>";
        let entry = parse_filing_index(body.as_bytes(), &ticker()).unwrap();
        assert_eq!(entry.filing_url, "https://x/a/b.htm");
        assert_eq!(entry.xbrl_url, "https://x/viewer?a=1&b=2");
    }

    #[test]
    fn test_index_query() {
        let ticker = TickerSymbol::new("msft");
        let query = index_query(&ticker);
        assert!(query.contains(&("CIK", "MSFT")));
        assert!(query.contains(&("type", "10-K")));
        assert!(query.contains(&("output", "xml")));
    }
}
