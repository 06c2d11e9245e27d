// src/services/extract.rs

//! Anchor extraction.
//!
//! Turns a fetched document into `(absolute_url, text)` candidates.

use scraper::{Html, Selector};
use url::Url;

use crate::models::Candidate;
use crate::services::fetcher::Document;
use crate::utils::resolve_url;

const ANCHOR_SELECTOR: &str = "a[href]";
const BASE_SELECTOR: &str = "base[href]";

/// Extract every anchor with a non-empty href and non-blank text.
pub fn extract_candidates(document: &Document) -> Vec<Candidate> {
    let html = Html::parse_document(&document.body);
    let base = effective_base(&html, &document.base_url);

    // Both selectors are static and known to parse.
    let Ok(anchor_sel) = Selector::parse(ANCHOR_SELECTOR) else {
        return Vec::new();
    };

    let mut candidates = Vec::new();
    for anchor in html.select(&anchor_sel) {
        let href = anchor.value().attr("href").unwrap_or("").trim();
        let text: String = anchor.text().collect();
        let text = text.trim();

        if href.is_empty() || text.is_empty() {
            continue;
        }

        match resolve_url(&base, href) {
            Some(link) => candidates.push(Candidate::new(link, text)),
            None => log::debug!("Skipping unresolvable href {href:?}"),
        }
    }

    log::info!(
        "Found {} candidate links on {}",
        candidates.len(),
        document.base_url
    );
    candidates
}

/// Base URL for relative links: `<base href>` if present, else the response URL.
fn effective_base(html: &Html, response_url: &Url) -> Url {
    let Ok(base_sel) = Selector::parse(BASE_SELECTOR) else {
        return response_url.clone();
    };

    html.select(&base_sel)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| response_url.join(href.trim()).ok())
        .unwrap_or_else(|| response_url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(body: &str) -> Document {
        Document {
            base_url: Url::parse("https://recruitment.nic.in/index_new.php").unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_relative_href_resolves_against_page() {
        let doc = document(r#"<html><body><a href="/notice.pdf">Notice</a></body></html>"#);
        let candidates = extract_candidates(&doc);

        assert_eq!(
            candidates,
            vec![Candidate::new("https://recruitment.nic.in/notice.pdf", "Notice")]
        );
    }

    #[test]
    fn test_empty_href_or_text_is_dropped() {
        let doc = document(
            r#"<html><body>
                <a href="">Apply</a>
                <a href="/notice.pdf">   </a>
                <a>No href</a>
                <a href="/ok.pdf"> Keep me </a>
            </body></html>"#,
        );
        let candidates = extract_candidates(&doc);

        assert_eq!(
            candidates,
            vec![Candidate::new("https://recruitment.nic.in/ok.pdf", "Keep me")]
        );
    }

    #[test]
    fn test_nested_text_is_collected() {
        let doc = document(r#"<a href="jobs/1.html"><span>Scientist</span> <b>B</b></a>"#);
        let candidates = extract_candidates(&doc);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Scientist B");
        assert_eq!(candidates[0].link, "https://recruitment.nic.in/jobs/1.html");
    }

    #[test]
    fn test_base_element_overrides_response_url() {
        let doc = document(
            r#"<html><head><base href="https://cdn.nic.in/files/"></head>
               <body><a href="advt.pdf">Advertisement</a></body></html>"#,
        );
        let candidates = extract_candidates(&doc);

        assert_eq!(candidates[0].link, "https://cdn.nic.in/files/advt.pdf");
    }

    #[test]
    fn test_absolute_href_kept() {
        let doc = document(r#"<a href="https://other.gov.in/x">Other</a>"#);
        assert_eq!(extract_candidates(&doc)[0].link, "https://other.gov.in/x");
    }
}
