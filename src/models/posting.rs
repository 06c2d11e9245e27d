//! Posting data structures.

use serde::{Deserialize, Serialize};

use crate::models::SiteConfig;
use crate::services::identity;

/// A raw `(link, text)` pair pulled from a page, link already absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub link: String,
    pub text: String,
}

impl Candidate {
    pub fn new(link: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            text: text.into(),
        }
    }
}

/// A validated job listing with an assigned identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    /// Digest of `url`
    pub id: String,

    /// Anchor text, trimmed
    pub title: String,

    pub department: String,

    pub location: String,

    /// Absolute URL of the posting
    pub url: String,

    /// Date the crawl ran (`YYYY-MM-DD`)
    #[serde(rename = "date")]
    pub observed_date: String,
}

impl Posting {
    /// Build a posting from a candidate, or `None` if title or URL is blank.
    pub fn from_candidate(
        candidate: &Candidate,
        site: &SiteConfig,
        observed_date: &str,
    ) -> Option<Self> {
        let title = candidate.text.trim();
        let url = candidate.link.trim();
        if title.is_empty() || url.is_empty() {
            return None;
        }

        Some(Self {
            id: identity::assign(url),
            title: title.to_string(),
            department: site.department.clone(),
            location: site.location.clone(),
            url: url.to_string(),
            observed_date: observed_date.to_string(),
        })
    }
}

/// Persisted row of the `jobs` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub department: String,
    pub location: String,
    /// Epoch seconds of the run that last wrote this row
    pub posted_date: i64,
    pub url: String,
}

impl JobRecord {
    pub fn from_posting(posting: &Posting, posted_date: i64) -> Self {
        Self {
            id: posting.id.clone(),
            title: posting.title.clone(),
            department: posting.department.clone(),
            location: posting.location.clone(),
            posted_date,
            url: posting.url.clone(),
        }
    }
}

/// Raw output of a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobList {
    /// Epoch seconds
    pub last_updated: i64,
    pub jobs: Vec<Posting>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig::default()
    }

    #[test]
    fn test_from_candidate_trims_title() {
        let candidate = Candidate::new("https://recruitment.nic.in/notice.pdf", "  Scientist B \n");
        let posting = Posting::from_candidate(&candidate, &site(), "2026-10-17").unwrap();

        assert_eq!(posting.title, "Scientist B");
        assert_eq!(posting.department, "NIC");
        assert_eq!(posting.location, "All India");
        assert_eq!(posting.id, identity::assign("https://recruitment.nic.in/notice.pdf"));
    }

    #[test]
    fn test_from_candidate_rejects_blank_fields() {
        let no_link = Candidate::new("", "Apply");
        let no_text = Candidate::new("https://a.example/x", "   ");
        assert!(Posting::from_candidate(&no_link, &site(), "2026-10-17").is_none());
        assert!(Posting::from_candidate(&no_text, &site(), "2026-10-17").is_none());
    }

    #[test]
    fn test_observed_date_serializes_as_date() {
        let candidate = Candidate::new("https://recruitment.nic.in/a", "A");
        let posting = Posting::from_candidate(&candidate, &site(), "2026-10-17").unwrap();
        let json = serde_json::to_value(&posting).unwrap();

        assert_eq!(json["date"], "2026-10-17");
        assert!(json.get("observed_date").is_none());
    }

    #[test]
    fn test_record_copies_posting() {
        let candidate = Candidate::new("https://recruitment.nic.in/a", "A");
        let posting = Posting::from_candidate(&candidate, &site(), "2026-10-17").unwrap();
        let record = JobRecord::from_posting(&posting, 1_700_000_000);

        assert_eq!(record.id, posting.id);
        assert_eq!(record.url, posting.url);
        assert_eq!(record.posted_date, 1_700_000_000);
    }
}
