// src/services/identity.rs

//! Stable posting identifiers.

use sha2::{Digest, Sha256};

/// Derive the posting id from its absolute URL: lowercase hex SHA-256.
pub fn assign(absolute_url: &str) -> String {
    hex::encode(Sha256::digest(absolute_url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_is_deterministic() {
        let url = "https://recruitment.nic.in/notice.pdf";
        assert_eq!(assign(url), assign(url));
    }

    #[test]
    fn test_assign_is_fixed_width_hex() {
        let id = assign("https://recruitment.nic.in/index_new.php");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_assign_distinguishes_urls() {
        assert_ne!(
            assign("https://recruitment.nic.in/a.pdf"),
            assign("https://recruitment.nic.in/b.pdf")
        );
    }
}
