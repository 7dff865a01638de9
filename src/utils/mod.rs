//! Utility functions and helpers.

pub mod http;
pub mod log;

use sha2::{Digest, Sha256};

/// Collapse whitespace runs to single spaces and trim.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// First 12 hex chars of the SHA-256 of `s`.
pub fn short_digest(s: &str) -> String {
    let hash = Sha256::digest(s.as_bytes());
    hex::encode(&hash[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Main\n\t  Street  5 "), "Main Street 5");
        assert_eq!(clean_text("\u{a0}"), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("A & B <C>"), "A &amp; B &lt;C&gt;");
    }

    #[test]
    fn test_short_digest_is_stable() {
        assert_eq!(short_digest("abc"), "ba7816bf8f01");
        assert_eq!(short_digest("abc"), short_digest("abc"));
    }
}
