//! Common, precompiled regex patterns for indicator shapes.
//!
//! Every pattern is anchored and bounded. The `regex` crate compiles to
//! finite automata, so matching is linear in the input and adversarial
//! repetition cannot trigger backtracking. Semantic validation (octet
//! ranges, checksums, TLD tables) happens after the shape matches.

use once_cell::sync::Lazy;
use regex::Regex;

// hxxp, HXXPS, h[xx]p, h[XX]ps ...
pub static RE_HXXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)h(?:xx|\[xx\])p(s?)").expect("valid hxxp regex"));

// scheme://authority[/path?query#fragment]; scheme checked against config
pub static RE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]{0,15})://([^\s/?#]+)(?:[/?#]\S*)?$")
        .expect("valid URL regex")
});

pub static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+\-]{1,64}@([a-z0-9.\-]{1,253}\.[a-z]{2,63})$")
        .expect("valid email regex")
});

pub static RE_CVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^CVE-[0-9]{4}-[0-9]{4,}$").expect("valid CVE regex"));

pub static RE_MITRE_TECHNIQUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^T[0-9]{4}(?:\.[0-9]{3})?$").expect("valid MITRE regex"));

// One separator style per address: colon, hyphen, or Cisco dotted triplets
pub static RE_MAC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:[0-9a-f]{2}(?::[0-9a-f]{2}){5}|[0-9a-f]{2}(?:-[0-9a-f]{2}){5}|[0-9a-f]{4}\.[0-9a-f]{4}\.[0-9a-f]{4})$",
    )
    .expect("valid MAC regex")
});

pub static RE_BTC_LEGACY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[13][1-9A-HJ-NP-Za-km-z]{25,34}$").expect("valid bitcoin legacy regex")
});

pub static RE_BTC_SEGWIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^bc1[ac-hj-np-z02-9]{11,71}$").expect("valid bitcoin segwit regex")
});

pub static RE_ETHEREUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid ethereum regex"));

pub static RE_ASN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^ASN?([0-9]{1,10})$").expect("valid ASN regex"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hxxp_variants() {
        for s in ["hxxp", "HXXP", "hXxP", "h[xx]p", "h[XX]ps"] {
            assert!(RE_HXXP.is_match(s), "{s}");
        }
        assert!(!RE_HXXP.is_match("http"));
    }

    #[test]
    fn url_captures_scheme_and_authority() {
        let caps = RE_URL.captures("https://evil.com:8443/a?b=c").unwrap();
        assert_eq!(&caps[1], "https");
        assert_eq!(&caps[2], "evil.com:8443");
        assert!(!RE_URL.is_match("https:///path"));
        assert!(!RE_URL.is_match("https://a b"));
    }

    #[test]
    fn mac_requires_consistent_separator() {
        assert!(RE_MAC.is_match("00:1A:2b:3c:4D:5e"));
        assert!(RE_MAC.is_match("00-1a-2b-3c-4d-5e"));
        assert!(RE_MAC.is_match("001a.2b3c.4d5e"));
        assert!(!RE_MAC.is_match("00:1a-2b:3c-4d:5e"));
        assert!(!RE_MAC.is_match("00:1a:2b:3c:4d"));
    }

    #[test]
    fn asn_captures_digits() {
        assert_eq!(&RE_ASN.captures("AS15169").unwrap()[1], "15169");
        assert_eq!(&RE_ASN.captures("asn13335").unwrap()[1], "13335");
        assert!(!RE_ASN.is_match("AS"));
        assert!(!RE_ASN.is_match("AS 15169"));
    }
}
