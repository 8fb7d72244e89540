//! Indicator classification as an ordered table of shape rules.
//!
//! Rules run in priority order and the first match wins. The order is what
//! resolves ambiguous tokens: a 40-character hex run is a hash before it can
//! be anything else, known file extensions beat the domain heuristic, and
//! MITRE technique IDs are tested before numeric address shapes.
//!
//! Predicates receive the trimmed, refanged token and never fail.

use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::trace;

use super::charset::{
    base58check_valid, distinct_chars, has_whitespace, is_digits, is_dns_label, is_hex,
    is_reserved_filename_char,
};
use super::config::ObservableConfig;
use super::patterns;
use super::types::{HashAlgorithm, IndicatorType, WalletKind};

/// Shape test over a canonical token.
pub type Predicate = fn(&Classifier, &str) -> bool;

/// One entry of the priority table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub kind: IndicatorType,
    pub name: &'static str,
    pub test: Predicate,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish()
    }
}

/// Classification priority; earlier rules shadow later ones.
pub const RULES: &[Rule] = &[
    Rule {
        kind: IndicatorType::Url,
        name: "url",
        test: Classifier::is_url,
    },
    Rule {
        kind: IndicatorType::EmailAddr,
        name: "email",
        test: Classifier::is_email,
    },
    Rule {
        kind: IndicatorType::Vulnerability,
        name: "cve",
        test: Classifier::is_cve,
    },
    Rule {
        kind: IndicatorType::AttackPattern,
        name: "mitre_technique",
        test: Classifier::is_attack_pattern,
    },
    Rule {
        kind: IndicatorType::FileHash,
        name: "file_hash",
        test: Classifier::is_file_hash,
    },
    Rule {
        kind: IndicatorType::FileName,
        name: "file_name",
        test: Classifier::is_file_name,
    },
    Rule {
        kind: IndicatorType::Ipv4Addr,
        name: "ipv4",
        test: Classifier::is_ipv4,
    },
    Rule {
        kind: IndicatorType::MacAddr,
        name: "mac",
        test: Classifier::is_mac,
    },
    Rule {
        kind: IndicatorType::Ipv6Addr,
        name: "ipv6",
        test: Classifier::is_ipv6,
    },
    Rule {
        kind: IndicatorType::CryptocurrencyWallet,
        name: "wallet",
        test: Classifier::is_wallet,
    },
    Rule {
        kind: IndicatorType::AutonomousSystem,
        name: "asn",
        test: Classifier::is_asn,
    },
    Rule {
        kind: IndicatorType::DomainName,
        name: "domain",
        test: Classifier::is_domain,
    },
    Rule {
        kind: IndicatorType::Hostname,
        name: "hostname",
        test: Classifier::is_hostname,
    },
];

fn lowered(items: &[String]) -> HashSet<String> {
    items.iter().map(|s| s.to_ascii_lowercase()).collect()
}

/// Split an optional `/prefix` suffix, checking it against `max`.
fn split_prefix(s: &str, max: u8) -> Option<&str> {
    match s.split_once('/') {
        None => Some(s),
        Some((addr, bits)) => {
            if !is_digits(bits) || bits.len() > 3 {
                return None;
            }
            match bits.parse::<u8>() {
                Ok(n) if n <= max => Some(addr),
                _ => None,
            }
        }
    }
}

/// Classification tables derived from an [`ObservableConfig`].
#[derive(Debug, Clone)]
pub struct Classifier {
    url_schemes: HashSet<String>,
    file_extensions: HashSet<String>,
    common_tlds: HashSet<String>,
    known_tlds: HashSet<String>,
    internal_suffixes: HashSet<String>,
    max_input_len: usize,
    reject_degenerate_hashes: bool,
    verify_wallet_checksums: bool,
}

impl Classifier {
    pub fn new(cfg: &ObservableConfig) -> Self {
        Self {
            url_schemes: lowered(&cfg.url_schemes),
            file_extensions: lowered(&cfg.file_extensions),
            common_tlds: lowered(&cfg.common_tlds),
            known_tlds: lowered(&cfg.known_tlds),
            internal_suffixes: lowered(&cfg.internal_suffixes),
            max_input_len: cfg.max_input_len,
            reject_degenerate_hashes: cfg.reject_degenerate_hashes,
            verify_wallet_checksums: cfg.verify_wallet_checksums,
        }
    }

    pub fn max_input_len(&self) -> usize {
        self.max_input_len
    }

    fn admissible(&self, token: &str) -> bool {
        !token.is_empty() && token.len() <= self.max_input_len && !has_whitespace(token)
    }

    /// First matching rule for a trimmed, refanged token.
    pub fn classify_canonical(&self, token: &str) -> Option<IndicatorType> {
        if !self.admissible(token) {
            return None;
        }
        let rule = RULES.iter().find(|rule| (rule.test)(self, token))?;
        trace!(rule = rule.name, kind = %rule.kind, "token classified");
        Some(rule.kind)
    }

    /// Every rule that accepts the token, in priority order.
    pub fn matching_canonical(&self, token: &str) -> Vec<IndicatorType> {
        if !self.admissible(token) {
            return Vec::new();
        }
        RULES
            .iter()
            .filter(|rule| (rule.test)(self, token))
            .map(|rule| rule.kind)
            .collect()
    }

    /// Host part of a URL authority: IPv4, bracketed IPv6, or DNS name.
    fn is_url_host(&self, authority: &str) -> bool {
        let hostport = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
        let (host, port) = if let Some(rest) = hostport.strip_prefix('[') {
            match rest.split_once(']') {
                Some((v6, tail)) => {
                    if v6.parse::<Ipv6Addr>().is_err() {
                        return false;
                    }
                    let port = match tail.strip_prefix(':') {
                        Some(p) => Some(p),
                        None if tail.is_empty() => None,
                        None => return false,
                    };
                    (None, port)
                }
                None => return false,
            }
        } else {
            match hostport.rsplit_once(':') {
                Some((h, p)) => (Some(h), Some(p)),
                None => (Some(hostport), None),
            }
        };
        if let Some(port) = port {
            if !is_digits(port) || port.parse::<u16>().is_err() {
                return false;
            }
        }
        match host {
            None => true,
            Some(h) => {
                h.parse::<Ipv4Addr>().is_ok()
                    || (!h.is_empty() && h.trim_end_matches('.').split('.').all(is_dns_label))
            }
        }
    }

    pub fn is_url(&self, token: &str) -> bool {
        let Some(caps) = patterns::RE_URL.captures(token) else {
            return false;
        };
        self.url_schemes.contains(&caps[1].to_ascii_lowercase()) && self.is_url_host(&caps[2])
    }

    pub fn is_email(&self, token: &str) -> bool {
        patterns::RE_EMAIL
            .captures(token)
            .is_some_and(|caps| caps[1].split('.').all(is_dns_label))
    }

    pub fn is_cve(&self, token: &str) -> bool {
        patterns::RE_CVE.is_match(token)
    }

    pub fn is_attack_pattern(&self, token: &str) -> bool {
        patterns::RE_MITRE_TECHNIQUE.is_match(token)
    }

    /// Digest algorithm for a hex run of exactly 32/40/64/128 characters.
    pub fn hash_algorithm(&self, token: &str) -> Option<HashAlgorithm> {
        let algo = HashAlgorithm::from_hex_len(token.len())?;
        if !is_hex(token) {
            return None;
        }
        // all-zero and similar padding runs are not digests
        if self.reject_degenerate_hashes && distinct_chars(token) < 4 {
            return None;
        }
        Some(algo)
    }

    pub fn is_file_hash(&self, token: &str) -> bool {
        self.hash_algorithm(token).is_some()
    }

    pub fn is_file_name(&self, token: &str) -> bool {
        let Some((name, ext)) = token.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        if !self.file_extensions.contains(&ext)
            || self.common_tlds.contains(&ext)
            || self.is_ambiguous_suffix(&ext)
        {
            return false;
        }
        !name.trim_matches('.').is_empty() && !name.chars().any(is_reserved_filename_char)
    }

    /// Listed both as an extension and as a TLD, without the common-TLD
    /// tie-break; neither the file rule nor the domain rule claims it.
    fn is_ambiguous_suffix(&self, suffix: &str) -> bool {
        self.file_extensions.contains(suffix)
            && self.known_tlds.contains(suffix)
            && !self.common_tlds.contains(suffix)
    }

    pub fn is_ipv4(&self, token: &str) -> bool {
        split_prefix(token, 32).is_some_and(|addr| addr.parse::<Ipv4Addr>().is_ok())
    }

    pub fn is_mac(&self, token: &str) -> bool {
        patterns::RE_MAC.is_match(token)
    }

    pub fn is_ipv6(&self, token: &str) -> bool {
        let inner = match token.strip_prefix('[') {
            Some(rest) => match rest.strip_suffix(']') {
                Some(inner) => inner,
                None => return false,
            },
            None => token,
        };
        let Some(addr) = split_prefix(inner, 128) else {
            return false;
        };
        let addr = match addr.split_once('%') {
            Some((a, zone)) => {
                if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return false;
                }
                a
            }
            None => addr,
        };
        addr.contains(':') && addr.parse::<Ipv6Addr>().is_ok()
    }

    pub fn wallet_kind(&self, token: &str) -> Option<WalletKind> {
        if patterns::RE_ETHEREUM.is_match(token) {
            return Some(WalletKind::Ethereum);
        }
        if patterns::RE_BTC_SEGWIT.is_match(token) {
            // bech32 forbids mixed case
            let lower = token.bytes().all(|b| !b.is_ascii_uppercase());
            let upper = token.bytes().all(|b| !b.is_ascii_lowercase());
            return (lower || upper).then_some(WalletKind::BitcoinSegwit);
        }
        if patterns::RE_BTC_LEGACY.is_match(token)
            && (!self.verify_wallet_checksums || base58check_valid(token))
        {
            return Some(WalletKind::BitcoinLegacy);
        }
        None
    }

    pub fn is_wallet(&self, token: &str) -> bool {
        self.wallet_kind(token).is_some()
    }

    pub fn is_asn(&self, token: &str) -> bool {
        patterns::RE_ASN
            .captures(token)
            .is_some_and(|caps| caps[1].parse::<u32>().is_ok())
    }

    /// Lowercased labels of a dotted name with at least two valid labels.
    fn dns_labels(token: &str) -> Option<Vec<String>> {
        let name = token.strip_suffix('.').unwrap_or(token);
        if name.len() > 253 {
            return None;
        }
        let labels: Vec<String> = name.split('.').map(|l| l.to_ascii_lowercase()).collect();
        if labels.len() < 2 || !labels.iter().all(|l| is_dns_label(l)) {
            return None;
        }
        Some(labels)
    }

    pub fn is_domain(&self, token: &str) -> bool {
        let Some(labels) = Self::dns_labels(token) else {
            return false;
        };
        labels
            .last()
            .is_some_and(|tld| self.known_tlds.contains(tld) && !self.is_ambiguous_suffix(tld))
    }

    pub fn is_hostname(&self, token: &str) -> bool {
        let Some(labels) = Self::dns_labels(token) else {
            return false;
        };
        labels
            .last()
            .is_some_and(|suffix| self.internal_suffixes.contains(suffix))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ObservableConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c() -> Classifier {
        Classifier::default()
    }

    #[test]
    fn rule_order_is_fixed() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "url",
                "email",
                "cve",
                "mitre_technique",
                "file_hash",
                "file_name",
                "ipv4",
                "mac",
                "ipv6",
                "wallet",
                "asn",
                "domain",
                "hostname"
            ]
        );
    }

    #[test]
    fn url_rule() {
        let c = c();
        assert!(c.is_url("https://evil.com/path"));
        assert!(c.is_url("HTTP://EVIL.COM"));
        assert!(c.is_url("http://user:pw@10.0.0.1:8080/x"));
        assert!(c.is_url("http://[2001:db8::1]:443/"));
        assert!(c.is_url("ftp://files.example.org/a.zip"));
        assert!(!c.is_url("gopher://example.com"));
        assert!(!c.is_url("http://exa_mple.com"));
        assert!(!c.is_url("http://example.com:99999"));
        assert!(!c.is_url("example.com/path"));
        assert!(!c.is_url("http://[::1]garbage"));
        assert!(!c.is_url("http://[::1]x.y/p"));
        assert!(!c.is_url("http://[::1]:"));
        assert!(c.is_url("http://[::1]"));
    }

    #[test]
    fn email_rule() {
        let c = c();
        assert!(c.is_email("first.last+tag@mail.example.co"));
        assert!(!c.is_email("user@localhost"));
        assert!(!c.is_email("user@-bad.com"));
        assert!(!c.is_email("@example.com"));
    }

    #[test]
    fn hash_rule_by_length() {
        let c = c();
        assert_eq!(
            c.hash_algorithm("d41d8cd98f00b204e9800998ecf8427e"),
            Some(HashAlgorithm::Md5)
        );
        assert_eq!(
            c.hash_algorithm("da39a3ee5e6b4b0d3255bfef95601890afd80709"),
            Some(HashAlgorithm::Sha1)
        );
        assert_eq!(
            c.hash_algorithm("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"),
            Some(HashAlgorithm::Sha256)
        );
        assert_eq!(c.hash_algorithm(&"ab12".repeat(32)), Some(HashAlgorithm::Sha512));
        assert_eq!(c.hash_algorithm(&"ab12".repeat(9)), None);
        assert_eq!(c.hash_algorithm(&"0".repeat(32)), None);
    }

    #[test]
    fn degenerate_hashes_allowed_when_configured() {
        let cfg = ObservableConfig {
            reject_degenerate_hashes: false,
            ..ObservableConfig::default()
        };
        let c = Classifier::new(&cfg);
        assert!(c.is_file_hash(&"0".repeat(32)));
    }

    #[test]
    fn file_name_rule_excludes_common_tlds() {
        let c = c();
        assert!(c.is_file_name("malware.exe"));
        assert!(c.is_file_name("Invoice.PDF"));
        assert!(c.is_file_name("update.tar.gz"));
        assert!(c.is_file_name("setup.zip"));
        assert!(!c.is_file_name("example.com"));
        assert!(!c.is_file_name(".exe"));
        assert!(!c.is_file_name("C:\\temp\\a.exe"));
        assert!(!c.is_file_name("notes.qqq"));
    }

    #[test]
    fn suffix_on_both_lists_is_claimed_by_neither_rule() {
        let c = c();
        // "one" is an extension and a known TLD but not a common TLD
        assert!(!c.is_file_name("example.one"));
        assert!(!c.is_domain("example.one"));
        assert!(c.matching_canonical("example.one").is_empty());
        // common TLDs keep resolving as domains
        assert!(!c.is_file_name("example.com"));
        assert!(c.is_domain("example.com"));
    }

    #[test]
    fn ipv4_with_cidr() {
        let c = c();
        assert!(c.is_ipv4("8.8.8.8"));
        assert!(c.is_ipv4("10.0.0.0/8"));
        assert!(!c.is_ipv4("10.0.0.0/33"));
        assert!(!c.is_ipv4("256.1.1.1"));
        assert!(!c.is_ipv4("1.2.3"));
    }

    #[test]
    fn ipv6_forms() {
        let c = c();
        assert!(c.is_ipv6("2001:db8::1"));
        assert!(c.is_ipv6("[2001:db8::1]"));
        assert!(c.is_ipv6("fe80::1%eth0"));
        assert!(c.is_ipv6("2001:db8::/32"));
        assert!(!c.is_ipv6("00:11:22:33:44:55"));
        assert!(!c.is_ipv6("2001:db8::/129"));
    }

    #[test]
    fn wallet_kinds() {
        let c = c();
        assert_eq!(
            c.wallet_kind("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"),
            Some(WalletKind::BitcoinLegacy)
        );
        assert_eq!(
            c.wallet_kind("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"),
            Some(WalletKind::BitcoinSegwit)
        );
        assert_eq!(
            c.wallet_kind("0x52908400098527886E0F7030069857D2E4169EE7"),
            Some(WalletKind::Ethereum)
        );
        // checksum mismatch
        assert_eq!(c.wallet_kind("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb"), None);
        assert_eq!(c.wallet_kind("bc1QAR0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"), None);
    }

    #[test]
    fn wallet_checksum_can_be_disabled() {
        let cfg = ObservableConfig {
            verify_wallet_checksums: false,
            ..ObservableConfig::default()
        };
        let c = Classifier::new(&cfg);
        assert!(c.is_wallet("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb"));
    }

    #[test]
    fn asn_rule() {
        let c = c();
        assert!(c.is_asn("AS15169"));
        assert!(c.is_asn("ASN4294967295"));
        assert!(!c.is_asn("AS4294967296"));
    }

    #[test]
    fn domain_and_hostname() {
        let c = c();
        assert!(c.is_domain("example.com"));
        assert!(c.is_domain("Sub.Example.CO.UK"));
        assert!(c.is_domain("example.com."));
        assert!(!c.is_domain("example.qqq"));
        assert!(!c.is_domain("com"));
        assert!(!c.is_domain("a..com"));
        assert!(c.is_hostname("dc01.corp.local"));
        assert!(!c.is_hostname("example.com"));
    }

    #[test]
    fn matching_reports_shadowed_rules() {
        let c = c();
        let kinds = c.matching_canonical("setup.zip");
        assert_eq!(kinds, vec![IndicatorType::FileName]);
        // 40-hex-character run never reaches the MAC rule
        let kinds = c.matching_canonical("da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(kinds, vec![IndicatorType::FileHash]);
        assert!(c.matching_canonical("with space").is_empty());
    }
}
