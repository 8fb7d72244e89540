//! Configuration for defang markers and classification tables.
//!
//! The defaults cover the common analyst conventions and a conservative TLD
//! set. Every table can be replaced through serde; an engine built from a
//! configuration never mutates it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::{FangError, Result};

/// One defanging convention: a literal `pattern` (matched ASCII
/// case-insensitively) and the canonical text that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub pattern: String,
    pub replacement: String,
}

impl Marker {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Check that rewriting with this marker always shrinks its input and
    /// cannot open a new bracketed token.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| FangError::InvalidMarker {
            pattern: self.pattern.clone(),
            reason: reason.to_string(),
        };
        if self.pattern.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if !self.pattern.is_ascii() || !self.replacement.is_ascii() {
            return Err(invalid("markers must be ASCII"));
        }
        if self.replacement.len() >= self.pattern.len() {
            return Err(invalid("replacement is not shorter than pattern"));
        }
        if self
            .replacement
            .chars()
            .any(|c| matches!(c, '[' | ']' | '(' | ')' | '{' | '}'))
        {
            return Err(invalid("replacement contains a bracket"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservableConfig {
    /// Bracketed separator markers, reduced before scheme rewriting
    pub markers: Vec<Marker>,
    /// Placeholder scheme word -> real scheme, applied to `word://`
    pub scheme_aliases: BTreeMap<String, String>,
    /// Schemes accepted by the URL rule
    pub url_schemes: Vec<String>,
    /// Extensions that make `name.ext` a file name
    pub file_extensions: Vec<String>,
    /// Suffixes never treated as file extensions even if listed above
    pub common_tlds: Vec<String>,
    /// TLDs accepted by the domain rule
    pub known_tlds: Vec<String>,
    /// Private suffixes that make a dotted name a hostname
    pub internal_suffixes: Vec<String>,
    /// Longer inputs are left unclassified without running any pattern
    pub max_input_len: usize,
    /// Reject hex runs with fewer than four distinct characters
    pub reject_degenerate_hashes: bool,
    /// Verify base58check checksums of legacy Bitcoin addresses
    pub verify_wallet_checksums: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ObservableConfig {
    fn default() -> Self {
        let markers = [
            ("[.]", "."),
            ("(.)", "."),
            ("{.}", "."),
            ("[dot]", "."),
            ("(dot)", "."),
            ("{dot}", "."),
            ("[@]", "@"),
            ("(@)", "@"),
            ("{@}", "@"),
            ("[at]", "@"),
            ("(at)", "@"),
            ("{at}", "@"),
            ("[/]", "/"),
            ("(/)", "/"),
            ("[://]", "://"),
            ("[:]", ":"),
        ]
        .into_iter()
        .map(|(p, r)| Marker::new(p, r))
        .collect();

        let scheme_aliases = [
            ("meow", "http"),
            ("xxxx", "http"),
            ("xxx", "http"),
            ("scheme", "http"),
            ("proto", "http"),
            ("fxp", "ftp"),
        ]
        .into_iter()
        .map(|(w, s)| (w.to_string(), s.to_string()))
        .collect();

        Self {
            markers,
            scheme_aliases,
            url_schemes: strings(&["http", "https", "ftp", "ftps", "sftp"]),
            file_extensions: strings(&[
                // Executables and libraries
                "exe", "dll", "sys", "scr", "com", "msi", "cpl", "ocx", "drv", "elf", "bin",
                "so", "dylib", "apk", "dmg", "pkg", "deb", "rpm", "jar", "class",
                // Scripts
                "ps1", "psm1", "psd1", "bat", "cmd", "vbs", "vbe", "js", "jse", "wsf", "wsh",
                "hta", "py", "pyc", "sh", "lnk", "reg",
                // Documents
                "pdf", "doc", "docx", "docm", "dot", "dotm", "xls", "xlsx", "xlsm", "xlsb",
                "ppt", "pptx", "pptm", "rtf", "one", "chm",
                // Archives and images
                "zip", "rar", "7z", "gz", "tar", "tgz", "cab", "iso", "img", "vhd", "vhdx",
            ]),
            common_tlds: strings(&[
                "com", "net", "org", "edu", "gov", "mil", "int", "info", "biz", "io", "co",
                "us", "uk", "de", "fr", "ru", "cn", "jp", "br", "in", "eu",
            ]),
            known_tlds: strings(&[
                // Generic
                "com", "org", "net", "edu", "gov", "mil", "int", "arpa",
                // Country codes
                "uk", "us", "ca", "au", "de", "fr", "it", "es", "nl", "se", "no", "fi", "dk",
                "be", "ch", "at", "pl", "ru", "su", "by", "ua", "kz", "cn", "hk", "tw", "jp",
                "kr", "kp", "in", "pk", "bd", "ir", "iq", "il", "br", "mx", "ar", "cl", "pe",
                "ve", "za", "eg", "ng", "ke", "nz", "ie", "pt", "gr", "tr", "ae", "sa", "cz",
                "sk", "hu", "ro", "bg", "lt", "lv", "ee", "is", "lu", "vn", "th", "my", "sg",
                "id", "ph", "eu",
                // New generic
                "io", "ai", "app", "dev", "tech", "cloud", "online", "store", "site", "xyz",
                "info", "biz", "name", "pro", "academy", "agency", "blog", "digital", "email",
                "group", "live", "media", "network", "news", "shop", "social", "solutions",
                "support", "systems", "technology", "today", "tools", "travel", "tv", "video",
                "web", "website", "work", "world", "zone", "me", "co", "cc", "to", "gg",
                "one", "ltd", "company", "global", "asia", "africa", "berlin", "london",
                "nyc", "paris", "tokyo",
                // Frequently abused
                "tk", "ml", "ga", "cf", "gq", "ws", "pw", "click", "download", "link", "top",
                "icu", "buzz", "rest", "onion",
            ]),
            internal_suffixes: strings(&[
                "local",
                "lan",
                "internal",
                "corp",
                "home",
                "intranet",
                "localdomain",
            ]),
            max_input_len: 4096,
            reject_degenerate_hashes: true,
            verify_wallet_checksums: true,
        }
    }
}

impl ObservableConfig {
    /// Parse a configuration from JSON; omitted fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: ObservableConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading observable config");
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks; run again by the engine at construction.
    pub fn validate(&self) -> Result<()> {
        for marker in &self.markers {
            marker.validate()?;
        }
        for (word, scheme) in &self.scheme_aliases {
            if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(FangError::InvalidConfig(format!(
                    "scheme alias word must be alphanumeric: {word:?}"
                )));
            }
            if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_lowercase()) {
                return Err(FangError::InvalidConfig(format!(
                    "scheme alias target must be lowercase letters: {scheme:?}"
                )));
            }
        }
        if self.url_schemes.is_empty() {
            return Err(FangError::InvalidConfig("no URL schemes configured".into()));
        }
        if self.known_tlds.is_empty() {
            return Err(FangError::InvalidConfig("no TLDs configured".into()));
        }
        let tables = [
            ("url_schemes", &self.url_schemes),
            ("file_extensions", &self.file_extensions),
            ("common_tlds", &self.common_tlds),
            ("known_tlds", &self.known_tlds),
            ("internal_suffixes", &self.internal_suffixes),
        ];
        for (name, table) in tables {
            if let Some(bad) = table
                .iter()
                .find(|e| e.is_empty() || !e.chars().all(|c| c.is_ascii_alphanumeric()))
            {
                return Err(FangError::InvalidConfig(format!(
                    "{name} entry must be a non-empty alphanumeric word: {bad:?}"
                )));
            }
        }
        if self.max_input_len == 0 {
            return Err(FangError::InvalidConfig("max_input_len must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ObservableConfig::default().validate().unwrap();
    }

    #[test]
    fn marker_must_shrink() {
        let m = Marker::new("[x]", "abc");
        assert!(matches!(m.validate(), Err(FangError::InvalidMarker { .. })));
        assert!(Marker::new("", "").validate().is_err());
        assert!(Marker::new("[[.]]", "[").validate().is_err());
        assert!(Marker::new("<dot>", ".").validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ObservableConfig::from_json_str(r#"{"max_input_len": 128}"#).unwrap();
        assert_eq!(cfg.max_input_len, 128);
        assert_eq!(cfg.markers, ObservableConfig::default().markers);
    }

    #[test]
    fn rejects_bad_tables() {
        let err = ObservableConfig::from_json_str(r#"{"file_extensions": ["exe", ".dll"]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("file_extensions"));
        assert!(ObservableConfig::from_json_str(r#"{"scheme_aliases": {"meow": "HTTP"}}"#).is_err());
        assert!(ObservableConfig::from_json_str("[]").is_err());
    }

    #[test]
    fn pretty_json_round_trips() {
        let cfg = ObservableConfig::default();
        let text = cfg.to_json_pretty().unwrap();
        assert_eq!(ObservableConfig::from_json_str(&text).unwrap(), cfg);
    }
}
