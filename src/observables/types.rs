//! Indicator types and the per-token inspection result.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FangError;

/// Closed set of indicator types the classifier can emit.
///
/// "Unclassified" is not a variant: the classifier returns `None` for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndicatorType {
    #[serde(rename = "IPv4-Addr")]
    Ipv4Addr,
    #[serde(rename = "IPv6-Addr")]
    Ipv6Addr,
    #[serde(rename = "Domain-Name")]
    DomainName,
    #[serde(rename = "Hostname")]
    Hostname,
    #[serde(rename = "Url")]
    Url,
    #[serde(rename = "Email-Addr")]
    EmailAddr,
    /// MD5/SHA-1/SHA-256/SHA-512 digest; see [`HashAlgorithm`] for the subtype.
    #[serde(rename = "File-Hash")]
    FileHash,
    #[serde(rename = "File-Name")]
    FileName,
    #[serde(rename = "Mac-Addr")]
    MacAddr,
    #[serde(rename = "Cryptocurrency-Wallet")]
    CryptocurrencyWallet,
    #[serde(rename = "Autonomous-System")]
    AutonomousSystem,
    /// CVE identifier
    #[serde(rename = "Vulnerability")]
    Vulnerability,
    /// MITRE ATT&CK technique identifier
    #[serde(rename = "Attack-Pattern")]
    AttackPattern,
}

impl IndicatorType {
    pub const ALL: [IndicatorType; 13] = [
        IndicatorType::Ipv4Addr,
        IndicatorType::Ipv6Addr,
        IndicatorType::DomainName,
        IndicatorType::Hostname,
        IndicatorType::Url,
        IndicatorType::EmailAddr,
        IndicatorType::FileHash,
        IndicatorType::FileName,
        IndicatorType::MacAddr,
        IndicatorType::CryptocurrencyWallet,
        IndicatorType::AutonomousSystem,
        IndicatorType::Vulnerability,
        IndicatorType::AttackPattern,
    ];

    /// Stable label, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorType::Ipv4Addr => "IPv4-Addr",
            IndicatorType::Ipv6Addr => "IPv6-Addr",
            IndicatorType::DomainName => "Domain-Name",
            IndicatorType::Hostname => "Hostname",
            IndicatorType::Url => "Url",
            IndicatorType::EmailAddr => "Email-Addr",
            IndicatorType::FileHash => "File-Hash",
            IndicatorType::FileName => "File-Name",
            IndicatorType::MacAddr => "Mac-Addr",
            IndicatorType::CryptocurrencyWallet => "Cryptocurrency-Wallet",
            IndicatorType::AutonomousSystem => "Autonomous-System",
            IndicatorType::Vulnerability => "Vulnerability",
            IndicatorType::AttackPattern => "Attack-Pattern",
        }
    }

    /// Platform entity that downstream clients create for this type.
    ///
    /// Hashes and file names are both attributes of a file object.
    pub fn entity_type(&self) -> &'static str {
        match self {
            IndicatorType::FileHash | IndicatorType::FileName => "StixFile",
            other => other.as_str(),
        }
    }

    /// Whether the type is an observable (as opposed to a knowledge object
    /// such as a vulnerability or an attack pattern).
    pub fn is_observable(&self) -> bool {
        !matches!(
            self,
            IndicatorType::Vulnerability | IndicatorType::AttackPattern
        )
    }
}

/// Label for an optional classification; unclassified maps to `""`.
pub fn type_label(kind: Option<IndicatorType>) -> &'static str {
    kind.map(|k| k.as_str()).unwrap_or("")
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorType {
    type Err = FangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndicatorType::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| FangError::InvalidConfig(format!("unknown indicator type: {s}")))
    }
}

/// Digest algorithm implied by a hex run's length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Map a hex-character count to its algorithm.
    pub fn from_hex_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(HashAlgorithm::Md5),
            40 => Some(HashAlgorithm::Sha1),
            64 => Some(HashAlgorithm::Sha256),
            128 => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }

    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cryptocurrency address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletKind {
    BitcoinLegacy,
    BitcoinSegwit,
    Ethereum,
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletKind::BitcoinLegacy => write!(f, "Bitcoin (legacy)"),
            WalletKind::BitcoinSegwit => write!(f, "Bitcoin (segwit)"),
            WalletKind::Ethereum => write!(f, "Ethereum"),
        }
    }
}

/// Everything the engine knows about one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observable {
    /// Token as supplied by the caller
    pub raw: String,
    /// Trimmed, refanged form
    pub value: String,
    pub kind: Option<IndicatorType>,
    /// Whether the raw token carried any obfuscation marker
    pub defanged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<HashAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_kind: Option<WalletKind>,
}

impl Observable {
    pub fn is_classified(&self) -> bool {
        self.kind.is_some()
    }

    /// Label of the classification, `""` when unclassified.
    pub fn label(&self) -> &'static str {
        type_label(self.kind)
    }
}
