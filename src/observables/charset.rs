//! Character-class predicates shared by the marker engine and the classifier.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const BECH32_ALPHABET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_base58_char(c: char) -> bool {
    BASE58_ALPHABET.contains(c)
}

/// Bech32 data characters, compared case-insensitively.
pub fn is_bech32_char(c: char) -> bool {
    BECH32_ALPHABET.contains(c.to_ascii_lowercase())
}

pub fn has_whitespace(s: &str) -> bool {
    s.chars().any(char::is_whitespace)
}

/// RFC 1123 label: 1-63 alphanumerics or hyphens, no leading/trailing hyphen.
pub fn is_dns_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    if bytes.is_empty() || bytes.len() > 63 {
        return false;
    }
    if bytes[0] == b'-' || bytes[bytes.len() - 1] == b'-' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
}

/// Characters that may not appear in a file name on common platforms.
pub fn is_reserved_filename_char(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// Number of distinct characters, used to reject padding-like hex runs.
pub fn distinct_chars(s: &str) -> usize {
    s.chars()
        .map(|c| c.to_ascii_lowercase())
        .collect::<HashSet<char>>()
        .len()
}

/// Decode a base58 string into bytes; `None` if a character is outside the
/// alphabet.
pub fn base58_decode(s: &str) -> Option<Vec<u8>> {
    // little-endian accumulator
    let mut acc: Vec<u8> = Vec::with_capacity(s.len());
    for c in s.chars() {
        let mut carry = BASE58_ALPHABET.find(c)? as u32;
        for b in acc.iter_mut() {
            carry += (*b as u32) * 58;
            *b = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            acc.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    let zeros = s.chars().take_while(|&c| c == '1').count();
    acc.extend(std::iter::repeat(0u8).take(zeros));
    acc.reverse();
    Some(acc)
}

/// Validate a base58check payload of 21 bytes plus 4 checksum bytes.
pub fn base58check_valid(s: &str) -> bool {
    let Some(raw) = base58_decode(s) else {
        return false;
    };
    if raw.len() != 25 {
        return false;
    }
    let (payload, checksum) = raw.split_at(21);
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    &second[..4] == checksum
}
