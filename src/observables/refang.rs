//! Refanging: rewrite defanged indicators back to their canonical form.
//!
//! Two stages run in a fixed order:
//! 1. bracketed markers (`[.]`, `(at)`, `[://]`, ...) are reduced with an
//!    output-stack scan. Replacement text re-enters the scan, so markers
//!    formed by an earlier rewrite (`[[.]]`) collapse in the same pass and
//!    the result contains no marker at all;
//! 2. scheme words are rewritten: `hxxp`/`h[xx]p` families and placeholder
//!    words in front of `://` (`meow://`, `fxp://`).
//!
//! Replacement text of stage 1 is punctuation only and stage 2 only writes
//! scheme words, which no marker pattern may contain, so neither stage can
//! create work for the other and a single call reaches the fixpoint.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::debug;

use super::config::{Marker, ObservableConfig};
use super::patterns::RE_HXXP;
use crate::error::{FangError, Result};

/// Compiled marker tables shared by the refanger and the defang detector.
#[derive(Debug, Clone)]
pub struct MarkerSet {
    /// Lowercased, longest pattern first
    pub(crate) markers: Vec<Marker>,
    /// Any-marker automaton used for prechecks and detection
    pub(crate) automaton: AhoCorasick,
    /// Placeholder word (lowercase) -> scheme
    pub(crate) aliases: BTreeMap<String, String>,
    /// `\b(word|...)://`, absent when no aliases are configured
    pub(crate) alias_re: Option<Regex>,
    /// Final bytes of all patterns; the scan only looks back after these
    tail_bytes: Vec<u8>,
}

fn ends_with_ignore_ascii_case(hay: &str, needle: &str) -> bool {
    hay.len() >= needle.len()
        && hay.as_bytes()[hay.len() - needle.len()..].eq_ignore_ascii_case(needle.as_bytes())
}

impl MarkerSet {
    pub fn new(cfg: &ObservableConfig) -> Result<Self> {
        let mut aliases: BTreeMap<String, String> = BTreeMap::new();
        for (word, scheme) in &cfg.scheme_aliases {
            aliases.insert(word.to_ascii_lowercase(), scheme.clone());
        }
        for (word, scheme) in &aliases {
            if aliases.contains_key(scheme) || RE_HXXP.is_match(scheme) || word == scheme {
                return Err(FangError::InvalidConfig(format!(
                    "scheme alias {word:?} -> {scheme:?} would rewrite its own output"
                )));
            }
        }
        // Words written by scheme rewriting; a marker containing one could be
        // formed only after the marker pass has finished.
        let mut written: Vec<&str> = vec!["http"];
        written.extend(aliases.values().map(String::as_str));

        let mut markers: Vec<Marker> = Vec::with_capacity(cfg.markers.len());
        for m in &cfg.markers {
            m.validate()?;
            let first = m.pattern.as_bytes()[0];
            let last = m.pattern.as_bytes()[m.pattern.len() - 1];
            if first.is_ascii_alphanumeric() || last.is_ascii_alphanumeric() {
                return Err(FangError::InvalidMarker {
                    pattern: m.pattern.clone(),
                    reason: "pattern must start and end with punctuation".into(),
                });
            }
            if !m.replacement.bytes().all(|b| b.is_ascii_punctuation()) {
                return Err(FangError::InvalidMarker {
                    pattern: m.pattern.clone(),
                    reason: "replacement must be punctuation only".into(),
                });
            }
            let pattern = m.pattern.to_ascii_lowercase();
            if let Some(word) = written.iter().find(|w| pattern.contains(*w)) {
                return Err(FangError::InvalidMarker {
                    pattern: m.pattern.clone(),
                    reason: format!("pattern contains scheme word {word:?}"),
                });
            }
            if !markers.iter().any(|existing| existing.pattern == pattern) {
                markers.push(Marker::new(pattern, m.replacement.clone()));
            }
        }
        markers.sort_by(|a, b| b.pattern.len().cmp(&a.pattern.len()));

        let automaton = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(markers.iter().map(|m| m.pattern.as_str()))?;

        let alias_re = if aliases.is_empty() {
            None
        } else {
            let mut words: Vec<&str> = aliases.keys().map(String::as_str).collect();
            words.sort_by_key(|w| std::cmp::Reverse(w.len()));
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"(?i)\b({alternation})://"))?)
        };

        let mut tail_bytes: Vec<u8> = markers
            .iter()
            .filter_map(|m| m.pattern.bytes().last())
            .collect();
        tail_bytes.sort_unstable();
        tail_bytes.dedup();

        debug!(
            markers = markers.len(),
            aliases = aliases.len(),
            "compiled refang marker set"
        );

        Ok(Self {
            markers,
            automaton,
            aliases,
            alias_re,
            tail_bytes,
        })
    }

    /// Rewrite every recognized marker; canonical input is returned borrowed.
    pub fn refang<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match self.reduce_markers(input) {
            Cow::Borrowed(s) => self.rewrite_schemes(s),
            Cow::Owned(s) => {
                if self.needs_scheme_rewrite(&s) {
                    Cow::Owned(self.rewrite_schemes(&s).into_owned())
                } else {
                    Cow::Owned(s)
                }
            }
        }
    }

    fn marker_at_tail(&self, out: &str) -> Option<&Marker> {
        self.markers
            .iter()
            .find(|m| ends_with_ignore_ascii_case(out, &m.pattern))
    }

    /// Stage 1: bracketed separator markers.
    pub(crate) fn reduce_markers<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if !self.automaton.is_match(input) {
            return Cow::Borrowed(input);
        }
        let mut out = String::with_capacity(input.len());
        // Pending characters, next one last; replacements are pushed back here
        let mut pending: Vec<char> = input.chars().rev().collect();
        while let Some(c) = pending.pop() {
            out.push(c);
            if !c.is_ascii() || self.tail_bytes.binary_search(&(c as u8)).is_err() {
                continue;
            }
            if let Some(marker) = self.marker_at_tail(&out) {
                // Matched bytes are ASCII, so the cut lands on a char boundary
                out.truncate(out.len() - marker.pattern.len());
                pending.extend(marker.replacement.chars().rev());
            }
        }
        Cow::Owned(out)
    }

    fn needs_scheme_rewrite(&self, s: &str) -> bool {
        RE_HXXP.is_match(s) || self.alias_re.as_ref().is_some_and(|re| re.is_match(s))
    }

    /// Stage 2: protocol words.
    pub(crate) fn rewrite_schemes<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let step = RE_HXXP.replace_all(input, |caps: &Captures| {
            if caps[1].is_empty() {
                "http"
            } else {
                "https"
            }
        });
        if let Some(re) = &self.alias_re {
            if re.is_match(&step) {
                let replaced = re
                    .replace_all(&step, |caps: &Captures| {
                        let word = caps[1].to_ascii_lowercase();
                        let scheme = self.aliases.get(&word).map(String::as_str).unwrap_or("http");
                        format!("{scheme}://")
                    })
                    .into_owned();
                return Cow::Owned(replaced);
            }
        }
        step
    }
}
