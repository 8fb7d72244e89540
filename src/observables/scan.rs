//! Budgeted extraction of observables from free text.
//!
//! Text is split on whitespace and list delimiters, enclosing punctuation is
//! trimmed from each token, and every token goes through the engine. Only
//! classified tokens are reported.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;
use tracing::debug;

use super::engine::ObservableEngine;
use super::types::IndicatorType;

#[derive(Debug, Clone, Copy)]
pub struct ScanBudget {
    pub max_matches_total: usize,
    pub max_matches_per_kind: usize,
    pub time_guard_ms: u64,
}

impl Default for ScanBudget {
    fn default() -> Self {
        Self {
            max_matches_total: 10_000,
            max_matches_per_kind: 1_000,
            time_guard_ms: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservableMatch {
    pub kind: IndicatorType,
    /// Refanged value
    pub value: String,
    /// Token as it appears in the text
    pub raw: String,
    /// Byte span of `raw` in the scanned text
    pub start: usize,
    pub end: usize,
    pub defanged: bool,
}

const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ';' | '|' | '"' | '\'' | '<' | '>' | '`')
}

/// Strip sentence punctuation and unbalanced or enclosing brackets.
/// Returns the number of bytes removed from the front and the trimmed token.
fn trim_token(tok: &str) -> (usize, &str) {
    let mut t = tok;
    let mut lead = 0usize;
    loop {
        let before = t.len();
        t = t.trim_end_matches(['.', '!', '?']);
        for (open, close) in PAIRS {
            if t.len() >= 2 && t.starts_with(open) && t.ends_with(close) {
                t = &t[1..t.len() - 1];
                lead += 1;
                continue;
            }
            let opens = t.matches(open).count();
            let closes = t.matches(close).count();
            if closes > opens && t.ends_with(close) {
                t = &t[..t.len() - 1];
            } else if opens > closes && t.starts_with(open) {
                t = &t[1..];
                lead += 1;
            }
        }
        if t.len() == before {
            return (lead, t);
        }
    }
}

/// Candidate tokens with their byte offsets.
fn tokens(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut push = |s: usize, e: usize| {
        let (lead, t) = trim_token(&text[s..e]);
        if !t.is_empty() {
            out.push((s + lead, t));
        }
    };
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        if is_delimiter(c) {
            if let Some(s) = start.take() {
                push(s, i);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        push(s, text.len());
    }
    out
}

/// Scan one text buffer, honoring the budget. Each `(kind, value)` pair is
/// reported once, at its first occurrence.
pub fn scan_text(engine: &ObservableEngine, text: &str, budget: &ScanBudget) -> Vec<ObservableMatch> {
    let started = Instant::now();
    let mut out: Vec<ObservableMatch> = Vec::new();
    let mut seen: HashSet<(IndicatorType, String)> = HashSet::new();
    let mut per_kind: HashMap<IndicatorType, usize> = HashMap::new();

    for (start, raw) in tokens(text) {
        if out.len() >= budget.max_matches_total {
            break;
        }
        if started.elapsed().as_millis() as u64 > budget.time_guard_ms {
            debug!(matches = out.len(), "scan time guard reached");
            break;
        }
        let Some(kind) = engine.classify(raw) else {
            continue;
        };
        let n = per_kind.entry(kind).or_insert(0);
        if *n >= budget.max_matches_per_kind {
            continue;
        }
        let value = engine.refang(raw).into_owned();
        if !seen.insert((kind, value.clone())) {
            continue;
        }
        *n += 1;
        out.push(ObservableMatch {
            kind,
            value,
            raw: raw.to_string(),
            start,
            end: start + raw.len(),
            defanged: engine.is_defanged(raw),
        });
    }
    out
}

/// Count distinct classified tokens per type in one text.
fn count_text(
    engine: &ObservableEngine,
    text: &str,
    max_per_text: usize,
) -> HashMap<IndicatorType, u32> {
    let mut counts: HashMap<IndicatorType, u32> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::new();
    for (_, raw) in tokens(text) {
        let Some(kind) = engine.classify(raw) else {
            continue;
        };
        if !seen.insert(engine.refang(raw).into_owned()) {
            continue;
        }
        let n = counts.entry(kind).or_insert(0);
        if (*n as usize) < max_per_text {
            *n += 1;
        }
    }
    counts
}

/// Classify many texts and aggregate per-type counts in a stable order.
pub fn summarize<'a, I: IntoIterator<Item = &'a str>>(
    engine: &ObservableEngine,
    iter: I,
    max_per_text: usize,
) -> BTreeMap<IndicatorType, u32> {
    const PAR_THRESHOLD: usize = 128;
    let texts: Vec<&str> = iter.into_iter().collect();

    let merge = |mut acc: BTreeMap<IndicatorType, u32>, counts: HashMap<IndicatorType, u32>| {
        for (k, v) in counts {
            *acc.entry(k).or_insert(0) += v;
        }
        acc
    };

    if texts.len() >= PAR_THRESHOLD {
        texts
            .par_iter()
            .map(|t| count_text(engine, t, max_per_text))
            .fold(BTreeMap::new, merge)
            .reduce(BTreeMap::new, |mut a, b| {
                for (k, v) in b {
                    *a.entry(k).or_insert(0) += v;
                }
                a
            })
    } else {
        texts
            .iter()
            .map(|t| count_text(engine, t, max_per_text))
            .fold(BTreeMap::new(), merge)
    }
}
