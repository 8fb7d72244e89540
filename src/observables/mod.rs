//! Observable detection and normalization.
//!
//! Turns raw text fragments scraped from pages and documents into typed
//! indicators: `refang` undoes analyst obfuscation (`hxxp`, `[.]`, `(at)`),
//! `is_defanged` reports whether any such marker is present, and `classify`
//! assigns the first matching indicator type from a fixed priority table.
//! All three are pure functions; the free functions below use an engine built
//! from [`ObservableConfig::default`], custom tables go through
//! [`ObservableEngine::new`].

pub mod charset;
pub mod classify;
mod config;
pub mod defang;
mod engine;
pub mod patterns;
pub mod refang;
pub mod scan;
mod types;

pub use classify::{Classifier, Rule, RULES};
pub use config::{Marker, ObservableConfig};
pub use defang::MarkerHit;
pub use engine::ObservableEngine;
pub use scan::{scan_text, summarize, ObservableMatch, ScanBudget};
pub use types::{type_label, HashAlgorithm, IndicatorType, Observable, WalletKind};

use once_cell::sync::Lazy;
use std::borrow::Cow;

static DEFAULT_ENGINE: Lazy<ObservableEngine> = Lazy::new(|| {
    ObservableEngine::new(ObservableConfig::default()).expect("default observable config is valid")
});

/// Engine built from the default configuration.
pub fn default_engine() -> &'static ObservableEngine {
    &DEFAULT_ENGINE
}

/// Rewrite every known obfuscation marker; canonical input is returned as-is.
pub fn refang(input: &str) -> Cow<'_, str> {
    DEFAULT_ENGINE.refang(input)
}

/// Whether `input` contains any marker that [`refang`] would rewrite.
pub fn is_defanged(input: &str) -> bool {
    DEFAULT_ENGINE.is_defanged(input)
}

/// First matching indicator type, or `None` for unclassified input.
pub fn classify(input: &str) -> Option<IndicatorType> {
    DEFAULT_ENGINE.classify(input)
}

/// Refanged value, type and subtype details for one token.
pub fn inspect(input: &str) -> Observable {
    DEFAULT_ENGINE.inspect(input)
}
