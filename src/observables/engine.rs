//! Immutable engine combining the refanger, the defang detector and the
//! classifier behind one configuration.

use std::borrow::Cow;
use tracing::debug;

use super::classify::Classifier;
use super::config::ObservableConfig;
use super::defang::MarkerHit;
use super::refang::MarkerSet;
use super::types::{HashAlgorithm, IndicatorType, Observable, WalletKind};
use crate::error::Result;

/// Built once from an [`ObservableConfig`] and shared by reference; every
/// method is a pure function of its input.
#[derive(Debug, Clone)]
pub struct ObservableEngine {
    config: ObservableConfig,
    markers: MarkerSet,
    classifier: Classifier,
}

impl ObservableEngine {
    pub fn new(config: ObservableConfig) -> Result<Self> {
        config.validate()?;
        let markers = MarkerSet::new(&config)?;
        let classifier = Classifier::new(&config);
        debug!(
            extensions = config.file_extensions.len(),
            tlds = config.known_tlds.len(),
            max_input_len = config.max_input_len,
            "observable engine initialized"
        );
        Ok(Self {
            config,
            markers,
            classifier,
        })
    }

    pub fn config(&self) -> &ObservableConfig {
        &self.config
    }

    pub fn refang<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.markers.refang(input)
    }

    pub fn is_defanged(&self, input: &str) -> bool {
        self.markers.is_defanged(input)
    }

    pub fn find_markers(&self, input: &str) -> Vec<MarkerHit> {
        self.markers.find_markers(input)
    }

    /// Trimmed and refanged form, or `None` when the token is empty or
    /// exceeds `max_input_len`.
    fn canonical<'a>(&self, input: &'a str) -> Option<Cow<'a, str>> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.len() > self.classifier.max_input_len() {
            return None;
        }
        Some(self.markers.refang(trimmed))
    }

    /// Classify a raw or refanged token; `None` means unclassified.
    pub fn classify(&self, input: &str) -> Option<IndicatorType> {
        let canonical = self.canonical(input)?;
        self.classifier.classify_canonical(&canonical)
    }

    /// All types whose shape test accepts the token, highest priority first.
    pub fn matching_types(&self, input: &str) -> Vec<IndicatorType> {
        match self.canonical(input) {
            Some(canonical) => self.classifier.matching_canonical(&canonical),
            None => Vec::new(),
        }
    }

    pub fn hash_algorithm(&self, input: &str) -> Option<HashAlgorithm> {
        let canonical = self.canonical(input)?;
        self.classifier.hash_algorithm(&canonical)
    }

    pub fn wallet_kind(&self, input: &str) -> Option<WalletKind> {
        let canonical = self.canonical(input)?;
        self.classifier.wallet_kind(&canonical)
    }

    /// Refang, classify and annotate one token.
    pub fn inspect(&self, input: &str) -> Observable {
        let trimmed = input.trim();
        let value = self.markers.refang(trimmed);
        let kind = self.classify(trimmed);
        let hash_algorithm = match kind {
            Some(IndicatorType::FileHash) => self.classifier.hash_algorithm(&value),
            _ => None,
        };
        let wallet_kind = match kind {
            Some(IndicatorType::CryptocurrencyWallet) => self.classifier.wallet_kind(&value),
            _ => None,
        };
        Observable {
            raw: input.to_string(),
            value: value.into_owned(),
            kind,
            defanged: self.markers.is_defanged(trimmed),
            hash_algorithm,
            wallet_kind,
        }
    }
}
