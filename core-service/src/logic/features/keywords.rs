//! Suspicious Keyword Features
//!
//! One 0/1 flag per listed word (substring match on the lowercased URL),
//! plus the number of words present and an any-match flag.

use super::url::ParsedUrl;
use super::vector::{FeatureExtractor, FeatureVector};

/// Words commonly found in credential-harvesting URLs.
/// Order and spelling mirror the `kw_*` block of `FEATURE_LAYOUT`.
pub const SUSPICIOUS_WORDS: &[&str] = &[
    "login", "signin", "verify", "secure", "account", "update", "password",
    "confirm", "banking", "bank", "paypal", "ebay", "webscr", "wallet",
    "crypto", "pay", "suspend", "unlock", "billing", "support",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordFeatures {
    /// Presence flag per entry of SUSPICIOUS_WORDS, same order
    pub matches: Vec<bool>,
}

impl KeywordFeatures {
    pub fn from_url(parsed: &ParsedUrl) -> Self {
        Self::from_text(parsed.raw())
    }

    pub fn from_text(text: &str) -> Self {
        let lowered = text.to_lowercase();
        Self {
            matches: SUSPICIOUS_WORDS.iter().map(|w| lowered.contains(w)).collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.matches.iter().filter(|m| **m).count()
    }

    pub fn matched_words(&self) -> Vec<&'static str> {
        SUSPICIOUS_WORDS
            .iter()
            .zip(self.matches.iter())
            .filter(|(_, m)| **m)
            .map(|(w, _)| *w)
            .collect()
    }
}

pub fn feature_name(word: &str) -> String {
    format!("kw_{}", word)
}

impl FeatureExtractor for KeywordFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        for (word, matched) in SUSPICIOUS_WORDS.iter().zip(self.matches.iter()) {
            vector.set_flag(&feature_name(word), *matched);
        }
        vector.set_by_name("suspicious_words_count", self.count() as f64);
        vector.set_flag("has_suspicious_words", self.count() > 0);
    }
}
