//! Features Module - Feature Extraction Engine
//!
//! Turns a URL (and, when enabled, the fetched page) into the canonical
//! feature vector. Three families, each its own extractor:
//! - `lexical`: structure and character statistics of the URL string
//! - `keywords`: suspicious-word presence flags and aggregates
//! - `content`: HTML-derived counts, zero when no page was fetched
//!
//! The lexical and keyword families are pure: the same string always yields
//! the same values.

pub mod content;
pub mod keywords;
pub mod layout;
pub mod lexical;
pub mod sequence;
pub mod url;
pub mod vector;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use self::content::{ContentFeatures, ContentFetcher, PageContent};
pub use self::keywords::{KeywordFeatures, SUSPICIOUS_WORDS};
pub use self::layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use self::lexical::LexicalFeatures;
pub use self::url::{HostKind, ParsedUrl};
pub use self::vector::{FeatureExtractor, FeatureMap, FeatureVector};

/// Why a URL produced no features
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("URL is {length} characters long (max {max})")]
    TooLong { length: usize, max: usize },
}

impl ExtractionError {
    pub fn invalid(url: &str, reason: impl Into<String>) -> Self {
        ExtractionError::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Lexical and keyword features only; content features stay zero
pub fn extract(url: &str) -> Result<FeatureVector, ExtractionError> {
    let parsed = ParsedUrl::parse(url)?;
    Ok(extract_parsed(&parsed, None))
}

/// Full extraction over an already validated URL
pub fn extract_parsed(parsed: &ParsedUrl, page: Option<&PageContent>) -> FeatureVector {
    let mut vector = FeatureVector::new();

    LexicalFeatures::from_url(parsed).extract(&mut vector);
    KeywordFeatures::from_url(parsed).extract(&mut vector);

    match page {
        Some(page) => ContentFeatures::from_page(parsed, page),
        None => ContentFeatures::default(),
    }
    .extract(&mut vector);

    vector
}
