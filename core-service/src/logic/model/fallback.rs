//! Degraded-mode predictor
//!
//! Answers when no trained artifact could be loaded. Never reports a
//! probability and always flags the model as unavailable.

use chrono::{DateTime, Utc};

use super::inference::{ClassificationError, Classifier, ClassifierInput, Verdict};
use super::{EngineMode, EngineStatus};
use crate::logic::config::FallbackPolicy;
use crate::logic::features::FeatureMap;

/// Signals that must fire for the heuristic to call phishing
pub const HEURISTIC_MIN_SIGNALS: usize = 3;

const LONG_URL_CHARS: f64 = 75.0;
const MANY_SUBDOMAINS: f64 = 3.0;
const MANY_HYPHENS: f64 = 5.0;
const MANY_SUSPICIOUS_WORDS: f64 = 2.0;

#[derive(Debug)]
pub struct FallbackClassifier {
    policy: FallbackPolicy,
    reason: String,
    since: DateTime<Utc>,
}

impl FallbackClassifier {
    pub fn new(policy: FallbackPolicy, reason: impl Into<String>) -> Self {
        Self {
            policy,
            reason: reason.into(),
            since: Utc::now(),
        }
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Count the red flags present in an extracted feature map
pub fn heuristic_signals(url: &str, features: &FeatureMap) -> usize {
    let value = |name: &str| features.get(name).unwrap_or(0.0);

    [
        value("is_ip_host") > 0.0,
        url.contains('@'),
        value("suspicious_words_count") >= MANY_SUSPICIOUS_WORDS,
        value("url_length") > LONG_URL_CHARS,
        value("num_subdomains") >= MANY_SUBDOMAINS,
        value("is_https") <= 0.0,
        value("num_percent_escapes") > 0.0,
        value("num_hyphens") >= MANY_HYPHENS,
    ]
    .into_iter()
    .filter(|fired| *fired)
    .count()
}

impl Classifier for FallbackClassifier {
    fn predict(&self, input: ClassifierInput<'_>) -> Result<Verdict, ClassificationError> {
        let is_phishing = match self.policy {
            FallbackPolicy::AlwaysPhishing => true,
            FallbackPolicy::Heuristic => heuristic_signals(input.url, input.features) >= HEURISTIC_MIN_SIGNALS,
        };

        Ok(Verdict {
            is_phishing,
            probability: None,
            model_available: false,
            degraded_reason: Some(self.reason.clone()),
        })
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            model_loaded: false,
            mode: EngineMode::Degraded,
            model_name: format!("fallback ({})", policy_name(self.policy)),
            degraded_reason: Some(self.reason.clone()),
            feature_count: 0,
            layout_hash: None,
            loaded_at: Some(self.since),
            avg_latency_ms: 0.0,
            inference_count: 0,
        }
    }
}

fn policy_name(policy: FallbackPolicy) -> &'static str {
    match policy {
        FallbackPolicy::AlwaysPhishing => "always_phishing",
        FallbackPolicy::Heuristic => "heuristic",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::extract;

    fn verdict(classifier: &FallbackClassifier, url: &str) -> Verdict {
        let features = extract(url).unwrap().to_feature_map();
        classifier.predict(ClassifierInput { url, features: &features }).unwrap()
    }

    #[test]
    fn test_always_phishing() {
        let classifier = FallbackClassifier::new(FallbackPolicy::AlwaysPhishing, "no artifact");
        let v = verdict(&classifier, "https://www.wikipedia.org/");

        assert!(v.is_phishing);
        assert!(!v.model_available);
        assert_eq!(v.probability, None);
        assert_eq!(v.degraded_reason.as_deref(), Some("no artifact"));
    }

    #[test]
    fn test_heuristic_benign_url() {
        let classifier = FallbackClassifier::new(FallbackPolicy::Heuristic, "no artifact");
        let v = verdict(&classifier, "https://www.wikipedia.org/");
        assert!(!v.is_phishing);
        assert!(!v.model_available);
    }

    #[test]
    fn test_heuristic_suspicious_url() {
        let classifier = FallbackClassifier::new(FallbackPolicy::Heuristic, "no artifact");
        // ip host, @, not https, login + verify
        let v = verdict(&classifier, "http://user@10.0.0.1/login/verify");
        assert!(v.is_phishing);
    }

    #[test]
    fn test_signal_count() {
        let url = "http://user@10.0.0.1/login/verify";
        let features = extract(url).unwrap().to_feature_map();
        assert_eq!(heuristic_signals(url, &features), 4);

        // only "not https"
        let url = "http://example.com/";
        let features = extract(url).unwrap().to_feature_map();
        assert_eq!(heuristic_signals(url, &features), 1);
    }

    #[test]
    fn test_status_is_degraded() {
        let classifier = FallbackClassifier::new(FallbackPolicy::Heuristic, "artifact missing");
        let status = classifier.status();

        assert!(!status.model_loaded);
        assert_eq!(status.mode, EngineMode::Degraded);
        assert_eq!(status.degraded_reason.as_deref(), Some("artifact missing"));
        assert_eq!(status.model_name, "fallback (heuristic)");
    }
}
