//! URL Analysis Pipeline
//!
//! parse → (fetch page) → extract → classify, with the certificate probe
//! running alongside. One `PredictionResult` per URL, whatever happens:
//! bad input, model errors and timeouts all become labels, never errors.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::logic::certificate::CertificateValidator;
use crate::logic::config::EngineConfig;
use crate::logic::features::{extract_parsed, ContentFetcher, ParsedUrl};
use crate::logic::model::{load_classifier, ClassificationError, Classifier, ClassifierInput, EngineStatus, Verdict};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionLabel {
    Phishing,
    Legitimate,
    #[serde(rename = "Invalid URL")]
    InvalidUrl,
    Unknown,
    Error,
}

impl PredictionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionLabel::Phishing => "Phishing",
            PredictionLabel::Legitimate => "Legitimate",
            PredictionLabel::InvalidUrl => "Invalid URL",
            PredictionLabel::Unknown => "Unknown",
            PredictionLabel::Error => "Error",
        }
    }
}

impl std::fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub url: String,
    pub prediction: PredictionLabel,
    #[serde(rename = "validSSL")]
    pub valid_ssl: bool,
    pub model_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResult {
    pub fn invalid(url: impl Into<String>, reason: impl Into<String>, model_available: bool) -> Self {
        Self {
            url: url.into(),
            prediction: PredictionLabel::InvalidUrl,
            valid_ssl: false,
            model_available,
            probability: None,
            error: Some(reason.into()),
        }
    }

    fn from_verdict(url: &str, verdict: Verdict, valid_ssl: bool) -> Self {
        Self {
            url: url.to_string(),
            prediction: if verdict.is_phishing {
                PredictionLabel::Phishing
            } else {
                PredictionLabel::Legitimate
            },
            valid_ssl,
            model_available: verdict.model_available,
            probability: verdict.probability,
            error: None,
        }
    }

    fn failed(url: &str, label: PredictionLabel, error: String, valid_ssl: bool, model_available: bool) -> Self {
        Self {
            url: url.to_string(),
            prediction: label,
            valid_ssl,
            model_available,
            probability: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateReport {
    pub url: String,
    #[serde(rename = "validSSL")]
    pub valid_ssl: bool,
}

// ============================================================================
// ANALYZER
// ============================================================================

#[derive(Clone)]
pub struct Analyzer {
    classifier: Arc<dyn Classifier>,
    fetcher: Option<ContentFetcher>,
    validator: CertificateValidator,
    analysis_timeout: Duration,
    max_concurrency: usize,
    model_available: bool,
}

impl Analyzer {
    pub fn new(classifier: Arc<dyn Classifier>, config: &EngineConfig) -> Self {
        let fetcher = if config.fetch_content {
            match ContentFetcher::new(config.fetch_timeout) {
                Ok(fetcher) => Some(fetcher),
                Err(e) => {
                    log::warn!("Content fetching disabled, HTTP client failed to build: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let model_available = classifier.status().model_loaded;

        Self {
            classifier,
            fetcher,
            validator: CertificateValidator::new(config.tls_timeout),
            analysis_timeout: config.analysis_timeout,
            max_concurrency: config.max_concurrency.max(1),
            model_available,
        }
    }

    /// Load the configured artifact (or fall back) and build the pipeline
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(load_classifier(config), config)
    }

    pub fn status(&self) -> EngineStatus {
        self.classifier.status()
    }

    pub fn model_available(&self) -> bool {
        self.model_available
    }

    pub fn content_fetch_enabled(&self) -> bool {
        self.fetcher.is_some()
    }

    /// Analyze one URL. Always returns a result.
    pub async fn analyze(&self, url: &str) -> PredictionResult {
        let parsed = match ParsedUrl::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("Rejected input: {}", e);
                return PredictionResult::invalid(url, e.to_string(), self.model_available);
            }
        };

        match tokio::time::timeout(self.analysis_timeout, self.analyze_parsed(url, &parsed)).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("Analysis of {} timed out after {:?}", parsed.host(), self.analysis_timeout);
                PredictionResult::failed(
                    url,
                    PredictionLabel::Unknown,
                    format!("analysis timed out after {} ms", self.analysis_timeout.as_millis()),
                    false,
                    self.model_available,
                )
            }
        }
    }

    async fn analyze_parsed(&self, url: &str, parsed: &ParsedUrl) -> PredictionResult {
        let (verdict, valid_ssl) = tokio::join!(self.classify(parsed), self.validator.validate_parsed(parsed));

        match verdict {
            Ok(verdict) => {
                log::debug!(
                    "{} → phishing={} p={:?} ssl={}",
                    parsed.host(),
                    verdict.is_phishing,
                    verdict.probability,
                    valid_ssl
                );
                PredictionResult::from_verdict(url, verdict, valid_ssl)
            }
            Err(e) => {
                log::warn!("Classification failed for {}: {}", parsed.host(), e);
                PredictionResult::failed(url, PredictionLabel::Error, e.to_string(), valid_ssl, self.model_available)
            }
        }
    }

    async fn classify(&self, parsed: &ParsedUrl) -> Result<Verdict, ClassificationError> {
        let page = match &self.fetcher {
            Some(fetcher) => fetcher.fetch(parsed).await,
            None => None,
        };

        let vector = extract_parsed(parsed, page.as_ref());
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Features for {}: {}", parsed.host(), vector.to_log_entry());
        }

        let features = vector.to_feature_map();
        self.classifier.predict(ClassifierInput {
            url: parsed.raw(),
            features: &features,
        })
    }

    /// Analyze many URLs concurrently. Results come back in input order.
    pub async fn analyze_batch(&self, urls: Vec<String>) -> Vec<PredictionResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, url) in urls.iter().cloned().enumerate() {
            let analyzer = self.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, analyzer.analyze(&url).await)
            });
        }

        let mut results: Vec<Option<PredictionResult>> = vec![None; urls.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => log::error!("Analysis task failed: {}", e),
            }
        }

        results
            .into_iter()
            .zip(urls)
            .map(|(result, url)| {
                result.unwrap_or_else(|| {
                    PredictionResult::failed(
                        &url,
                        PredictionLabel::Error,
                        "analysis task failed".to_string(),
                        false,
                        self.model_available,
                    )
                })
            })
            .collect()
    }

    /// TLS probe only, no classification
    pub async fn check_certificates(&self, urls: Vec<String>) -> Vec<CertificateReport> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, url) in urls.iter().cloned().enumerate() {
            let validator = self.validator.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, validator.validate(&url).await)
            });
        }

        let mut valid = vec![false; urls.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, ok)) => valid[index] = ok,
                Err(e) => log::error!("Certificate task failed: {}", e),
            }
        }

        urls.into_iter()
            .zip(valid)
            .map(|(url, valid_ssl)| CertificateReport { url, valid_ssl })
            .collect()
    }
}
