//! Inference Engine
//!
//! The `Classifier` seam and its trained implementation. A trained
//! classifier owns one loaded artifact and is shared read-only behind an
//! `Arc` for the life of the process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::artifact::TrainedArtifact;
use super::estimator::Estimator;
use super::scaler::Scaler;
use super::sequence::SequenceModel;
use super::{EngineMode, EngineStatus};
use crate::logic::features::sequence::encode_url;
use crate::logic::features::FeatureMap;
use crate::logic::schema::Schema;

/// Probabilities strictly above this are phishing
pub const DECISION_THRESHOLD: f64 = 0.5;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassificationError {
    #[error("feature {feature:?} is not a finite number")]
    NonFinite { feature: String },

    #[error("expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model runtime error: {0}")]
    Model(String),
}

/// Everything a classifier may look at for one URL
#[derive(Debug, Clone, Copy)]
pub struct ClassifierInput<'a> {
    /// Raw URL as submitted (trimmed), for sequence encoding
    pub url: &'a str,
    pub features: &'a FeatureMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub is_phishing: bool,
    /// None when no model produced a score
    pub probability: Option<f64>,
    pub model_available: bool,
    /// Why the verdict did not come from a trained model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
}

impl Verdict {
    /// 1 = phishing, 0 = legitimate
    pub fn label(&self) -> u8 {
        u8::from(self.is_phishing)
    }
}

pub trait Classifier: Send + Sync {
    fn predict(&self, input: ClassifierInput<'_>) -> Result<Verdict, ClassificationError>;

    fn status(&self) -> EngineStatus;
}

/// Arithmetic mean of the primary and sequence probabilities
pub fn combine_probabilities(primary: f64, sequence: f64) -> f64 {
    (primary + sequence) / 2.0
}

// ============================================================================
// TRAINED CLASSIFIER
// ============================================================================

pub struct TrainedClassifier {
    name: String,
    schema: Schema,
    scaler: Scaler,
    primary: Box<dyn Estimator>,
    secondary: Option<Box<dyn SequenceModel>>,
    loaded_at: DateTime<Utc>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl std::fmt::Debug for TrainedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedClassifier")
            .field("name", &self.name)
            .field("features", &self.schema.len())
            .field("scaler", &self.scaler.kind())
            .field("primary", &self.primary.kind())
            .field("secondary", &self.secondary.as_ref().map(|m| m.kind()))
            .finish()
    }
}

impl TrainedClassifier {
    pub fn new(artifact: TrainedArtifact) -> Self {
        Self {
            name: artifact.name,
            schema: artifact.schema,
            scaler: artifact.scaler,
            primary: artifact.primary,
            secondary: artifact.secondary,
            loaded_at: Utc::now(),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    pub fn mode(&self) -> EngineMode {
        if self.secondary.is_some() {
            EngineMode::Hybrid
        } else {
            EngineMode::Single
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn score(&self, input: ClassifierInput<'_>) -> Result<f64, ClassificationError> {
        let (vector, report) = self.schema.reconcile_with_report(input.features);
        if !report.is_exact() {
            log::debug!(
                "Reconciled {}: {} dropped, {} zero-filled",
                input.url,
                report.dropped.len(),
                report.missing.len()
            );
        }

        if let Some(i) = vector.first_non_finite() {
            return Err(ClassificationError::NonFinite {
                feature: self.schema.names()[i].clone(),
            });
        }

        let scaled = self.scaler.transform(vector.as_slice())?;
        let primary = self.primary.predict_proba(&scaled)?;

        let Some(sequence_model) = &self.secondary else {
            return Ok(primary);
        };

        let encoded = encode_url(input.url, sequence_model.sequence_length(), sequence_model.vocab_size());
        let sequence = sequence_model.predict_proba(&encoded)?;

        Ok(combine_probabilities(primary, sequence))
    }
}

impl Classifier for TrainedClassifier {
    fn predict(&self, input: ClassifierInput<'_>) -> Result<Verdict, ClassificationError> {
        let start = Instant::now();
        let probability = self.score(input)?;

        self.latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        Ok(Verdict {
            is_phishing: probability > DECISION_THRESHOLD,
            probability: Some(probability),
            model_available: true,
            degraded_reason: None,
        })
    }

    fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_loaded: true,
            mode: self.mode(),
            model_name: self.name.clone(),
            degraded_reason: None,
            feature_count: self.schema.len(),
            layout_hash: Some(self.schema.layout_hash()),
            loaded_at: Some(self.loaded_at),
            avg_latency_ms: avg,
            inference_count: count,
        }
    }
}
