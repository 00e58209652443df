//! Model Module - Classification Engine
//!
//! Loads the trained artifact once at startup and hands out a shared
//! `Classifier`. A missing or broken artifact never stops the process: the
//! loader falls back to the degraded predictor and says why.

pub mod artifact;
pub mod estimator;
pub mod fallback;
pub mod inference;
pub mod registry;
pub mod scaler;
pub mod sequence;


use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::config::EngineConfig;

// Re-export common types
pub use artifact::{load_artifact, ArtifactDocument, ArtifactError, TrainedArtifact};
pub use fallback::FallbackClassifier;
pub use inference::{ClassificationError, Classifier, ClassifierInput, TrainedClassifier, Verdict};
pub use registry::EstimatorRegistry;
pub use scaler::Scaler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// Primary estimator only
    Single,
    /// Primary averaged with the sequence model
    Hybrid,
    /// No usable artifact
    Degraded,
}

/// Engine Status for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub mode: EngineMode,
    pub model_name: String,
    pub degraded_reason: Option<String>,
    pub feature_count: usize,
    pub layout_hash: Option<u32>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

/// Build the process-wide classifier from the configured artifact
pub fn load_classifier(config: &EngineConfig) -> Arc<dyn Classifier> {
    load_classifier_with(&config.model_path, config, &EstimatorRegistry::with_defaults())
}

pub fn load_classifier_with(
    path: &Path,
    config: &EngineConfig,
    registry: &EstimatorRegistry,
) -> Arc<dyn Classifier> {
    match load_artifact(path, registry) {
        Ok(artifact) => {
            let classifier = TrainedClassifier::new(artifact);
            log::info!("Classifier loaded from {} ({:?} mode)", path.display(), classifier.mode());
            Arc::new(classifier)
        }
        Err(e) => {
            log::warn!(
                "Model unavailable ({}) - running degraded with {:?} fallback",
                e,
                config.fallback_policy
            );
            Arc::new(FallbackClassifier::new(config.fallback_policy, e.to_string()))
        }
    }
}
