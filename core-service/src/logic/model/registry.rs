//! Estimator Registry
//!
//! Maps the `kind` tag of an artifact's estimator spec to a constructor.
//! Nothing is resolved by name at runtime beyond this table: an unknown tag
//! is a load error, never a guess.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::artifact::ArtifactError;
use super::estimator::{DecisionTree, Estimator, LogisticRegression, RandomForest};
use super::sequence::{OnnxSequenceModel, SequenceModel};

/// `{ "kind": "...", ...params }` as stored in the artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorSpec {
    pub kind: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl EstimatorSpec {
    fn params_value(&self) -> serde_json::Value {
        serde_json::Value::Object(self.params.clone())
    }
}

/// What constructors may need beyond their own params
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// Directory of the artifact file; relative model paths resolve here
    pub base_dir: PathBuf,
}

impl LoadContext {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

pub type EstimatorCtor = fn(serde_json::Value, &LoadContext) -> Result<Box<dyn Estimator>, ArtifactError>;
pub type SequenceModelCtor = fn(serde_json::Value, &LoadContext) -> Result<Box<dyn SequenceModel>, ArtifactError>;

pub struct EstimatorRegistry {
    estimators: HashMap<&'static str, EstimatorCtor>,
    sequence_models: HashMap<&'static str, SequenceModelCtor>,
}

impl EstimatorRegistry {
    pub fn empty() -> Self {
        Self {
            estimators: HashMap::new(),
            sequence_models: HashMap::new(),
        }
    }

    /// Every kind this build knows how to load
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register_estimator("random_forest", build_random_forest);
        registry.register_estimator("decision_tree", build_decision_tree);
        registry.register_estimator("logistic_regression", build_logistic_regression);
        registry.register_sequence_model("onnx_sequence", build_onnx_sequence);
        registry
    }

    pub fn register_estimator(&mut self, kind: &'static str, ctor: EstimatorCtor) {
        self.estimators.insert(kind, ctor);
    }

    pub fn register_sequence_model(&mut self, kind: &'static str, ctor: SequenceModelCtor) {
        self.sequence_models.insert(kind, ctor);
    }

    pub fn build_estimator(&self, spec: &EstimatorSpec, ctx: &LoadContext) -> Result<Box<dyn Estimator>, ArtifactError> {
        let ctor = self
            .estimators
            .get(spec.kind.as_str())
            .ok_or_else(|| ArtifactError::UnknownKind(spec.kind.clone()))?;
        ctor(spec.params_value(), ctx)
    }

    pub fn build_sequence_model(&self, spec: &EstimatorSpec, ctx: &LoadContext) -> Result<Box<dyn SequenceModel>, ArtifactError> {
        let ctor = self
            .sequence_models
            .get(spec.kind.as_str())
            .ok_or_else(|| ArtifactError::UnknownKind(spec.kind.clone()))?;
        ctor(spec.params_value(), ctx)
    }

    pub fn estimator_kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.estimators.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn sequence_model_kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.sequence_models.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

impl Default for EstimatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

fn invalid(kind: &str, reason: impl std::fmt::Display) -> ArtifactError {
    ArtifactError::InvalidEstimator {
        kind: kind.to_string(),
        reason: reason.to_string(),
    }
}

fn build_random_forest(params: serde_json::Value, _: &LoadContext) -> Result<Box<dyn Estimator>, ArtifactError> {
    let forest: RandomForest = serde_json::from_value(params).map_err(|e| invalid("random_forest", e))?;
    forest.validate().map_err(|e| invalid("random_forest", e))?;
    Ok(Box::new(forest))
}

fn build_decision_tree(params: serde_json::Value, _: &LoadContext) -> Result<Box<dyn Estimator>, ArtifactError> {
    let tree: DecisionTree = serde_json::from_value(params).map_err(|e| invalid("decision_tree", e))?;
    tree.validate().map_err(|e| invalid("decision_tree", e))?;
    Ok(Box::new(tree))
}

fn build_logistic_regression(params: serde_json::Value, _: &LoadContext) -> Result<Box<dyn Estimator>, ArtifactError> {
    let model: LogisticRegression = serde_json::from_value(params).map_err(|e| invalid("logistic_regression", e))?;
    model.validate().map_err(|e| invalid("logistic_regression", e))?;
    Ok(Box::new(model))
}

#[derive(Debug, Deserialize)]
struct OnnxSequenceParams {
    path: String,
    #[serde(default)]
    sequence_length: Option<usize>,
    #[serde(default)]
    vocab_size: Option<u32>,
}

fn build_onnx_sequence(params: serde_json::Value, ctx: &LoadContext) -> Result<Box<dyn SequenceModel>, ArtifactError> {
    let params: OnnxSequenceParams = serde_json::from_value(params).map_err(|e| invalid("onnx_sequence", e))?;
    let model = OnnxSequenceModel::load(&ctx.resolve(&params.path), params.sequence_length, params.vocab_size)
        .map_err(ArtifactError::Runtime)?;
    Ok(Box::new(model))
}
