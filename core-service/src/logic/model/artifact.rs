//! Trained Artifact Loader
//!
//! One JSON document per trained model:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "rf-2024-05",
//!   "features": ["url_length", "..."],
//!   "scaler": { "kind": "standard", "mean": [..], "scale": [..] },
//!   "primary": { "kind": "random_forest", "n_features": 69, "trees": [..] },
//!   "secondary": { "kind": "onnx_sequence", "path": "seq.onnx" }
//! }
//! ```
//!
//! An optional `<artifact>.sha256` sidecar pins the file contents.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::estimator::Estimator;
use super::registry::{EstimatorRegistry, EstimatorSpec, LoadContext};
use super::scaler::Scaler;
use super::sequence::SequenceModel;
use crate::logic::schema::{Schema, SchemaError};

/// Highest artifact format this build reads
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported artifact format version {found} (max {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("invalid feature schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("incompatible artifact: {0}")]
    IncompatibleSchema(String),

    #[error("unknown estimator kind: {0}")]
    UnknownKind(String),

    #[error("invalid {kind} estimator: {reason}")]
    InvalidEstimator { kind: String, reason: String },

    #[error("model runtime error: {0}")]
    Runtime(String),
}

/// On-disk form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDocument {
    pub format_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub features: Vec<String>,
    #[serde(default)]
    pub scaler: Scaler,
    pub primary: EstimatorSpec,
    #[serde(default)]
    pub secondary: Option<EstimatorSpec>,
}

/// Loaded, validated and ready to score
#[derive(Debug)]
pub struct TrainedArtifact {
    pub name: String,
    pub schema: Schema,
    pub scaler: Scaler,
    pub primary: Box<dyn Estimator>,
    pub secondary: Option<Box<dyn SequenceModel>>,
}

pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compare the file against its sidecar, when there is one.
/// The sidecar may be bare hex or `sha256sum` output.
fn verify_checksum(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    let sidecar = sidecar_path(path);
    if !sidecar.exists() {
        log::debug!("No checksum sidecar for {}", path.display());
        return Ok(());
    }

    let contents = std::fs::read_to_string(&sidecar)?;
    let expected = contents
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    let actual = sha256_hex(bytes);

    if expected != actual {
        return Err(ArtifactError::ChecksumMismatch { expected, actual });
    }

    log::debug!("Checksum verified for {}", path.display());
    Ok(())
}

/// Read, verify and build an artifact from disk
pub fn load_artifact(path: &Path, registry: &EstimatorRegistry) -> Result<TrainedArtifact, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    verify_checksum(path, &bytes)?;

    let document: ArtifactDocument = serde_json::from_slice(&bytes)?;

    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let default_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());

    build_artifact(document, &LoadContext::new(base_dir), registry, default_name)
}

/// Validate a parsed document and construct its estimators
pub fn build_artifact(
    document: ArtifactDocument,
    ctx: &LoadContext,
    registry: &EstimatorRegistry,
    default_name: String,
) -> Result<TrainedArtifact, ArtifactError> {
    if document.format_version == 0 || document.format_version > ARTIFACT_FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: document.format_version,
            supported: ARTIFACT_FORMAT_VERSION,
        });
    }

    let schema = Schema::new(document.features)?;

    document
        .scaler
        .validate(schema.len())
        .map_err(ArtifactError::IncompatibleSchema)?;

    let primary = registry.build_estimator(&document.primary, ctx)?;
    if primary.n_features() != schema.len() {
        return Err(ArtifactError::IncompatibleSchema(format!(
            "{} expects {} features, schema has {}",
            primary.kind(),
            primary.n_features(),
            schema.len()
        )));
    }

    let secondary = document
        .secondary
        .as_ref()
        .map(|spec| registry.build_sequence_model(spec, ctx))
        .transpose()?;

    let name = document.name.unwrap_or(default_name);
    log::info!(
        "Artifact {} ready: {} features, scaler={}, primary={}, secondary={}",
        name,
        schema.len(),
        document.scaler.kind(),
        primary.kind(),
        secondary.as_ref().map(|m| m.kind()).unwrap_or("none")
    );

    Ok(TrainedArtifact {
        name,
        schema,
        scaler: document.scaler,
        primary,
        secondary,
    })
}
