//! Character-Sequence Model - ONNX Runtime Integration
//!
//! Scores the encoded URL characters with an exported sequence network.
//! Input tensor `[1, sequence_length]` (f32 codes), output either a single
//! phishing probability or a two-class probability row.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::inference::ClassificationError;
use crate::logic::features::sequence::DEFAULT_SEQUENCE_LENGTH;

pub trait SequenceModel: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> &'static str;

    /// Length the URL is truncated / padded to
    fn sequence_length(&self) -> usize;

    /// Codes at or above this value are mapped to 0
    fn vocab_size(&self) -> Option<u32>;

    /// Probability of the phishing class, in [0, 1]
    fn predict_proba(&self, sequence: &[f32]) -> Result<f64, ClassificationError>;
}

/// ONNX session behind a mutex: running a session needs `&mut`
pub struct OnnxSequenceModel {
    session: Mutex<Session>,
    output_name: String,
    sequence_length: usize,
    vocab_size: Option<u32>,
    model_path: PathBuf,
}

impl std::fmt::Debug for OnnxSequenceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSequenceModel")
            .field("model_path", &self.model_path)
            .field("output_name", &self.output_name)
            .field("sequence_length", &self.sequence_length)
            .field("vocab_size", &self.vocab_size)
            .finish()
    }
}

impl OnnxSequenceModel {
    /// Load ONNX model from file
    pub fn load(
        model_path: &Path,
        sequence_length: Option<usize>,
        vocab_size: Option<u32>,
    ) -> Result<Self, String> {
        log::info!("Loading ONNX sequence model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(format!("Model not found: {}", model_path.display()));
        }

        let session = Session::builder()
            .map_err(|e| format!("Failed to create session builder: {}", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| format!("Failed to set optimization: {}", e))?
            .commit_from_file(model_path)
            .map_err(|e| format!("Failed to load model: {}", e))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| "No output defined".to_string())?;

        let sequence_length = sequence_length.unwrap_or(DEFAULT_SEQUENCE_LENGTH);
        if sequence_length == 0 {
            return Err("sequence_length must be positive".to_string());
        }

        log::info!("ONNX sequence model loaded (length {})", sequence_length);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            sequence_length,
            vocab_size,
            model_path: model_path.to_path_buf(),
        })
    }
}

impl SequenceModel for OnnxSequenceModel {
    fn kind(&self) -> &'static str {
        "onnx_sequence"
    }

    fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    fn vocab_size(&self) -> Option<u32> {
        self.vocab_size
    }

    fn predict_proba(&self, sequence: &[f32]) -> Result<f64, ClassificationError> {
        if sequence.len() != self.sequence_length {
            return Err(ClassificationError::DimensionMismatch {
                expected: self.sequence_length,
                actual: sequence.len(),
            });
        }

        let input_array = Array2::<f32>::from_shape_vec((1, self.sequence_length), sequence.to_vec())
            .map_err(|e| ClassificationError::Model(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ClassificationError::Model(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassificationError::Model(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ClassificationError::Model("No output".to_string()))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassificationError::Model(format!("Extract error: {}", e)))?;

        probability_from_output(output_tensor.1)
    }
}

/// One value → that value; a class row → its second column
pub fn probability_from_output(data: &[f32]) -> Result<f64, ClassificationError> {
    let raw = match data {
        [p] => *p,
        [_, p, ..] => *p,
        [] => return Err(ClassificationError::Model("Empty model output".to_string())),
    };

    if !raw.is_finite() {
        return Err(ClassificationError::Model(format!("Non-finite model output: {}", raw)));
    }

    Ok((raw as f64).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_from_output() {
        assert_eq!(probability_from_output(&[0.25]).unwrap(), 0.25);
        assert_eq!(probability_from_output(&[0.3, 0.7]).unwrap() as f32, 0.7);
        assert_eq!(probability_from_output(&[1.5]).unwrap(), 1.0);
        assert!(probability_from_output(&[]).is_err());
        assert!(probability_from_output(&[f32::NAN]).is_err());
    }

    #[test]
    fn test_missing_model_file() {
        let err = OnnxSequenceModel::load(Path::new("/nonexistent/seq.onnx"), None, None).unwrap_err();
        assert!(err.contains("Model not found"));
    }
}
