//! Fitted numeric scalers
//!
//! Stored in the artifact next to the feature list whose order produced the
//! fit statistics; column i of the scaler belongs to schema name i.

use serde::{Deserialize, Serialize};

use super::inference::ClassificationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// (x - mean) / scale; a zero scale is treated as 1
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// (x - min) / (max - min); a zero range is treated as 1. Not clipped,
    /// values outside the fit range land outside [0, 1]
    MinMax { min: Vec<f64>, max: Vec<f64> },
    /// Passthrough
    Identity,
}

impl Default for Scaler {
    fn default() -> Self {
        Scaler::Identity
    }
}

impl Scaler {
    pub fn kind(&self) -> &'static str {
        match self {
            Scaler::Standard { .. } => "standard",
            Scaler::MinMax { .. } => "min_max",
            Scaler::Identity => "identity",
        }
    }

    /// Number of columns the scaler was fit on (None for identity)
    pub fn width(&self) -> Option<usize> {
        match self {
            Scaler::Standard { mean, .. } => Some(mean.len()),
            Scaler::MinMax { min, .. } => Some(min.len()),
            Scaler::Identity => None,
        }
    }

    /// Check internal consistency against the schema width
    pub fn validate(&self, expected_width: usize) -> Result<(), String> {
        let (a, b) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax { min, max } => (min, max),
            Scaler::Identity => return Ok(()),
        };

        if a.len() != b.len() {
            return Err(format!("{} scaler parameter lengths differ ({} vs {})", self.kind(), a.len(), b.len()));
        }
        if a.len() != expected_width {
            return Err(format!("{} scaler fit on {} columns, schema has {}", self.kind(), a.len(), expected_width));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(format!("{} scaler has non-finite parameters", self.kind()));
        }

        Ok(())
    }

    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>, ClassificationError> {
        if let Some(width) = self.width() {
            if x.len() != width {
                return Err(ClassificationError::DimensionMismatch {
                    expected: width,
                    actual: x.len(),
                });
            }
        }

        let scaled = match self {
            Scaler::Standard { mean, scale } => x
                .iter()
                .zip(mean.iter().zip(scale.iter()))
                .map(|(v, (m, s))| {
                    let s = if *s == 0.0 { 1.0 } else { *s };
                    (v - m) / s
                })
                .collect(),
            Scaler::MinMax { min, max } => x
                .iter()
                .zip(min.iter().zip(max.iter()))
                .map(|(v, (lo, hi))| {
                    let range = if hi == lo { 1.0 } else { hi - lo };
                    (v - lo) / range
                })
                .collect(),
            Scaler::Identity => x.to_vec(),
        };

        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaler() {
        let scaler = Scaler::Standard {
            mean: vec![10.0, 0.0, 5.0],
            scale: vec![2.0, 1.0, 0.0],
        };
        let out = scaler.transform(&[14.0, -3.0, 7.0]).unwrap();
        assert_eq!(out, vec![2.0, -3.0, 2.0]);
    }

    #[test]
    fn test_min_max_scaler() {
        let scaler = Scaler::MinMax {
            min: vec![0.0, 10.0],
            max: vec![100.0, 10.0],
        };
        let out = scaler.transform(&[50.0, 10.0]).unwrap();
        assert_eq!(out, vec![0.5, 0.0]);
    }

    #[test]
    fn test_min_max_out_of_range_and_constant_column() {
        let scaler = Scaler::MinMax {
            min: vec![0.0, 3.0],
            max: vec![10.0, 3.0],
        };
        assert_eq!(scaler.transform(&[20.0, 5.0]).unwrap(), vec![2.0, 2.0]);
        assert_eq!(scaler.transform(&[-5.0, 1.0]).unwrap(), vec![-0.5, -2.0]);
    }

    #[test]
    fn test_width_mismatch_is_an_error() {
        let scaler = Scaler::Standard { mean: vec![0.0; 3], scale: vec![1.0; 3] };
        let err = scaler.transform(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err, ClassificationError::DimensionMismatch { expected: 3, actual: 2 });
    }

    #[test]
    fn test_validate() {
        let scaler = Scaler::Standard { mean: vec![0.0; 3], scale: vec![1.0; 2] };
        assert!(scaler.validate(3).is_err());

        let scaler = Scaler::MinMax { min: vec![0.0; 2], max: vec![1.0; 2] };
        assert!(scaler.validate(2).is_ok());
        assert!(scaler.validate(4).is_err());

        assert!(Scaler::Identity.validate(99).is_ok());
    }

    #[test]
    fn test_deserialize_tagged() {
        let scaler: Scaler = serde_json::from_str(r#"{"kind":"standard","mean":[1.0],"scale":[2.0]}"#).unwrap();
        assert_eq!(scaler.kind(), "standard");

        let scaler: Scaler = serde_json::from_str(r#"{"kind":"identity"}"#).unwrap();
        assert_eq!(scaler, Scaler::Identity);
    }
}
