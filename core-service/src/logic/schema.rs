//! Feature Schema Reconciler
//!
//! Aligns an extracted [`FeatureMap`] to the ordered name list an estimator
//! was trained on:
//! - names the schema does not know are dropped
//! - names the schema expects but the map lacks become 0.0
//! - output order is the schema order, always
//!
//! Reconciling is idempotent: feeding a reconciled vector back in (as a map)
//! against the same schema returns the same values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::layout::{hash_names, FEATURE_LAYOUT, FEATURE_VERSION};
use crate::logic::features::FeatureMap;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("schema has no feature names")]
    Empty,

    #[error("schema entry {0} has an empty name")]
    EmptyName(usize),

    #[error("schema lists {0:?} more than once")]
    Duplicate(String),
}

/// Ordered training-time feature names
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    names: Vec<String>,
    index: HashMap<String, usize>,
    layout_hash: u32,
}

impl Schema {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self, SchemaError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SchemaError::EmptyName(i));
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(SchemaError::Duplicate(name.clone()));
            }
        }

        let layout_hash = hash_names(FEATURE_VERSION, names.iter().map(String::as_str));

        Ok(Self { names, index, layout_hash })
    }

    /// The extractor's own layout
    pub fn canonical() -> Self {
        let names: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
        let index = names.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();
        let layout_hash = hash_names(FEATURE_VERSION, FEATURE_LAYOUT.iter().copied());

        Self { names, index, layout_hash }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    pub fn reconcile(&self, map: &FeatureMap) -> ReconciledVector {
        let mut values = vec![0.0; self.names.len()];
        for (name, value) in map.iter() {
            if let Some(i) = self.position(name) {
                values[i] = value;
            }
        }

        ReconciledVector {
            layout_hash: self.layout_hash,
            values,
        }
    }

    /// Same as `reconcile`, plus which names were dropped or synthesized
    pub fn reconcile_with_report(&self, map: &FeatureMap) -> (ReconciledVector, ReconcileReport) {
        let dropped = map
            .names()
            .filter(|n| self.position(n).is_none())
            .map(str::to_string)
            .collect();
        let missing = self
            .names
            .iter()
            .filter(|n| !map.contains(n))
            .cloned()
            .collect();

        (self.reconcile(map), ReconcileReport { dropped, missing })
    }
}

/// Numeric vector in schema order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledVector {
    pub layout_hash: u32,
    values: Vec<f64>,
}

impl ReconciledVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of the first NaN/inf entry
    pub fn first_non_finite(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_finite())
    }

    /// Named view, for feeding back through a reconciler
    pub fn to_feature_map(&self, schema: &Schema) -> FeatureMap {
        schema
            .names()
            .iter()
            .zip(self.values.iter())
            .map(|(n, v)| (n.clone(), *v))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// In the map, unknown to the schema
    pub dropped: Vec<String>,
    /// Expected by the schema, filled with 0.0
    pub missing: Vec<String>,
}

impl ReconcileReport {
    pub fn is_exact(&self) -> bool {
        self.dropped.is_empty() && self.missing.is_empty()
    }
}
