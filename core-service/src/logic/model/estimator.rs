//! Primary estimators
//!
//! Tree ensembles and a linear model, exported from the training side as
//! plain node/coefficient arrays. Every estimator answers the probability
//! of the phishing class for an already scaled row.

use serde::Deserialize;

use super::inference::ClassificationError;

pub trait Estimator: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> &'static str;

    /// Width of the rows the estimator was fit on
    fn n_features(&self) -> usize;

    /// Probability of the phishing class, in [0, 1]
    fn predict_proba(&self, x: &[f64]) -> Result<f64, ClassificationError>;
}

fn check_width(expected: usize, x: &[f64]) -> Result<(), ClassificationError> {
    if x.len() != expected {
        return Err(ClassificationError::DimensionMismatch {
            expected,
            actual: x.len(),
        });
    }
    Ok(())
}

// ============================================================================
// DECISION TREE
// ============================================================================

/// Binary tree in parallel-array form. Leaves have both children set to -1;
/// internal nodes send `x[feature] <= threshold` left.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeNodes {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (counts or fractions)
    pub value: Vec<Vec<f64>>,
}

const LEAF: i64 = -1;

impl TreeNodes {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Structural checks. Children must point strictly forward, which rules
    /// out cycles and bounds every walk by the node count.
    pub fn validate(&self, n_features: usize, positive_class: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if [self.children_right.len(), self.feature.len(), self.threshold.len(), self.value.len()]
            .iter()
            .any(|len| *len != n)
        {
            return Err("tree arrays have different lengths".into());
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            let values = &self.value[i];

            if values.len() <= positive_class {
                return Err(format!("node {} has {} class weights", i, values.len()));
            }
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(format!("node {} has invalid class weights", i));
            }

            match (left, right) {
                (LEAF, LEAF) => continue,
                (LEAF, _) | (_, LEAF) => return Err(format!("node {} has a single child", i)),
                _ => {}
            }

            for child in [left, right] {
                if child <= i as i64 || child as usize >= n {
                    return Err(format!("node {} has out-of-order child {}", i, child));
                }
            }

            let feature = self.feature[i];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {} splits on feature {} (width {})", i, feature, n_features));
            }
            if !self.threshold[i].is_finite() {
                return Err(format!("node {} has a non-finite threshold", i));
            }
        }

        Ok(())
    }

    /// Walk to a leaf and return its positive-class fraction.
    /// Assumes `validate` passed.
    fn leaf_proba(&self, x: &[f64], positive_class: usize) -> f64 {
        let mut node = 0usize;

        for _ in 0..self.node_count() {
            let left = self.children_left[node];
            if left == LEAF {
                break;
            }
            node = if x[self.feature[node] as usize] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }

        let values = &self.value[node];
        let total: f64 = values.iter().sum();
        if total > 0.0 {
            values[positive_class] / total
        } else {
            0.0
        }
    }
}

fn default_positive_class() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    #[serde(default = "default_positive_class")]
    pub positive_class: usize,
    #[serde(flatten)]
    pub tree: TreeNodes,
}

impl DecisionTree {
    pub fn validate(&self) -> Result<(), String> {
        self.tree.validate(self.n_features, self.positive_class)
    }
}

impl Estimator for DecisionTree {
    fn kind(&self) -> &'static str {
        "decision_tree"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: &[f64]) -> Result<f64, ClassificationError> {
        check_width(self.n_features, x)?;
        Ok(self.tree.leaf_proba(x, self.positive_class))
    }
}

// ============================================================================
// RANDOM FOREST
// ============================================================================

/// Mean of the per-tree leaf probabilities
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    #[serde(default = "default_positive_class")]
    pub positive_class: usize,
    pub trees: Vec<TreeNodes>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.positive_class)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl Estimator for RandomForest {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: &[f64]) -> Result<f64, ClassificationError> {
        check_width(self.n_features, x)?;

        let sum: f64 = self
            .trees
            .iter()
            .map(|t| t.leaf_proba(x, self.positive_class))
            .sum();

        Ok(sum / self.trees.len() as f64)
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("no coefficients".into());
        }
        if self.coefficients.iter().chain(std::iter::once(&self.intercept)).any(|v| !v.is_finite()) {
            return Err("non-finite coefficients".into());
        }
        Ok(())
    }

    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(x.iter())
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept
    }
}

impl Estimator for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, x: &[f64]) -> Result<f64, ClassificationError> {
        check_width(self.coefficients.len(), x)?;
        Ok(1.0 / (1.0 + (-self.decision_function(x)).exp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x[0] <= 0.5 → leaf [9, 1], else x[1] <= 2.0 → [5, 5] / [0, 10]
    pub(crate) fn small_tree() -> TreeNodes {
        TreeNodes {
            children_left: vec![1, -1, 3, -1, -1],
            children_right: vec![2, -1, 4, -1, -1],
            feature: vec![0, -2, 1, -2, -2],
            threshold: vec![0.5, -2.0, 2.0, -2.0, -2.0],
            value: vec![
                vec![14.0, 16.0],
                vec![9.0, 1.0],
                vec![5.0, 15.0],
                vec![5.0, 5.0],
                vec![0.0, 10.0],
            ],
        }
    }

    #[test]
    fn test_decision_tree_paths() {
        let tree = DecisionTree { n_features: 2, positive_class: 1, tree: small_tree() };
        tree.validate().unwrap();

        assert!((tree.predict_proba(&[0.0, 0.0]).unwrap() - 0.1).abs() < 1e-12);
        assert!((tree.predict_proba(&[0.5, 9.0]).unwrap() - 0.1).abs() < 1e-12);
        assert!((tree.predict_proba(&[1.0, 2.0]).unwrap() - 0.5).abs() < 1e-12);
        assert!((tree.predict_proba(&[1.0, 3.0]).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tree_validation_rejects_cycles_and_bad_features() {
        let mut tree = small_tree();
        tree.children_left[2] = 0;
        assert!(tree.validate(2, 1).is_err());

        let mut tree = small_tree();
        tree.feature[2] = 7;
        assert!(tree.validate(2, 1).is_err());

        let mut tree = small_tree();
        tree.children_right[0] = -1;
        assert!(tree.validate(2, 1).is_err());

        let mut tree = small_tree();
        tree.value.pop();
        assert!(tree.validate(2, 1).is_err());
    }

    #[test]
    fn test_random_forest_averages_trees() {
        let mut always_phish = small_tree();
        always_phish.value[1] = vec![0.0, 4.0];

        let forest = RandomForest {
            n_features: 2,
            positive_class: 1,
            trees: vec![small_tree(), always_phish],
        };
        forest.validate().unwrap();

        // tree 1 → 0.1, tree 2 → 1.0
        let p = forest.predict_proba(&[0.0, 0.0]).unwrap();
        assert!((p - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_empty_forest_is_invalid() {
        let forest = RandomForest { n_features: 2, positive_class: 1, trees: vec![] };
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_logistic_regression() {
        let model = LogisticRegression { coefficients: vec![1.0, -1.0], intercept: 0.0 };
        assert!((model.predict_proba(&[2.0, 2.0]).unwrap() - 0.5).abs() < 1e-12);
        assert!(model.predict_proba(&[5.0, 0.0]).unwrap() > 0.99);
        assert!(matches!(
            model.predict_proba(&[1.0]),
            Err(ClassificationError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_deserialize_decision_tree_params() {
        let json = r#"{
            "n_features": 1,
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [0, -2, -2],
            "threshold": [10.0, -2.0, -2.0],
            "value": [[1, 1], [1, 0], [0, 1]]
        }"#;
        let tree: DecisionTree = serde_json::from_str(json).unwrap();
        tree.validate().unwrap();
        assert_eq!(tree.positive_class, 1);
        assert_eq!(tree.predict_proba(&[20.0]).unwrap(), 1.0);
    }
}
