//! PhishGuard Core
//!
//! URL → feature vector → classifier pipeline, plus the TLS certificate probe
//! reported next to every prediction.
//!
//! ```text
//! url ──► features ──► schema::reconcile ──► scaler ──► Classifier ──► label
//!   └──────────────► certificate::CertificateValidator ──────────────► validSSL
//! ```

pub mod constants;
pub mod logic;

pub use logic::analysis::{Analyzer, CertificateReport, PredictionLabel, PredictionResult};
pub use logic::config::{EngineConfig, FallbackPolicy};
pub use logic::model::{load_classifier, Classifier, EngineStatus};
