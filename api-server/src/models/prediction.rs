//! Prediction request/response models

use phishguard_core::{CertificateReport, PredictionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `"urls"` may be a single string or a list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UrlList {
    One(String),
    Many(Vec<Value>),
}

impl UrlList {
    fn is_empty(&self) -> bool {
        match self {
            UrlList::One(url) => url.trim().is_empty(),
            UrlList::Many(urls) => urls.is_empty(),
        }
    }

    fn into_entries(self) -> Vec<UrlEntry> {
        match self {
            UrlList::One(url) => vec![UrlEntry::Url(url)],
            UrlList::Many(values) => values.into_iter().map(UrlEntry::from).collect(),
        }
    }
}

/// One position of the submitted list
#[derive(Debug, Clone, PartialEq)]
pub enum UrlEntry {
    Url(String),
    /// Not a string; carries the JSON text for echoing back
    NotAString(String),
}

impl From<Value> for UrlEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::String(url) => UrlEntry::Url(url),
            other => UrlEntry::NotAString(other.to_string()),
        }
    }
}

/// Body of `POST /predict`
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub url: Option<Value>,
    #[serde(default)]
    pub urls: Option<UrlList>,
}

impl PredictRequest {
    /// `urls` wins when non-empty, otherwise the single `url`
    pub fn into_entries(self) -> Vec<UrlEntry> {
        match (self.urls, self.url) {
            (Some(urls), _) if !urls.is_empty() => urls.into_entries(),
            (_, Some(Value::Null)) | (_, None) => Vec::new(),
            (_, Some(Value::String(url))) if url.trim().is_empty() => Vec::new(),
            (_, Some(url)) => vec![UrlEntry::from(url)],
        }
    }
}

/// Body of `POST /analyze-batch`
#[derive(Debug, Default, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub urls: Option<UrlList>,
}

impl BatchRequest {
    pub fn into_entries(self) -> Vec<UrlEntry> {
        match self.urls {
            Some(urls) if !urls.is_empty() => urls.into_entries(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub results: Vec<PredictionResult>,
    pub count: usize,
    pub success: bool,
    pub model_available: bool,
}

#[derive(Debug, Serialize)]
pub struct CertificateResponse {
    pub results: Vec<CertificateReport>,
}
