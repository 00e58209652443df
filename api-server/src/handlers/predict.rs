//! Prediction handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use phishguard_core::{Analyzer, CertificateReport, PredictionResult};

use crate::models::{BatchRequest, CertificateResponse, PredictRequest, PredictResponse, UrlEntry};
use crate::{AppError, AppResult, AppState};

fn check_batch(entries: &[UrlEntry], max: usize) -> AppResult<()> {
    if entries.is_empty() {
        return Err(AppError::ValidationError("No URLs provided".to_string()));
    }
    if entries.len() > max {
        return Err(AppError::BatchTooLarge { count: entries.len(), max });
    }
    Ok(())
}

/// Split entries into analyzable URLs and their positions
fn split_entries(entries: &[UrlEntry]) -> (Vec<usize>, Vec<String>) {
    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| match entry {
            UrlEntry::Url(url) => Some((i, url.clone())),
            UrlEntry::NotAString(_) => None,
        })
        .unzip()
}

async fn analyze_entries(analyzer: &Analyzer, entries: Vec<UrlEntry>) -> Vec<PredictionResult> {
    let (positions, urls) = split_entries(&entries);
    let mut analyzed = positions.into_iter().zip(analyzer.analyze_batch(urls).await).peekable();

    let mut results = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match entry {
            UrlEntry::NotAString(raw) => results.push(PredictionResult::invalid(
                raw,
                "URL must be a string",
                analyzer.model_available(),
            )),
            UrlEntry::Url(url) => match analyzed.next_if(|(pos, _)| *pos == i) {
                Some((_, result)) => results.push(result),
                None => results.push(PredictionResult::invalid(url, "not analyzed", analyzer.model_available())),
            },
        }
    }
    results
}

/// Classify one or more URLs
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(request) = body?;
    let entries = request.into_entries();
    check_batch(&entries, state.config.max_batch_size)?;

    tracing::debug!("Processing {} URLs", entries.len());
    let results = analyze_entries(&state.analyzer, entries).await;

    let phishing = results
        .iter()
        .filter(|r| r.prediction == phishguard_core::PredictionLabel::Phishing)
        .count();
    tracing::info!("Analyzed {} URLs ({} phishing)", results.len(), phishing);

    Ok(Json(PredictResponse {
        count: results.len(),
        results,
        success: true,
        model_available: state.analyzer.model_available(),
    }))
}

/// Certificate validity only
pub async fn analyze_batch(
    State(state): State<AppState>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> AppResult<Json<CertificateResponse>> {
    let Json(request) = body?;
    let entries = request.into_entries();
    check_batch(&entries, state.config.max_batch_size)?;

    let (positions, urls) = split_entries(&entries);
    let mut checked = positions.into_iter().zip(state.analyzer.check_certificates(urls).await).peekable();

    let mut results = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        let report = match entry {
            UrlEntry::NotAString(raw) => CertificateReport { url: raw, valid_ssl: false },
            UrlEntry::Url(url) => checked
                .next_if(|(pos, _)| *pos == i)
                .map(|(_, report)| report)
                .unwrap_or(CertificateReport { url, valid_ssl: false }),
        };
        results.push(report);
    }

    Ok(Json(CertificateResponse { results }))
}
