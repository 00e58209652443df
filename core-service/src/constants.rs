//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment (or `.env`).

/// Default location of the trained artifact
pub const DEFAULT_MODEL_PATH: &str = "model/artifact.json";

/// Page content fetch timeout (milliseconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 3_000;

/// TLS handshake probe timeout (milliseconds)
pub const DEFAULT_TLS_TIMEOUT_MS: u64 = 1_000;

/// Bounds applied to the TLS timeout so a probe can never hang a request
pub const MIN_TLS_TIMEOUT_MS: u64 = 100;
pub const MAX_TLS_TIMEOUT_MS: u64 = 3_000;

/// Upper bound for the whole per-URL analysis (milliseconds)
pub const DEFAULT_ANALYSIS_TIMEOUT_MS: u64 = 10_000;

/// Number of URLs of one batch analysed concurrently
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Largest body accepted from a fetched page (bytes)
pub const MAX_CONTENT_BYTES: usize = 2 * 1024 * 1024;

/// Redirects followed by the page fetcher
pub const MAX_FETCH_REDIRECTS: usize = 5;

/// URLs longer than this are rejected before feature computation
pub const MAX_URL_LENGTH: usize = 8_192;

/// Standard HTTPS port probed by the certificate validator
pub const HTTPS_PORT: u16 = 443;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "PhishGuard";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Check if live page fetching is enabled (off unless explicitly requested)
pub fn is_content_fetch_enabled() -> bool {
    std::env::var("FETCH_PAGE_CONTENT")
        .map(|s| parse_flag(&s))
        .unwrap_or(false)
}

/// Get page fetch timeout from environment or use default
pub fn get_fetch_timeout_ms() -> u64 {
    std::env::var("FETCH_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FETCH_TIMEOUT_MS)
}

/// Get TLS probe timeout from environment or use default, clamped to sane bounds
pub fn get_tls_timeout_ms() -> u64 {
    std::env::var("TLS_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TLS_TIMEOUT_MS)
        .clamp(MIN_TLS_TIMEOUT_MS, MAX_TLS_TIMEOUT_MS)
}

/// Get per-URL analysis timeout from environment or use default
pub fn get_analysis_timeout_ms() -> u64 {
    std::env::var("ANALYSIS_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ANALYSIS_TIMEOUT_MS)
}

/// Get batch concurrency from environment or use default
pub fn get_max_concurrency() -> usize {
    std::env::var("MAX_CONCURRENCY")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or(DEFAULT_MAX_CONCURRENCY)
}

/// Get degraded-mode policy name from environment
pub fn get_fallback_policy() -> String {
    std::env::var("FALLBACK_POLICY")
        .unwrap_or_else(|_| "heuristic".to_string())
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
