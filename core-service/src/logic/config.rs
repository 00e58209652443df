//! Engine Configuration
//!
//! Runtime switches for the analysis pipeline. Built once at startup from the
//! environment (see `constants`) and shared read-only afterwards.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

/// What the degraded predictor answers when no trained artifact is usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Every URL is reported as phishing
    AlwaysPhishing,
    /// Majority vote over a handful of lexical red flags
    Heuristic,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::Heuristic
    }
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always_phishing" | "always-phishing" | "constant" => Ok(FallbackPolicy::AlwaysPhishing),
            "heuristic" => Ok(FallbackPolicy::Heuristic),
            other => Err(format!("unknown fallback policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub model_path: PathBuf,
    pub fetch_content: bool,
    pub fetch_timeout: Duration,
    pub tls_timeout: Duration,
    pub analysis_timeout: Duration,
    pub max_concurrency: usize,
    pub fallback_policy: FallbackPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            fetch_content: false,
            fetch_timeout: Duration::from_millis(constants::DEFAULT_FETCH_TIMEOUT_MS),
            tls_timeout: Duration::from_millis(constants::DEFAULT_TLS_TIMEOUT_MS),
            analysis_timeout: Duration::from_millis(constants::DEFAULT_ANALYSIS_TIMEOUT_MS),
            max_concurrency: constants::DEFAULT_MAX_CONCURRENCY,
            fallback_policy: FallbackPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let fallback_policy = constants::get_fallback_policy()
            .parse()
            .unwrap_or_else(|e| {
                log::warn!("{} - using heuristic fallback", e);
                FallbackPolicy::Heuristic
            });

        Self {
            model_path: PathBuf::from(constants::get_model_path()),
            fetch_content: constants::is_content_fetch_enabled(),
            fetch_timeout: Duration::from_millis(constants::get_fetch_timeout_ms()),
            tls_timeout: Duration::from_millis(constants::get_tls_timeout_ms()),
            analysis_timeout: Duration::from_millis(constants::get_analysis_timeout_ms()),
            max_concurrency: constants::get_max_concurrency(),
            fallback_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_policy_parse() {
        assert_eq!("heuristic".parse::<FallbackPolicy>(), Ok(FallbackPolicy::Heuristic));
        assert_eq!("ALWAYS_PHISHING".parse::<FallbackPolicy>(), Ok(FallbackPolicy::AlwaysPhishing));
        assert!("coin-flip".parse::<FallbackPolicy>().is_err());
    }

    #[test]
    fn test_default_config_is_offline() {
        let config = EngineConfig::default();
        assert!(!config.fetch_content);
        assert_eq!(config.tls_timeout, Duration::from_secs(1));
        assert!(config.max_concurrency > 0);
    }
}
