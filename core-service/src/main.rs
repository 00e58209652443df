//! PhishGuard CLI - analyze URLs from the command line
//!
//! ```text
//! phishguard [--fetch] <url>...
//! ```
//!
//! Prints the results as JSON on stdout; logs go to stderr.

use std::process::ExitCode;

use anyhow::Context;
use phishguard_core::constants::{APP_NAME, APP_VERSION};
use phishguard_core::{Analyzer, EngineConfig};

const USAGE: &str = "usage: phishguard [--fetch] <url>...";

#[derive(Debug)]
struct Args {
    fetch: bool,
    urls: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut fetch = false;
    let mut urls = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--fetch" => fetch = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {}\n{}", flag, USAGE)),
            _ => urls.push(arg),
        }
    }

    if urls.is_empty() {
        return Err(USAGE.to_string());
    }

    Ok(Args { fetch, urls })
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let mut config = EngineConfig::from_env();
    config.fetch_content |= args.fetch;

    let analyzer = Analyzer::from_config(&config);
    let status = analyzer.status();
    log::info!("Engine mode {:?} ({})", status.mode, status.model_name);

    let results = analyzer.analyze_batch(args.urls).await;

    let output = serde_json::json!({
        "results": results,
        "count": results.len(),
        "modelAvailable": analyzer.model_available(),
    });
    let rendered = serde_json::to_string_pretty(&output).context("failed to render results")?;
    println!("{}", rendered);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["--fetch", "https://example.com", "http://a.io"]).unwrap();
        assert!(parsed.fetch);
        assert_eq!(parsed.urls, vec!["https://example.com", "http://a.io"]);

        let parsed = args(&["example"]).unwrap();
        assert!(!parsed.fetch);
    }

    #[test]
    fn test_usage_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["--fetch"]).is_err());
        assert!(args(&["--bogus", "https://example.com"]).unwrap_err().contains("--bogus"));
    }
}
