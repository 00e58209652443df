//! Lexical / Structural Feature Extraction
//!
//! Character statistics and component lengths of the URL. String-level
//! counts run over the trimmed raw input (characters, not bytes); component
//! lengths use the normalized parse. Digits are ASCII `0-9` only; other
//! Unicode numerics (`½`, `٣`) count as special characters.

use once_cell::sync::Lazy;
use regex::Regex;

use super::url::ParsedUrl;
use super::vector::{FeatureExtractor, FeatureVector};

/// `%XX` hex escape
static PERCENT_ESCAPE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"%[0-9A-Fa-f]{2}")
        .map_err(|e| log::error!("percent escape pattern: {}", e))
        .ok()
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexicalFeatures {
    pub url_length: usize,
    pub host_length: usize,
    pub path_length: usize,
    pub query_length: usize,
    pub fragment_length: usize,

    pub num_dots: usize,
    pub num_hyphens: usize,
    pub num_underscores: usize,
    pub num_slashes: usize,
    pub num_equals: usize,
    pub num_ampersands: usize,
    pub num_at: usize,
    pub num_questionmarks: usize,
    pub num_percent_escapes: usize,

    pub num_digits: usize,
    pub num_letters: usize,
    pub num_special: usize,
    pub num_repeats: usize,

    pub is_ip_host: bool,
    pub num_subdomains: usize,
    pub tld_length: usize,
    pub has_www_prefix: bool,
    pub is_https: bool,
}

impl LexicalFeatures {
    pub fn from_url(parsed: &ParsedUrl) -> Self {
        let raw = parsed.raw();
        let chars: Vec<char> = raw.chars().collect();
        let count = |c: char| chars.iter().filter(|&&x| x == c).count();

        let labels = parsed.domain_labels();
        let query = parsed.query();

        // The '?' introducing an empty query is only a delimiter
        let empty_query_delimiter = usize::from(query == Some(""));

        Self {
            url_length: chars.len(),
            host_length: parsed.host().chars().count(),
            path_length: parsed.path().chars().count(),
            query_length: query.map(|q| q.chars().count()).unwrap_or(0),
            fragment_length: parsed.fragment().map(|f| f.chars().count()).unwrap_or(0),

            num_dots: count('.'),
            num_hyphens: count('-'),
            num_underscores: count('_'),
            num_slashes: count('/'),
            num_equals: count('='),
            num_ampersands: count('&'),
            num_at: count('@'),
            num_questionmarks: count('?').saturating_sub(empty_query_delimiter),
            num_percent_escapes: count_percent_escapes(raw),

            num_digits: chars.iter().filter(|c| c.is_ascii_digit()).count(),
            num_letters: chars.iter().filter(|c| c.is_alphabetic()).count(),
            num_special: chars
                .iter()
                .filter(|c| !c.is_alphabetic() && !c.is_ascii_digit())
                .count(),
            num_repeats: chars.windows(2).filter(|w| w[0] == w[1]).count(),

            is_ip_host: parsed.is_ip_host(),
            num_subdomains: labels.len().saturating_sub(2),
            tld_length: labels.last().map(|l| l.chars().count()).unwrap_or(0),
            has_www_prefix: parsed.host().starts_with("www."),
            is_https: parsed.is_https(),
        }
    }

    fn ratio(&self, n: usize) -> f64 {
        if self.url_length > 0 {
            n as f64 / self.url_length as f64
        } else {
            0.0
        }
    }

    pub fn letter_ratio(&self) -> f64 {
        self.ratio(self.num_letters)
    }

    pub fn digit_ratio(&self) -> f64 {
        self.ratio(self.num_digits)
    }

    pub fn special_char_ratio(&self) -> f64 {
        self.ratio(self.num_special)
    }

    pub fn obfuscation_ratio(&self) -> f64 {
        self.ratio(self.num_percent_escapes)
    }

    pub fn char_continuation_rate(&self) -> f64 {
        self.ratio(self.num_repeats)
    }
}

/// Non-overlapping `%XX` hex escapes, scanned left to right
fn count_percent_escapes(s: &str) -> usize {
    PERCENT_ESCAPE
        .as_ref()
        .map(|re| re.find_iter(s).count())
        .unwrap_or(0)
}

impl FeatureExtractor for LexicalFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set_by_name("url_length", self.url_length as f64);
        vector.set_by_name("host_length", self.host_length as f64);
        vector.set_by_name("path_length", self.path_length as f64);
        vector.set_by_name("query_length", self.query_length as f64);
        vector.set_by_name("fragment_length", self.fragment_length as f64);

        vector.set_by_name("num_dots", self.num_dots as f64);
        vector.set_by_name("num_hyphens", self.num_hyphens as f64);
        vector.set_by_name("num_underscores", self.num_underscores as f64);
        vector.set_by_name("num_slashes", self.num_slashes as f64);
        vector.set_by_name("num_equals", self.num_equals as f64);
        vector.set_by_name("num_ampersands", self.num_ampersands as f64);
        vector.set_by_name("num_at", self.num_at as f64);
        vector.set_by_name("num_questionmarks", self.num_questionmarks as f64);
        vector.set_by_name("num_percent_escapes", self.num_percent_escapes as f64);

        vector.set_by_name("num_digits", self.num_digits as f64);
        vector.set_by_name("num_letters", self.num_letters as f64);
        vector.set_by_name("letter_ratio", self.letter_ratio());
        vector.set_by_name("digit_ratio", self.digit_ratio());
        vector.set_by_name("special_char_ratio", self.special_char_ratio());
        vector.set_by_name("obfuscation_ratio", self.obfuscation_ratio());
        vector.set_by_name("char_continuation_rate", self.char_continuation_rate());

        vector.set_flag("is_ip_host", self.is_ip_host);
        vector.set_by_name("num_subdomains", self.num_subdomains as f64);
        vector.set_flag("has_subdomain", self.num_subdomains > 0);
        vector.set_by_name("tld_length", self.tld_length as f64);
        vector.set_flag("has_www_prefix", self.has_www_prefix);
        vector.set_flag("is_https", self.is_https);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexical(url: &str) -> LexicalFeatures {
        LexicalFeatures::from_url(&ParsedUrl::parse(url).unwrap())
    }

    #[test]
    fn test_counts_and_lengths() {
        let f = lexical("https://www.shop-example.co.uk/my_cart/item?id=5&ref=a@b#top");

        assert_eq!(f.url_length, 60);
        assert_eq!(f.host_length, "www.shop-example.co.uk".len());
        assert_eq!(f.path_length, "/my_cart/item".len());
        assert_eq!(f.query_length, "id=5&ref=a@b".len());
        assert_eq!(f.fragment_length, 3);
        assert_eq!(f.num_dots, 3);
        assert_eq!(f.num_hyphens, 1);
        assert_eq!(f.num_underscores, 1);
        assert_eq!(f.num_slashes, 4);
        assert_eq!(f.num_equals, 2);
        assert_eq!(f.num_ampersands, 1);
        assert_eq!(f.num_at, 1);
        assert_eq!(f.num_questionmarks, 1);
        assert_eq!(f.num_subdomains, 2);
        assert_eq!(f.tld_length, 2);
        assert!(f.has_www_prefix);
        assert!(f.is_https);
        assert!(!f.is_ip_host);
    }

    #[test]
    fn test_empty_query_has_no_questionmarks() {
        assert_eq!(lexical("http://example.com/").num_questionmarks, 0);
        assert_eq!(lexical("http://example.com/?").num_questionmarks, 0);
        assert_eq!(lexical("http://example.com/?a=1?b").num_questionmarks, 2);
    }

    #[test]
    fn test_dotted_quad_host() {
        let f = lexical("http://10.0.0.1/paypal/login");
        assert!(f.is_ip_host);
        assert_eq!(f.num_subdomains, 0);
        assert_eq!(f.tld_length, 0);
    }

    #[test]
    fn test_ratios() {
        let f = lexical("http://aa.io/");
        // 13 chars: 8 letters, 5 separators, repeats "tt" "//" "aa"
        assert_eq!(f.url_length, 13);
        assert_eq!(f.num_letters, 8);
        assert_eq!(f.num_special, 5);
        assert_eq!(f.num_repeats, 3);
        assert!((f.letter_ratio() - 8.0 / 13.0).abs() < 1e-12);
        assert_eq!(f.digit_ratio(), 0.0);
    }

    #[test]
    fn test_percent_escapes() {
        assert_eq!(count_percent_escapes("%41%42"), 2);
        assert_eq!(count_percent_escapes("%4"), 0);
        assert_eq!(count_percent_escapes("%zz%2F"), 1);
        assert_eq!(count_percent_escapes("%%41"), 1);
        assert_eq!(count_percent_escapes(""), 0);
    }

    #[test]
    fn test_only_ascii_digits_count() {
        // '½' and Arabic-Indic '٣' are numeric but not ASCII digits
        let f = lexical("http://example.com/½٣/42");
        assert_eq!(f.num_digits, 2);
        assert_eq!(f.num_letters, 14);
        assert_eq!(f.num_special, f.url_length - 16);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let url = "http://secure-login.example.net/verify?token=%2F%2Fabc";
        let mut a = FeatureVector::new();
        let mut b = FeatureVector::new();
        lexical(url).extract(&mut a);
        lexical(url).extract(&mut b);
        assert_eq!(a, b);
    }
}
