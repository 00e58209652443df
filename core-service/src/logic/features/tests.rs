//! Integration tests for the extraction → reconciliation path

#[cfg(test)]
mod integration_tests {
    use crate::logic::features::{
        extract, extract_parsed, ExtractionError, ParsedUrl, PageContent, FEATURE_COUNT,
    };
    use crate::logic::schema::Schema;

    const SAMPLE_URLS: &[&str] = &[
        "http://example.com",
        "https://www.example.co.uk/path/to/page.html?q=1&r=2#section",
        "http://192.168.0.1:8080/admin/login.php",
        "https://login-verify-paypal.example.com/account",
        "https://xn--pple-43d.com/%41%42%43",
        "http://[2001:db8::1]/",
        "https://a.b.c.d.e.example.org/?",
    ];

    /// Every valid URL reconciles to exactly the schema length, all finite
    #[test]
    fn test_extract_then_reconcile_shape() {
        let training_schema = Schema::new([
            "url_length", "host_length", "is_ip_host", "kw_login",
            "suspicious_words_count", "HistoricalOnlyFeature", "num_forms",
        ]).unwrap();

        for url in SAMPLE_URLS {
            let map = extract(url).unwrap().to_feature_map();

            for schema in [&training_schema, &Schema::canonical()] {
                let vector = schema.reconcile(&map);
                assert_eq!(vector.len(), schema.len(), "{}", url);
                assert_eq!(vector.first_non_finite(), None, "{}", url);
            }
        }
    }

    #[test]
    fn test_canonical_extraction_covers_layout() {
        let vector = extract("https://example.com").unwrap();
        let (_, report) = Schema::canonical().reconcile_with_report(&vector.to_feature_map());
        assert!(report.is_exact());
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_not_a_url_is_rejected() {
        match extract("not a url") {
            Err(ExtractionError::InvalidUrl { url, .. }) => assert_eq!(url, "not a url"),
            other => panic!("expected invalid URL, got {:?}", other),
        }
    }

    #[test]
    fn test_suspicious_word_features() {
        let vector = extract("https://login-verify-paypal.example.com/account").unwrap();

        for name in ["kw_login", "kw_verify", "kw_paypal", "kw_account"] {
            assert_eq!(vector.get_by_name(name), Some(1.0), "{}", name);
        }
        assert!(vector.get_by_name("suspicious_words_count").unwrap() >= 4.0);
        assert_eq!(vector.get_by_name("has_suspicious_words"), Some(1.0));
    }

    #[test]
    fn test_ipv4_literal_sets_flag() {
        let vector = extract("http://192.168.0.1:8080/admin/login.php").unwrap();
        assert_eq!(vector.get_by_name("is_ip_host"), Some(1.0));
        assert_eq!(vector.get_by_name("num_subdomains"), Some(0.0));

        let vector = extract("http://example.com").unwrap();
        assert_eq!(vector.get_by_name("is_ip_host"), Some(0.0));
    }

    #[test]
    fn test_empty_query_yields_zero_questionmarks() {
        let vector = extract("https://a.b.c.d.e.example.org/?").unwrap();
        assert_eq!(vector.get_by_name("num_questionmarks"), Some(0.0));
        assert_eq!(vector.get_by_name("query_length"), Some(0.0));
    }

    #[test]
    fn test_lexical_family_is_reproducible() {
        for url in SAMPLE_URLS {
            assert_eq!(extract(url).unwrap(), extract(url).unwrap());
        }
    }

    #[test]
    fn test_content_only_touches_content_block() {
        let parsed = ParsedUrl::parse("https://example.com/login").unwrap();
        let page = PageContent::new("<form><input type=\"password\"></form>", "https://example.com/login");

        let without = extract_parsed(&parsed, None);
        let with = extract_parsed(&parsed, Some(&page));

        assert_eq!(with.get_by_name("has_password_field"), Some(1.0));
        assert_eq!(with.get_by_name("num_forms"), Some(1.0));
        assert_eq!(with.get_by_name("url_length"), without.get_by_name("url_length"));
        assert_eq!(with.get_by_name("kw_login"), without.get_by_name("kw_login"));
    }
}
