//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the canonical feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Trained artifacts carry their own ordered name list and are aligned
//! against this layout by `schema::reconcile`, so a bump here never breaks an
//! older artifact silently: unknown names are zero-filled, extras dropped.

use crc32fast::Hasher;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Lexical / structural (0-26) ===
    "url_length",             // 0
    "host_length",            // 1
    "path_length",            // 2
    "query_length",           // 3
    "fragment_length",        // 4
    "num_dots",               // 5
    "num_hyphens",            // 6
    "num_underscores",        // 7
    "num_slashes",            // 8
    "num_equals",             // 9
    "num_ampersands",         // 10
    "num_at",                 // 11
    "num_questionmarks",      // 12
    "num_percent_escapes",    // 13
    "num_digits",             // 14
    "num_letters",            // 15
    "letter_ratio",           // 16
    "digit_ratio",            // 17
    "special_char_ratio",     // 18
    "obfuscation_ratio",      // 19
    "char_continuation_rate", // 20
    "is_ip_host",             // 21
    "num_subdomains",         // 22
    "has_subdomain",          // 23
    "tld_length",             // 24
    "has_www_prefix",         // 25
    "is_https",               // 26

    // === Suspicious keywords (27-48) ===
    "kw_login",               // 27
    "kw_signin",              // 28
    "kw_verify",              // 29
    "kw_secure",              // 30
    "kw_account",             // 31
    "kw_update",              // 32
    "kw_password",            // 33
    "kw_confirm",             // 34
    "kw_banking",             // 35
    "kw_bank",                // 36
    "kw_paypal",              // 37
    "kw_ebay",                // 38
    "kw_webscr",              // 39
    "kw_wallet",              // 40
    "kw_crypto",              // 41
    "kw_pay",                 // 42
    "kw_suspend",             // 43
    "kw_unlock",              // 44
    "kw_billing",             // 45
    "kw_support",             // 46
    "suspicious_words_count", // 47
    "has_suspicious_words",   // 48

    // === Page content, zero when not fetched (49-68) ===
    "num_lines",                // 49
    "largest_line_length",      // 50
    "num_scripts",              // 51
    "num_stylesheets",          // 52
    "num_images",               // 53
    "num_iframes",              // 54
    "num_forms",                // 55
    "has_password_field",       // 56
    "has_submit_button",        // 57
    "has_hidden_fields",        // 58
    "has_viewport_meta",        // 59
    "has_title",                // 60
    "has_description_meta",     // 61
    "has_robots_meta",          // 62
    "has_favicon",              // 63
    "has_copyright",            // 64
    "has_external_form_action", // 65
    "num_redirect_indicators",  // 66
    "was_redirected",           // 67
    "final_url_is_https",       // 68
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 69;

/// Index of the first content-derived feature
pub const CONTENT_FEATURES_START: usize = 49;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version and the ordered names, NUL separated
pub fn hash_names<'a, I>(version: u8, names: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Hasher::new();
    hasher.update(&[version]);

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

/// Compute CRC32 hash of the canonical feature layout
pub fn compute_layout_hash() -> u32 {
    hash_names(FEATURE_VERSION, FEATURE_LAYOUT.iter().copied())
}

/// Get layout hash
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_names_are_unique() {
        let unique: HashSet<_> = FEATURE_LAYOUT.iter().collect();
        assert_eq!(unique.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_content_block_boundary() {
        assert_eq!(feature_name(CONTENT_FEATURES_START), Some("num_lines"));
        assert_eq!(feature_name(CONTENT_FEATURES_START - 1), Some("has_suspicious_words"));
        assert_eq!(feature_name(FEATURE_COUNT - 1), Some("final_url_is_https"));
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_layout_hash_depends_on_order() {
        let forward = hash_names(1, ["a", "b"]);
        let reversed = hash_names(1, ["b", "a"]);
        let bumped = hash_names(2, ["a", "b"]);
        assert_ne!(forward, reversed);
        assert_ne!(forward, bumped);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("url_length"), Some(0));
        assert_eq!(feature_index("is_https"), Some(26));
        assert_eq!(feature_index("kw_login"), Some(27));
        assert_eq!(feature_index("nonexistent"), None);
    }
}
