// Tests for locale-aware URL normalization

use seoaudit_core::locale::{extract_base_url, is_locale_code, remove_locale_code};

const SAMPLE_URLS: &[&str] = &[
    "https://sg.sulwhasoo.com/products/first-care",
    "https://www.laneige.com/kr/ko/skincare/water-bank.html",
    "https://www.sulwhasoo.com/int/en/",
    "https://hk.sulwhasoo.com/tc_s/products/serum?utm=1",
    "https://hk.sulwhasoo.com/en_s/tc_s/",
    "https://hk.sulwhasoo.com/en_s//en_s",
    "https://www.brand.com/k1/ko/page",
    "http://127.0.0.1:8080/en_s/x",
    "https://www.brand.com/",
    "not a url",
];

// ============================================================================
// extract_base_url
// ============================================================================

#[test]
fn test_base_url_defaults_to_origin() {
    assert_eq!(
        extract_base_url("https://sg.brand.com/products/x"),
        "https://sg.brand.com/"
    );
}

#[test]
fn test_base_url_keeps_country_language_on_www() {
    assert_eq!(
        extract_base_url("https://www.laneige.com/kr/ko/skincare/water-bank.html"),
        "https://www.laneige.com/kr/ko/"
    );
    assert_eq!(
        extract_base_url("https://www.laneige.com/jp/ja/"),
        "https://www.laneige.com/jp/ja/"
    );
}

#[test]
fn test_base_url_requires_www_host() {
    assert_eq!(
        extract_base_url("https://shop.brand.com/kr/ko/page"),
        "https://shop.brand.com/"
    );
}

#[test]
fn test_base_url_requires_two_alphabetic_segments() {
    assert_eq!(
        extract_base_url("https://www.sulwhasoo.com/int/en/"),
        "https://www.sulwhasoo.com/"
    );
    assert_eq!(
        extract_base_url("https://www.brand.com/k1/ko/page"),
        "https://www.brand.com/"
    );
    assert_eq!(
        extract_base_url("https://www.brand.com/kr/"),
        "https://www.brand.com/"
    );
}

#[test]
fn test_base_url_is_idempotent() {
    for url in SAMPLE_URLS {
        let once = extract_base_url(url);
        assert_eq!(extract_base_url(&once), once, "not idempotent for {}", url);
    }
}

// ============================================================================
// remove_locale_code
// ============================================================================

#[test]
fn test_remove_locale_code_strips_suffix_segment() {
    assert_eq!(
        remove_locale_code("https://hk.sulwhasoo.com/tc_s/"),
        "https://hk.sulwhasoo.com/"
    );
    assert_eq!(
        remove_locale_code("https://hk.sulwhasoo.com/en_s/products/serum"),
        "https://hk.sulwhasoo.com/products/serum"
    );
}

#[test]
fn test_remove_locale_code_leaves_other_paths() {
    assert_eq!(
        remove_locale_code("https://www.laneige.com/kr/ko/"),
        "https://www.laneige.com/kr/ko/"
    );
    assert_eq!(
        remove_locale_code("https://sg.brand.com/products/tc_s"),
        "https://sg.brand.com/products/tc_s"
    );
}

#[test]
fn test_remove_locale_code_skips_empty_segments() {
    assert_eq!(
        remove_locale_code("https://hk.sulwhasoo.com/en_s//en_s"),
        "https://hk.sulwhasoo.com/"
    );
    assert_eq!(
        remove_locale_code("https://hk.sulwhasoo.com/tc_s//products/serum"),
        "https://hk.sulwhasoo.com/products/serum"
    );
}

#[test]
fn test_remove_locale_code_is_idempotent() {
    for url in SAMPLE_URLS {
        let once = remove_locale_code(url);
        assert_eq!(remove_locale_code(&once), once, "not idempotent for {}", url);
    }
}

#[test]
fn test_prefix_forms_become_comparable() {
    let key = remove_locale_code("https://hk.sulwhasoo.com/tc_s/");
    let base = remove_locale_code(&extract_base_url(
        "https://hk.sulwhasoo.com/tc_s/products/serum",
    ));
    assert!(base.starts_with(&key));
}

#[test]
fn test_is_locale_code() {
    assert!(is_locale_code("tc_a"));
    assert!(!is_locale_code("kr"));
    assert!(!is_locale_code("t_cs"));
}
