//! Locale-aware URL normalization used as the mapping lookup key.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Language plus brand suffix segment, e.g. `en_s` or `tc_l`.
static LOCALE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}_[a-z]$").expect("locale pattern is valid"));

pub fn is_locale_code(segment: &str) -> bool {
    LOCALE_CODE.is_match(segment)
}

fn is_two_letter(segment: &str) -> bool {
    segment.len() == 2 && segment.chars().all(|c| c.is_ascii_alphabetic())
}

fn origin(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

/// Coarse lookup form of a page URL.
///
/// `scheme://host/` in general. For `www.` hosts whose path starts with two
/// two-letter segments (country then language), those segments are kept:
/// `https://www.brand.com/kr/ko/products/1` gives `https://www.brand.com/kr/ko/`.
/// Input that does not parse as a URL is returned unchanged.
pub fn extract_base_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let origin = origin(&parsed);

    if parsed.host_str().is_some_and(|h| h.starts_with("www.")) {
        let segments: Vec<&str> = parsed.path().trim_matches('/').split('/').collect();
        if segments.len() >= 2 && is_two_letter(segments[0]) && is_two_letter(segments[1]) {
            return format!("{}/{}/{}/", origin, segments[0], segments[1]);
        }
    }

    format!("{}/", origin)
}

/// Drop leading locale-code segments from the path. Query and fragment are
/// not kept.
pub fn remove_locale_code(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let mut segments: Vec<&str> = parsed.path().trim_matches('/').split('/').collect();
    if !is_locale_code(segments[0]) {
        return format!("{}{}", origin(&parsed), parsed.path());
    }

    while segments.first().is_some_and(|s| s.is_empty() || is_locale_code(s)) {
        segments.remove(0);
    }
    format!("{}/{}", origin(&parsed), segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_code_pattern() {
        assert!(is_locale_code("en_s"));
        assert!(is_locale_code("tc_l"));
        assert!(!is_locale_code("en"));
        assert!(!is_locale_code("EN_S"));
        assert!(!is_locale_code("en_sw"));
    }

    #[test]
    fn test_origin_keeps_port() {
        let url = Url::parse("http://127.0.0.1:8080/a/b").unwrap();
        assert_eq!(origin(&url), "http://127.0.0.1:8080");
    }
}
