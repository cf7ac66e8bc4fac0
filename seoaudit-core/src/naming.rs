//! Report file naming from the brand, country and language of a URL.

use crate::locale::is_locale_code;
use crate::report::ReportFormat;
use chrono::NaiveDate;
use serde::Serialize;
use url::Url;

pub const UNKNOWN: &str = "UNKNOWN";

const BRANDS: &[(&str, &str)] = &[
    ("sulwhasoo", "SWS"),
    ("laneige", "LNG"),
    ("hera", "HERA"),
    ("aestura", "AES"),
];

const COUNTRY_SUBDOMAINS: &[&str] = &["hk", "sg", "my", "ph", "th", "tw", "vn", "jp", "kr"];
const LANGUAGES: &[&str] = &["ko", "en", "zh", "ja"];
const LOCALE_PAIRS: &[(&str, &str)] = &[("kr", "ko"), ("int", "en"), ("jp", "ja")];

fn is_alpha_code(segment: &str) -> bool {
    segment.len() == 2 && segment.chars().all(|c| c.is_ascii_alphabetic())
}

/// Brand, country and language inferred from a page URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportIdentity {
    pub brand: String,
    pub country: String,
    /// Empty when no language could be inferred.
    pub language: String,
}

impl ReportIdentity {
    pub fn from_url(url: &str) -> Self {
        let Ok(parsed) = Url::parse(url) else {
            return Self::unknown();
        };
        let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
        let path = parsed.path();
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();

        let brand = BRANDS
            .iter()
            .find(|(keyword, _)| host.contains(keyword) || path.contains(keyword))
            .map(|(_, code)| code.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let labels: Vec<&str> = host.split('.').collect();
        let country = if COUNTRY_SUBDOMAINS.contains(&labels[0]) {
            labels[0].to_ascii_uppercase()
        } else if is_alpha_code(parts[0]) {
            parts[0].to_ascii_uppercase()
        } else if labels.len() > 1 && is_alpha_code(labels[labels.len() - 2]) {
            labels[labels.len() - 2].to_ascii_uppercase()
        } else {
            UNKNOWN.to_string()
        };

        let mut language = parts
            .iter()
            .copied()
            .find(|p| is_locale_code(p) || LANGUAGES.contains(p))
            .map(|p| p.to_string())
            .unwrap_or_default();

        if parts.len() >= 2 && LOCALE_PAIRS.contains(&(parts[0], parts[1])) {
            language = format!("{}-{}", parts[0], parts[1]);
        }

        Self {
            brand,
            country,
            language,
        }
    }

    fn unknown() -> Self {
        Self {
            brand: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            language: String::new(),
        }
    }
}

/// Keep ticket names usable as a file name component.
pub fn sanitize_ticket(ticket: &str) -> String {
    ticket
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// `SEO-audit_Report_<ticket>_<brand>-<country>[_<lang>]_<yymmdd>.<ext>`
pub fn report_file_name(
    ticket: &str,
    identity: &ReportIdentity,
    date: NaiveDate,
    format: ReportFormat,
) -> String {
    let language = if identity.language.is_empty() {
        String::new()
    } else {
        format!("_{}", identity.language)
    };
    format!(
        "SEO-audit_Report_{}_{}-{}{}_{}.{}",
        sanitize_ticket(ticket),
        identity.brand,
        identity.country,
        language,
        date.format("%y%m%d"),
        format.extension()
    )
}
