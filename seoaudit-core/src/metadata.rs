//! Per-page SEO factors extracted from fetched HTML.

use crate::inclusion::InclusionResult;
use scraper::{ElementRef, Html, Selector};
use seoaudit_scanner::{FetchedPage, ScanError};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

pub const NO_ISSUE: &str = "No issue";
pub const NOT_APPLICABLE: &str = "N/A";

pub const AUDIT_URL_FACTOR: &str = "Audit URL";
pub const SITEMAP_FACTOR: &str = "Sitemap inclusion";
/// Factors whose suggested fix gets a live length counter in the report.
pub const LENGTH_CHECKED_FACTORS: &[&str] = &["Title", "Description", "OG Title", "OG Description"];
/// Filled in by the reviewer in the report.
pub const MANUAL_REVIEW_FACTOR: &str = "Image-only content";

const TITLE_LENGTH: (usize, usize) = (10, 60);
const DESCRIPTION_LENGTH: (usize, usize) = (50, 160);
const OG_TITLE_MAX: usize = 60;
const OG_DESCRIPTION_MAX: usize = 160;

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META: LazyLock<Selector> = LazyLock::new(|| selector("meta[content]"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("link[rel][href]"));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// One row of the SEO QA table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFactor {
    pub name: String,
    pub current: String,
    pub current_length: Option<usize>,
    pub comment: String,
    pub suggested_fix: String,
}

impl AuditFactor {
    pub fn new(
        name: impl Into<String>,
        current: impl Into<String>,
        comment: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            current: current.into(),
            current_length: None,
            comment: comment.into(),
            suggested_fix: suggested_fix.into(),
        }
    }

    /// Same as [`new`](Self::new) with the character count of `current`.
    pub fn measured(
        name: impl Into<String>,
        current: impl Into<String>,
        comment: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        let mut factor = Self::new(name, current, comment, suggested_fix);
        factor.current_length = Some(factor.current.chars().count());
        factor
    }

    fn ok(name: &str, current: impl Into<String>) -> Self {
        Self::new(name, current, NO_ISSUE, NOT_APPLICABLE)
    }

    pub fn is_ok(&self) -> bool {
        self.comment.is_empty() || self.comment == NO_ISSUE || self.comment == NOT_APPLICABLE
    }

    pub fn is_length_checked(&self) -> bool {
        LENGTH_CHECKED_FACTORS.contains(&self.name.as_str())
    }

    pub fn is_manual_review(&self) -> bool {
        self.name == MANUAL_REVIEW_FACTOR
    }

    pub fn from_inclusion(inclusion: &InclusionResult) -> Self {
        Self::new(
            SITEMAP_FACTOR,
            inclusion.status(),
            inclusion.comment(),
            inclusion.suggested_fix(),
        )
    }

    pub fn manual_review() -> Self {
        Self::new(MANUAL_REVIEW_FACTOR, "", "", "")
    }
}

/// Tags read from a page's `<head>` and headings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub og_url: Option<String>,
    pub canonical: Option<String>,
    pub robots: Option<String>,
    pub h1: Vec<String>,
}

impl PageMetadata {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut meta = PageMetadata {
            title: document.select(&TITLE).next().and_then(text_of),
            h1: document.select(&H1).filter_map(text_of).collect(),
            ..Default::default()
        };

        // First occurrence of each tag wins.
        for element in document.select(&META) {
            let attrs = element.value();
            let Some(key) = attrs.attr("name").or_else(|| attrs.attr("property")) else {
                continue;
            };
            let Some(content) = attrs.attr("content").map(normalize_space) else {
                continue;
            };
            if content.is_empty() {
                continue;
            }
            let slot = match key.trim().to_ascii_lowercase().as_str() {
                "description" => &mut meta.description,
                "og:title" => &mut meta.og_title,
                "og:description" => &mut meta.og_description,
                "og:image" => &mut meta.og_image,
                "og:url" => &mut meta.og_url,
                "robots" => &mut meta.robots,
                _ => continue,
            };
            slot.get_or_insert(content);
        }

        meta.canonical = document
            .select(&LINK)
            .find(|link| {
                link.value()
                    .attr("rel")
                    .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("canonical")))
            })
            .and_then(|link| link.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty());

        meta
    }
}

fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn text_of(element: ElementRef<'_>) -> Option<String> {
    let text = normalize_space(&element.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn length_factor(name: &str, value: Option<&str>, min: usize, max: usize) -> AuditFactor {
    let Some(value) = value else {
        return AuditFactor::measured(name, "", format!("Missing {}", name), format!("Add a {}", name));
    };
    let len = value.chars().count();
    if len < min {
        AuditFactor::measured(
            name,
            value,
            format!("Too short ({} characters, minimum {})", len, min),
            format!("Expand the {} to {}-{} characters", name, min, max),
        )
    } else if len > max {
        AuditFactor::measured(
            name,
            value,
            format!("Too long ({} characters, maximum {})", len, max),
            format!("Shorten the {} to at most {} characters", name, max),
        )
    } else {
        AuditFactor::measured(name, value, NO_ISSUE, NOT_APPLICABLE)
    }
}

fn same_url(candidate: &str, page_url: &str) -> bool {
    let Ok(page) = Url::parse(page_url) else {
        return candidate == page_url;
    };
    match page.join(candidate) {
        Ok(resolved) => resolved == page,
        Err(_) => false,
    }
}

fn url_factor(name: &str, value: Option<&str>, page_url: &str, tag: &str) -> AuditFactor {
    match value {
        None => AuditFactor::new(
            name,
            "",
            format!("Missing {}", name),
            format!("Add {} pointing to {}", tag, page_url),
        ),
        Some(value) if !same_url(value, page_url) => AuditFactor::new(
            name,
            value,
            format!("{} does not match the page URL", name),
            format!("Set {} to {}", tag, page_url),
        ),
        Some(value) => AuditFactor::ok(name, value),
    }
}

fn audit_url_factor(page: &FetchedPage) -> Option<AuditFactor> {
    if !page.is_success() {
        return Some(AuditFactor::new(
            AUDIT_URL_FACTOR,
            &page.final_url,
            format!("Page returned HTTP {}", page.status_code),
            "Make the page return HTTP 200",
        ));
    }
    if page.was_redirected() {
        return Some(AuditFactor::new(
            AUDIT_URL_FACTOR,
            &page.final_url,
            format!("Redirected from {}", page.requested_url),
            format!("Link directly to {}", page.final_url),
        ));
    }
    None
}

/// Ordered SEO QA rows for a fetched page.
pub fn audit_factors(
    page: &FetchedPage,
    meta: &PageMetadata,
    inclusion: &InclusionResult,
) -> Vec<AuditFactor> {
    let mut factors = Vec::with_capacity(12);
    factors.extend(audit_url_factor(page));

    let (title_min, title_max) = TITLE_LENGTH;
    factors.push(length_factor("Title", meta.title.as_deref(), title_min, title_max));
    let (desc_min, desc_max) = DESCRIPTION_LENGTH;
    factors.push(length_factor(
        "Description",
        meta.description.as_deref(),
        desc_min,
        desc_max,
    ));
    factors.push(length_factor("OG Title", meta.og_title.as_deref(), 1, OG_TITLE_MAX));
    factors.push(length_factor(
        "OG Description",
        meta.og_description.as_deref(),
        1,
        OG_DESCRIPTION_MAX,
    ));

    factors.push(match meta.og_image.as_deref() {
        Some(image) => AuditFactor::ok("OG Image", image),
        None => AuditFactor::new("OG Image", "", "Missing OG Image", "Add an og:image tag"),
    });
    factors.push(url_factor(
        "OG URL",
        meta.og_url.as_deref(),
        &page.final_url,
        "og:url",
    ));
    factors.push(url_factor(
        "Canonical",
        meta.canonical.as_deref(),
        &page.final_url,
        "a canonical link",
    ));

    factors.push(match meta.h1.len() {
        0 => AuditFactor::new("H1", "", "Missing H1", "Add one H1 heading"),
        1 => AuditFactor::measured("H1", meta.h1[0].as_str(), NO_ISSUE, NOT_APPLICABLE),
        n => AuditFactor::new(
            "H1",
            meta.h1.join(" | "),
            format!("Multiple H1 tags ({})", n),
            "Keep a single H1 heading",
        ),
    });

    factors.push(match meta.robots.as_deref() {
        Some(robots) if robots.to_ascii_lowercase().contains("noindex") => AuditFactor::new(
            "Robots",
            robots,
            "Page is set to noindex",
            "Remove noindex so the page can be indexed",
        ),
        Some(robots) => AuditFactor::ok("Robots", robots),
        None => AuditFactor::ok("Robots", ""),
    });

    factors.push(AuditFactor::from_inclusion(inclusion));
    factors.push(AuditFactor::manual_review());
    factors
}

/// Rows for a page that could not be fetched at all.
pub fn failed_factors(url: &str, error: &ScanError, inclusion: &InclusionResult) -> Vec<AuditFactor> {
    vec![
        AuditFactor::new(
            AUDIT_URL_FACTOR,
            url,
            format!("Page could not be fetched: {}", error),
            "Check that the URL is reachable",
        ),
        AuditFactor::from_inclusion(inclusion),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> FetchedPage {
        FetchedPage {
            requested_url: "https://sg.brand.com/products/x".to_string(),
            final_url: "https://sg.brand.com/products/x".to_string(),
            status_code: 200,
            content_type: Some("text/html".to_string()),
            body: body.to_string(),
        }
    }

    fn find<'a>(factors: &'a [AuditFactor], name: &str) -> &'a AuditFactor {
        factors.iter().find(|f| f.name == name).unwrap()
    }

    const GOOD_PAGE: &str = r#"<html><head>
        <title>First Care Activating Serum | Brand</title>
        <meta name="description" content="A serum that prepares the skin for the rest of the routine, with ginseng extracts.">
        <meta property="og:title" content="First Care Activating Serum">
        <meta property="og:description" content="Prepares the skin.">
        <meta property="og:image" content="https://sg.brand.com/media/serum.jpg">
        <meta property="og:url" content="https://sg.brand.com/products/x">
        <link rel="canonical" href="/products/x">
        </head><body><h1>  First Care
           Activating Serum </h1></body></html>"#;

    #[test]
    fn test_parse_reads_head_tags() {
        let meta = PageMetadata::parse(GOOD_PAGE);
        assert_eq!(meta.title.as_deref(), Some("First Care Activating Serum | Brand"));
        assert_eq!(meta.og_title.as_deref(), Some("First Care Activating Serum"));
        assert_eq!(meta.canonical.as_deref(), Some("/products/x"));
        assert_eq!(meta.h1, vec!["First Care Activating Serum"]);
        assert_eq!(meta.robots, None);
    }

    #[test]
    fn test_good_page_has_no_issues() {
        let page = page(GOOD_PAGE);
        let meta = PageMetadata::parse(&page.body);
        let inclusion = InclusionResult::Included {
            sitemap_url: "https://sg.brand.com/sitemap.xml".to_string(),
        };
        let factors = audit_factors(&page, &meta, &inclusion);

        assert_eq!(factors.first().unwrap().name, "Title");
        assert!(factors.iter().all(|f| f.name != AUDIT_URL_FACTOR));
        for factor in &factors {
            assert!(factor.is_ok(), "{} flagged: {}", factor.name, factor.comment);
        }
        assert_eq!(factors.last().unwrap().name, MANUAL_REVIEW_FACTOR);
    }

    #[test]
    fn test_issues_are_flagged() {
        let page = page(
            r#"<html><head><title>Short</title>
            <meta name="ROBOTS" content="noindex, nofollow">
            <meta property="og:url" content="https://sg.brand.com/other">
            </head><body><h1>One</h1><h1>Two</h1></body></html>"#,
        );
        let meta = PageMetadata::parse(&page.body);
        let factors = audit_factors(&page, &meta, &InclusionResult::NoMappingFound);

        let title = find(&factors, "Title");
        assert_eq!(title.current_length, Some(5));
        assert!(title.comment.starts_with("Too short"));
        assert_eq!(find(&factors, "Description").comment, "Missing Description");
        assert!(!find(&factors, "Robots").is_ok());
        assert!(!find(&factors, "OG URL").is_ok());
        assert_eq!(find(&factors, "H1").current, "One | Two");
        assert!(!find(&factors, SITEMAP_FACTOR).is_ok());
    }

    #[test]
    fn test_redirect_adds_audit_url_row() {
        let mut page = page(GOOD_PAGE);
        page.final_url = "https://sg.brand.com/products/y".to_string();
        let meta = PageMetadata::parse(&page.body);
        let factors = audit_factors(&page, &meta, &InclusionResult::NoMappingFound);

        assert_eq!(factors[0].name, AUDIT_URL_FACTOR);
        assert_eq!(factors[0].current, "https://sg.brand.com/products/y");
        // og:url and canonical now point at the pre-redirect URL
        assert!(!find(&factors, "Canonical").is_ok());
    }

    #[test]
    fn test_long_title_counts_characters() {
        let title = "가".repeat(61);
        let factor = length_factor("Title", Some(&title), 10, 60);
        assert_eq!(factor.current_length, Some(61));
        assert!(factor.comment.starts_with("Too long"));
    }

    #[test]
    fn test_failed_factors() {
        let error = ScanError::InvalidUrl("nope".to_string());
        let factors = failed_factors("nope", &error, &InclusionResult::NoMappingFound);
        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].name, AUDIT_URL_FACTOR);
        assert_eq!(factors[1].name, SITEMAP_FACTOR);
    }
}
