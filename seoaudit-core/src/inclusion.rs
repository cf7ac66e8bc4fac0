//! Classify whether a page is listed in the sitemap that governs it.

use crate::error::Result;
use crate::locale::extract_base_url;
use crate::mapping::{SitemapMapping, find_sitemap_url};
use seoaudit_scanner::{LogSink, SharedSink, SitemapCrawler};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum InclusionResult {
    NoMappingFound,
    Included { sitemap_url: String },
    NotIncluded { sitemap_url: String, url: String },
}

impl InclusionResult {
    pub fn status(&self) -> &'static str {
        match self {
            InclusionResult::NoMappingFound => "No sitemap URL",
            InclusionResult::Included { .. } => "Included in sitemap",
            InclusionResult::NotIncluded { .. } => "Not included in sitemap",
        }
    }

    pub fn comment(&self) -> &'static str {
        match self {
            InclusionResult::NoMappingFound => "No sitemap data",
            InclusionResult::Included { .. } => "No issue",
            InclusionResult::NotIncluded { .. } => "URL needs to be added",
        }
    }

    pub fn suggested_fix(&self) -> String {
        match self {
            InclusionResult::NoMappingFound => "Add a sitemap mapping".to_string(),
            InclusionResult::Included { .. } => "N/A".to_string(),
            InclusionResult::NotIncluded { url, .. } => format!("Add {} to the sitemap", url),
        }
    }

    pub fn is_issue(&self) -> bool {
        !matches!(self, InclusionResult::Included { .. })
    }

    /// For `Included`, the sitemap whose `<url>` list held the page, which
    /// may be a child of the mapped one. Otherwise the mapped sitemap.
    pub fn sitemap_url(&self) -> Option<&str> {
        match self {
            InclusionResult::NoMappingFound => None,
            InclusionResult::Included { sitemap_url }
            | InclusionResult::NotIncluded { sitemap_url, .. } => Some(sitemap_url),
        }
    }
}

pub struct InclusionChecker {
    crawler: SitemapCrawler,
    sink: SharedSink,
}

impl InclusionChecker {
    pub fn new(timeout_secs: u64, sink: SharedSink) -> Result<Self> {
        let crawler = SitemapCrawler::with_timeout(timeout_secs)?.with_log_sink(sink.clone());
        Ok(Self { crawler, sink })
    }

    /// Use a preconfigured crawler. Its log sink should be the same as `sink`
    /// so that one check writes to a single log.
    pub fn with_crawler(crawler: SitemapCrawler, sink: SharedSink) -> Self {
        Self { crawler, sink }
    }

    /// Resolve the governing sitemap for `full_url` and search it for the
    /// exact URL. Never fails: fetch and parse problems are logged by the
    /// crawler and end up as `NotIncluded`.
    pub async fn check_sitemap_inclusion(
        &self,
        full_url: &str,
        mapping: &SitemapMapping,
    ) -> InclusionResult {
        let base_url = extract_base_url(full_url);

        let Some(sitemap_url) = find_sitemap_url(&base_url, mapping, self.sink.as_ref()) else {
            self.sink
                .warn(&format!("Sitemap URL not found for {}.", full_url));
            return InclusionResult::NoMappingFound;
        };

        match self.crawler.find_url(sitemap_url, full_url).await {
            Some(matched) => {
                self.sink
                    .info(&format!("URL included in Sitemap: {}", full_url));
                InclusionResult::Included {
                    sitemap_url: matched,
                }
            }
            None => {
                self.sink
                    .warn(&format!("URL NOT included in Sitemap: {}", full_url));
                InclusionResult::NotIncluded {
                    sitemap_url: sitemap_url.to_string(),
                    url: full_url.to_string(),
                }
            }
        }
    }
}
