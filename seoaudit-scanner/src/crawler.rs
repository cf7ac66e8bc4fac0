use crate::client::{DEFAULT_TIMEOUT_SECS, build_client};
use crate::error::{Result, ScanError};
use crate::log::{LogSink, SharedSink, TracingSink};
use crate::sitemap::SitemapDocument;
use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_MAX_DEPTH: usize = 8;
pub const DEFAULT_MAX_SITEMAPS: usize = 500;

/// Sitemap URLs already fetched during one inclusion check.
///
/// Also carries the node budget: once `budget` documents have been
/// admitted no further sitemap is fetched for this check. Each limit is
/// reported at most once per check.
#[derive(Debug)]
pub struct VisitedSet {
    seen: HashSet<String>,
    budget: usize,
    budget_reported: bool,
    depth_reported: bool,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::with_budget(DEFAULT_MAX_SITEMAPS)
    }

    pub fn with_budget(budget: usize) -> Self {
        Self {
            seen: HashSet::new(),
            budget,
            budget_reported: false,
            depth_reported: false,
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Admit a URL. Returns false when the budget is already spent.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.seen.len() >= self.budget {
            return false;
        }
        self.seen.insert(url.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// True the first time it is called after the budget ran out.
    fn report_budget(&mut self) -> bool {
        !std::mem::replace(&mut self.budget_reported, true)
    }

    /// True the first time a sitemap is skipped for being too deep.
    fn report_depth(&mut self) -> bool {
        !std::mem::replace(&mut self.depth_reported, true)
    }
}

impl Default for VisitedSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first search for an exact URL through a sitemap tree.
pub struct SitemapCrawler {
    client: Client,
    max_depth: usize,
    max_sitemaps: usize,
    sink: SharedSink,
}

impl SitemapCrawler {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout_secs)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            max_depth: DEFAULT_MAX_DEPTH,
            max_sitemaps: DEFAULT_MAX_SITEMAPS,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_sitemaps(mut self, max_sitemaps: usize) -> Self {
        self.max_sitemaps = max_sitemaps;
        self
    }

    pub fn with_log_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Look for `target_url` in the tree rooted at `sitemap_url`.
    ///
    /// Returns the sitemap whose `<url><loc>` matched, which is not
    /// necessarily the root. Every call starts from an empty visited set.
    pub async fn find_url(&self, sitemap_url: &str, target_url: &str) -> Option<String> {
        let mut visited = VisitedSet::with_budget(self.max_sitemaps);
        self.find_url_with(sitemap_url, target_url, &mut visited)
            .await
    }

    /// Same as [`find_url`](Self::find_url) with a caller-owned visited set.
    pub async fn find_url_with(
        &self,
        sitemap_url: &str,
        target_url: &str,
        visited: &mut VisitedSet,
    ) -> Option<String> {
        self.search(sitemap_url, target_url, visited, 0).await
    }

    fn search<'a>(
        &'a self,
        sitemap_url: &'a str,
        target_url: &'a str,
        visited: &'a mut VisitedSet,
        depth: usize,
    ) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move {
            // Cycle: skip quietly
            if visited.contains(sitemap_url) {
                debug!("Sitemap {} already visited, skipping", sitemap_url);
                return None;
            }

            if depth > self.max_depth {
                if visited.report_depth() {
                    self.sink.warn(&format!(
                        "Sitemap nesting deeper than {} levels, skipping {}",
                        self.max_depth, sitemap_url
                    ));
                } else {
                    debug!("Sitemap {} too deep, skipping", sitemap_url);
                }
                return None;
            }

            if !visited.insert(sitemap_url) {
                if visited.report_budget() {
                    self.sink.warn(&format!(
                        "Sitemap budget of {} documents exhausted, skipping {}",
                        visited.budget(),
                        sitemap_url
                    ));
                } else {
                    debug!("Sitemap budget spent, skipping {}", sitemap_url);
                }
                return None;
            }

            self.sink.info(&format!("Accessing sitemap: {}", sitemap_url));

            let document = match self.fetch_document(sitemap_url).await {
                Ok(document) => document,
                Err(e) => {
                    self.report_failure(sitemap_url, &e);
                    return None;
                }
            };

            match document {
                SitemapDocument::Index(children) => {
                    debug!(
                        "{} is a sitemap index with {} children",
                        sitemap_url,
                        children.len()
                    );
                    for child in &children {
                        if let Some(found) =
                            self.search(child, target_url, visited, depth + 1).await
                        {
                            return Some(found);
                        }
                    }
                    None
                }
                SitemapDocument::UrlSet(urls) => {
                    debug!("{} lists {} URLs", sitemap_url, urls.len());
                    if urls.iter().any(|loc| loc == target_url) {
                        self.sink
                            .info(&format!("URL found in sitemap: {}", sitemap_url));
                        Some(sitemap_url.to_string())
                    } else {
                        None
                    }
                }
            }
        })
    }

    async fn fetch_document(&self, url: &str) -> Result<SitemapDocument> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScanError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        SitemapDocument::parse(&body)
    }

    fn report_failure(&self, sitemap_url: &str, error: &ScanError) {
        let message = match error {
            ScanError::Status(code) => {
                format!("Failed to fetch sitemap ({}): {}", code, sitemap_url)
            }
            ScanError::ParseError(e) => format!("Error parsing sitemap {}: {}", sitemap_url, e),
            other => format!("Error fetching sitemap {}: {}", sitemap_url, other),
        };
        self.sink.error(&message);
    }
}
