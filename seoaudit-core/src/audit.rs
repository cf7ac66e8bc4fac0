//! Sequential batch audit: one report for a list of pages.

use crate::alt_text::{AltTextRecord, collect_alt_texts};
use crate::error::{AuditError, Result};
use crate::inclusion::{InclusionChecker, InclusionResult};
use crate::mapping::SitemapMapping;
use crate::metadata::{AuditFactor, PageMetadata, audit_factors, failed_factors};
use crate::naming::{ReportIdentity, report_file_name};
use crate::report::{ReportFormat, generate_report, save_report};
use seoaudit_scanner::client::{DEFAULT_TIMEOUT_SECS, build_client};
use seoaudit_scanner::{LogSink, PageFetcher, SharedSink, SitemapCrawler};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_OUTPUT_DIR: &str = "./audit_reports";

/// Called once per URL before it is audited.
pub type AuditProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub ticket: String,
    pub urls: Vec<String>,
    pub output_dir: PathBuf,
    pub format: ReportFormat,
    pub collect_alt_text: bool,
    pub timeout_secs: u64,
}

impl AuditOptions {
    pub fn new(ticket: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            ticket: ticket.into(),
            urls,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: ReportFormat::Html,
            collect_alt_text: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Trimmed URLs with blank lines removed.
    pub fn cleaned_urls(&self) -> Vec<String> {
        self.urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.cleaned_urls().is_empty() {
            return Err(AuditError::MissingUrls);
        }
        if self.ticket.trim().is_empty() {
            return Err(AuditError::MissingTicket);
        }
        Ok(())
    }
}

/// Everything the report shows for one URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAudit {
    pub url: String,
    pub factors: Vec<AuditFactor>,
    pub alt_texts: Vec<AltTextRecord>,
    pub inclusion: InclusionResult,
}

impl PageAudit {
    pub fn issue_count(&self) -> usize {
        self.factors.iter().filter(|f| !f.is_ok()).count()
    }
}

#[derive(Debug)]
pub struct AuditOutcome {
    pub report_path: PathBuf,
    pub pages: Vec<PageAudit>,
}

/// Audits single pages. The page fetcher and the sitemap crawler share one
/// HTTP client.
pub struct Auditor {
    fetcher: PageFetcher,
    inclusion: InclusionChecker,
    sink: SharedSink,
    collect_alt_text: bool,
}

impl Auditor {
    pub fn new(timeout_secs: u64, sink: SharedSink) -> Result<Self> {
        let client = build_client(timeout_secs)?;
        let crawler = SitemapCrawler::with_client(client.clone()).with_log_sink(sink.clone());
        Ok(Self {
            fetcher: PageFetcher::with_client(client),
            inclusion: InclusionChecker::with_crawler(crawler, sink.clone()),
            sink,
            collect_alt_text: true,
        })
    }

    pub fn with_alt_text(mut self, enabled: bool) -> Self {
        self.collect_alt_text = enabled;
        self
    }

    pub async fn audit_page(&self, url: &str, mapping: &SitemapMapping) -> PageAudit {
        let fetched = self.fetcher.fetch(url).await;
        // Sitemap inclusion is checked even when the page itself is down.
        let inclusion = self.inclusion.check_sitemap_inclusion(url, mapping).await;

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                self.sink
                    .error(&format!("Failed to fetch page {}: {}", url, e));
                return PageAudit {
                    url: url.to_string(),
                    factors: failed_factors(url, &e, &inclusion),
                    alt_texts: Vec::new(),
                    inclusion,
                };
            }
        };

        debug!(
            "Fetched {} ({} bytes, status {})",
            page.final_url,
            page.body.len(),
            page.status_code
        );
        let meta = PageMetadata::parse(&page.body);
        let factors = audit_factors(&page, &meta, &inclusion);

        let alt_texts = if self.collect_alt_text {
            self.sink
                .info(&format!("Collecting alt texts for: {}", url));
            collect_alt_texts(url, &page.body)
        } else {
            Vec::new()
        };

        PageAudit {
            url: url.to_string(),
            factors,
            alt_texts,
            inclusion,
        }
    }
}

/// Audit every URL in order and write the report.
///
/// `mapping` is borrowed for the whole batch; edits made elsewhere only
/// apply to later batches.
pub async fn execute_audit(
    options: &AuditOptions,
    mapping: &SitemapMapping,
    sink: SharedSink,
    progress: Option<AuditProgressCallback>,
) -> Result<AuditOutcome> {
    if let Err(e) = options.validate() {
        sink.error(&e.to_string());
        return Err(e);
    }

    let urls = options.cleaned_urls();
    let ticket = options.ticket.trim();
    sink.info(&format!(
        "Audit started for {}: {} URL(s)",
        ticket,
        urls.len()
    ));

    let auditor =
        Auditor::new(options.timeout_secs, sink.clone())?.with_alt_text(options.collect_alt_text);

    let mut pages = Vec::with_capacity(urls.len());
    for (i, url) in urls.iter().enumerate() {
        if let Some(callback) = &progress {
            callback(format!("[{}/{}] {}", i + 1, urls.len(), url));
        }
        sink.info(&format!("Processing URL: {}", url));
        pages.push(auditor.audit_page(url, mapping).await);
    }

    let identity = ReportIdentity::from_url(&urls[0]);
    let file_name = report_file_name(
        ticket,
        &identity,
        chrono::Local::now().date_naive(),
        options.format,
    );
    let report_path = options.output_dir.join(file_name);

    let content = generate_report(options.format, ticket, &pages)?;
    save_report(&content, &report_path)?;

    sink.info(&format!(
        "Audit completed. Report saved to: {}",
        report_path.display()
    ));

    Ok(AuditOutcome { report_path, pages })
}
