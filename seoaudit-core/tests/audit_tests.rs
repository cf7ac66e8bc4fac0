// Tests for the batch audit runner

use seoaudit_core::audit::{AuditOptions, AuditProgressCallback, Auditor, execute_audit};
use seoaudit_core::error::AuditError;
use seoaudit_core::inclusion::InclusionResult;
use seoaudit_core::mapping::SitemapMapping;
use seoaudit_core::metadata::{AUDIT_URL_FACTOR, SITEMAP_FACTOR};
use seoaudit_core::report::ReportFormat;
use seoaudit_scanner::{LogLevel, MemorySink, SharedSink};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const PAGE_HTML: &str = r#"<html><head>
    <title>Water Sleeping Mask | Brand</title>
    <meta name="description" content="An overnight mask that hydrates while you sleep.">
    </head><body><h1>Water Sleeping Mask</h1>
    <img src="/media/mask.jpg" alt="">
    </body></html>"#;

async fn site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/mask"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE_HTML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{}/products/mask</loc></url></urlset>",
            server.uri()
        )))
        .mount(&server)
        .await;
    server
}

fn mapping_for(server: &MockServer) -> SitemapMapping {
    SitemapMapping::from_pairs([(
        format!("{}/", server.uri()),
        format!("{}/sitemap.xml", server.uri()),
    )])
}

fn memory_sink() -> (SharedSink, Arc<MemorySink>) {
    let memory = Arc::new(MemorySink::new());
    (memory.clone(), memory)
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_requires_urls_then_ticket() {
    let options = AuditOptions::new("", vec!["  ".to_string()]);
    assert!(matches!(options.validate(), Err(AuditError::MissingUrls)));

    let options = AuditOptions::new("  ", vec!["https://a.com/".to_string()]);
    assert!(matches!(options.validate(), Err(AuditError::MissingTicket)));

    let options = AuditOptions::new("T", vec![" https://a.com/ ".to_string(), String::new()]);
    assert!(options.validate().is_ok());
    assert_eq!(options.cleaned_urls(), vec!["https://a.com/"]);
}

#[tokio::test]
async fn test_execute_audit_fails_fast_without_ticket() {
    let dir = TempDir::new().unwrap();
    let (sink, memory) = memory_sink();
    let mut options = AuditOptions::new("", vec!["https://a.com/".to_string()]);
    options.output_dir = dir.path().to_path_buf();

    let result = execute_audit(&options, &SitemapMapping::new(), sink, None).await;

    assert!(matches!(result, Err(AuditError::MissingTicket)));
    assert_eq!(memory.count(LogLevel::Error), 1);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

// ============================================================================
// Single page
// ============================================================================

#[tokio::test]
async fn test_audit_page() {
    let server = site().await;
    let (sink, _memory) = memory_sink();
    let auditor = Auditor::new(5, sink).unwrap();
    let url = format!("{}/products/mask", server.uri());

    let page = auditor.audit_page(&url, &mapping_for(&server)).await;

    assert_eq!(page.url, url);
    assert!(matches!(page.inclusion, InclusionResult::Included { .. }));
    assert_eq!(page.factors[0].name, "Title");
    assert!(page.factors.iter().any(|f| f.name == SITEMAP_FACTOR && f.is_ok()));
    assert_eq!(page.alt_texts.len(), 1);
    assert_eq!(page.alt_texts[0].image_url, format!("{}/media/mask.jpg", server.uri()));
    assert!(page.alt_texts[0].needs_fix());
}

#[tokio::test]
async fn test_audit_page_without_alt_text() {
    let server = site().await;
    let (sink, _memory) = memory_sink();
    let auditor = Auditor::new(5, sink).unwrap().with_alt_text(false);

    let page = auditor
        .audit_page(&format!("{}/products/mask", server.uri()), &mapping_for(&server))
        .await;
    assert!(page.alt_texts.is_empty());
}

#[tokio::test]
async fn test_audit_page_unreachable() {
    let (sink, memory) = memory_sink();
    let auditor = Auditor::new(1, sink).unwrap();

    let page = auditor
        .audit_page("http://127.0.0.1:1/down", &SitemapMapping::new())
        .await;

    assert_eq!(page.factors.len(), 2);
    assert_eq!(page.factors[0].name, AUDIT_URL_FACTOR);
    assert_eq!(page.inclusion, InclusionResult::NoMappingFound);
    assert!(memory.count(LogLevel::Error) >= 1);
}

// ============================================================================
// Batch
// ============================================================================

#[tokio::test]
async fn test_execute_audit_writes_report() {
    let server = site().await;
    let dir = TempDir::new().unwrap();
    let (sink, memory) = memory_sink();

    let urls = vec![
        format!("{}/products/mask", server.uri()),
        format!("{}/products/missing", server.uri()),
    ];
    let mut options = AuditOptions::new("SEO-7", urls.clone());
    options.output_dir = dir.path().join("audit_reports");
    options.format = ReportFormat::Json;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let progress: AuditProgressCallback = Arc::new(move |msg: String| seen_clone.lock().unwrap().push(msg));

    let outcome = execute_audit(&options, &mapping_for(&server), sink, Some(progress))
        .await
        .unwrap();

    assert_eq!(outcome.pages.len(), 2);
    assert_eq!(outcome.pages[0].url, urls[0]);
    assert!(matches!(outcome.pages[1].inclusion, InclusionResult::NotIncluded { .. }));
    // the missing page answers 404
    assert_eq!(outcome.pages[1].factors[0].name, AUDIT_URL_FACTOR);

    let file_name = outcome.report_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("SEO-audit_Report_SEO-7_UNKNOWN-UNKNOWN_"));
    assert!(file_name.ends_with(".json"));
    assert!(outcome.report_path.exists());

    let progress = seen.lock().unwrap();
    assert_eq!(progress.len(), 2);
    assert!(progress[0].starts_with("[1/2]"));

    let messages: Vec<String> = memory.lines().into_iter().map(|l| l.message).collect();
    assert!(messages.contains(&format!("Processing URL: {}", urls[0])));
    assert!(messages.iter().any(|m| m.starts_with("Audit completed. Report saved to: ")));
}
