use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use seoaudit_core::audit::{AuditOptions, AuditOutcome, AuditProgressCallback, execute_audit};
use seoaudit_core::inclusion::{InclusionChecker, InclusionResult};
use seoaudit_core::locale::{extract_base_url, remove_locale_code};
use seoaudit_core::mapping::{SitemapMapping, find_sitemap_url};
use seoaudit_core::report::ReportFormat;
use seoaudit_scanner::{LogLevel, LogSink, SharedSink};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

// Helper functions for the audit handler

/// Load URLs from either a file or repeated `--url` arguments
pub fn load_urls_from_source(
    urls: Option<Vec<&String>>,
    urls_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(path) = urls_file {
        load_urls_from_file(path)
    } else if let Some(urls) = urls {
        let parsed: Vec<String> = urls.iter().filter_map(|u| parse_url_line(u.trim())).collect();
        if parsed.is_empty() {
            return Err("No valid URLs provided".to_string());
        }
        Ok(parsed)
    } else {
        Err("Either --url or --urls-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file, one per line. Lines starting with `#`
/// are comments.
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read URLs file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a page URL, adding https:// if needed.
///
/// A valid URL is returned unchanged: sitemap matching compares the exact
/// string.
pub fn parse_url_line(line: &str) -> Option<String> {
    let is_web = |u: &str| {
        Url::parse(u).is_ok_and(|parsed| {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        })
    };

    if is_web(line) {
        return Some(line.to_string());
    }

    let with_scheme = format!("https://{}", line);
    if !line.contains("://") && is_web(with_scheme.as_str()) {
        return Some(with_scheme);
    }

    eprintln!("⚠️  Skipping invalid URL '{}'", line);
    None
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

pub fn print_banner() {
    println!(
        "{} {}",
        "seoaudit".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "Page metadata, alt text and sitemap inclusion audits".bright_black());
    println!();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

pub fn format_log_line(level: LogLevel, message: &str) -> String {
    let tag = format!("[{}]", level);
    let tag = match level {
        LogLevel::Info => tag.blue(),
        LogLevel::Warn => tag.yellow().bold(),
        LogLevel::Error => tag.red().bold(),
    };
    format!("{} {}", tag, message)
}

/// Prints audit log lines above the progress spinner.
pub struct ConsoleSink {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl ConsoleSink {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    pub fn with_progress_bar(mut self, bar: ProgressBar) -> Self {
        self.bar = Some(bar);
        self
    }
}

impl LogSink for ConsoleSink {
    fn append(&self, level: LogLevel, message: &str) {
        if self.quiet && level == LogLevel::Info {
            return;
        }
        let line = format_log_line(level, message);
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{}", line),
        }
    }
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn load_mapping(path: &Path) -> Result<SitemapMapping> {
    let mapping = SitemapMapping::load(path)
        .with_context(|| format!("Failed to load sitemap mapping from {}", path.display()))?;
    debug!("Loaded {} mapping entries from {}", mapping.len(), path.display());
    Ok(mapping)
}

fn mapping_path(args: &ArgMatches) -> PathBuf {
    let raw = args
        .get_one::<String>("mapping")
        .map(String::as_str)
        .unwrap_or(seoaudit_core::mapping::DEFAULT_MAPPING_FILE);
    expand_path(raw)
}

fn timeout(args: &ArgMatches) -> u64 {
    args.get_one::<u64>("timeout")
        .copied()
        .unwrap_or(seoaudit_scanner::client::DEFAULT_TIMEOUT_SECS)
}

pub fn format_mapping_table(mapping: &SitemapMapping) -> String {
    if mapping.is_empty() {
        return "No sitemap mappings configured.\n".to_string();
    }

    let width = mapping
        .entries()
        .iter()
        .map(|e| e.prefix.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (i, entry) in mapping.entries().iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {:<width$}  →  {}\n",
            i + 1,
            entry.prefix,
            entry.sitemap_url,
            width = width
        ));
    }
    out
}

pub fn format_audit_summary(outcome: &AuditOutcome) -> String {
    let mut out = String::new();
    out.push_str("📊 Summary:\n");
    out.push_str(&format!("  Pages audited: {}\n", outcome.pages.len()));

    let issues: usize = outcome.pages.iter().map(|p| p.issue_count()).sum();
    out.push_str(&format!("  Factor issues: {}\n", issues));

    let included = outcome
        .pages
        .iter()
        .filter(|p| matches!(p.inclusion, InclusionResult::Included { .. }))
        .count();
    out.push_str(&format!(
        "  In sitemap: {}/{}\n",
        included,
        outcome.pages.len()
    ));

    let images: usize = outcome.pages.iter().map(|p| p.alt_texts.len()).sum();
    let missing_alt: usize = outcome
        .pages
        .iter()
        .map(|p| p.alt_texts.iter().filter(|a| a.needs_fix()).count())
        .sum();
    out.push_str(&format!(
        "  Images: {} ({} without alt text)\n",
        images, missing_alt
    ));

    out.push_str("\n📄 Pages:\n");
    for page in &outcome.pages {
        let issues = page.issue_count();
        let mark = if issues == 0 { "✓" } else { "⚠" };
        out.push_str(&format!("  {} {} ({} issue(s))\n", mark, page.url, issues));
    }
    out
}

pub async fn handle_audit(args: &ArgMatches, quiet: bool) -> Result<()> {
    let ticket = args
        .get_one::<String>("ticket")
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    let urls_file = args.get_one::<String>("urls-file").map(|p| expand_path(p));
    let urls = load_urls_from_source(
        args.get_many::<String>("url").map(|values| values.collect()),
        urls_file.as_ref(),
    )
    .map_err(anyhow::Error::msg)?;

    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or_default();

    let mut options = AuditOptions::new(ticket, urls);
    options.output_dir = expand_path(
        args.get_one::<String>("output-dir")
            .map(String::as_str)
            .unwrap_or(seoaudit_core::audit::DEFAULT_OUTPUT_DIR),
    );
    options.format = format;
    options.collect_alt_text = !args.get_flag("no-alt-text");
    options.timeout_secs = timeout(args);
    options.validate()?;

    let mapping = load_mapping(&mapping_path(args))?;

    if !quiet {
        println!("🔎 Auditing {} page(s) for {}", options.urls.len(), options.ticket);
        println!("Mapping entries: {}", mapping.len());
        println!("Timeout: {}s", options.timeout_secs);
        println!(
            "Alt text: {}\n",
            if options.collect_alt_text { "collected" } else { "skipped" }
        );
    }

    let bar = spinner();
    let sink: SharedSink = Arc::new(ConsoleSink::new(quiet).with_progress_bar(bar.clone()));
    let progress_bar = bar.clone();
    let progress: AuditProgressCallback = Arc::new(move |msg: String| {
        progress_bar.set_message(msg);
    });

    let result = execute_audit(&options, &mapping, sink, Some(progress)).await;
    bar.finish_and_clear();
    let outcome = result?;

    println!("\n{} Audit complete!\n", "✓".green().bold());
    if !quiet {
        print!("{}", format_audit_summary(&outcome));
        println!();
    }
    println!(
        "{} Report: {}",
        "→".blue(),
        outcome.report_path.display().to_string().bright_white()
    );
    Ok(())
}

pub fn handle_sitemap_list(args: &ArgMatches) -> Result<()> {
    let path = mapping_path(args);
    let mapping = load_mapping(&path)?;

    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("built-in defaults ({} not found)", path.display())
    };
    println!("{} {}", "Mapping:".blue(), source.bright_white());
    println!();
    print!("{}", format_mapping_table(&mapping));
    Ok(())
}

pub fn handle_sitemap_init(args: &ArgMatches) -> Result<()> {
    let path = mapping_path(args);
    let force = args.get_flag("force");

    if path.exists() && !force {
        bail!(
            "Mapping file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let mapping = SitemapMapping::builtin();
    mapping
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    print_divider();
    println!("{}", "  MAPPING INITIALIZED".green().bold());
    print_divider();
    println!(
        "{} {} entries written to {}",
        "✓".green().bold(),
        mapping.len().to_string().cyan(),
        path.display().to_string().bright_white()
    );
    Ok(())
}

fn require_url(value: &str, what: &str) -> Result<String> {
    let value = value.trim();
    match Url::parse(value) {
        Ok(_) => Ok(value.to_string()),
        Err(e) => bail!("Invalid {} '{}': {}", what, value, e),
    }
}

pub fn handle_sitemap_add(args: &ArgMatches) -> Result<()> {
    let path = mapping_path(args);
    let prefix = require_url(
        args.get_one::<String>("PREFIX").map(String::as_str).unwrap_or_default(),
        "prefix",
    )?;
    let sitemap = require_url(
        args.get_one::<String>("SITEMAP").map(String::as_str).unwrap_or_default(),
        "sitemap URL",
    )?;

    let mapping = load_mapping(&path)?;
    let verb = if mapping.contains(&prefix) { "Updated" } else { "Added" };
    let updated = mapping.with_entry(prefix.clone(), sitemap.clone());
    updated
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} {} {} → {}",
        "✓".green().bold(),
        verb,
        prefix.bright_white(),
        sitemap
    );
    Ok(())
}

pub fn handle_sitemap_remove(args: &ArgMatches) -> Result<()> {
    let path = mapping_path(args);
    let prefix = args
        .get_one::<String>("PREFIX")
        .map(|p| p.trim().to_string())
        .unwrap_or_default();

    let mapping = load_mapping(&path)?;
    if !mapping.contains(&prefix) {
        bail!("No mapping entry for prefix '{}'", prefix);
    }
    mapping
        .without_entry(&prefix)
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} Removed {}", "✓".green().bold(), prefix.bright_white());
    Ok(())
}

pub fn handle_sitemap_resolve(args: &ArgMatches, quiet: bool) -> Result<()> {
    let url = args.get_one::<String>("URL").map(|u| u.trim()).unwrap_or_default();
    let mapping = load_mapping(&mapping_path(args))?;
    let sink = ConsoleSink::new(quiet);

    let base_url = extract_base_url(url);
    println!("{} {}", "Base URL:".blue(), base_url);
    println!("{} {}", "Lookup key:".blue(), remove_locale_code(&base_url));

    match find_sitemap_url(&base_url, &mapping, &sink) {
        Some(sitemap) => println!("{} {}", "✓".green().bold(), sitemap.bright_white()),
        None => println!("{} No sitemap mapping matches", "✗".red().bold()),
    }
    Ok(())
}

pub async fn handle_sitemap_check(args: &ArgMatches, quiet: bool) -> Result<()> {
    let url = args
        .get_one::<String>("URL")
        .map(|u| u.trim().to_string())
        .unwrap_or_default();
    let mapping = load_mapping(&mapping_path(args))?;

    let sink: SharedSink = Arc::new(ConsoleSink::new(quiet));
    let checker = InclusionChecker::new(timeout(args), sink)?;
    let result = checker.check_sitemap_inclusion(&url, &mapping).await;

    let mark = if result.is_issue() {
        "✗".red().bold()
    } else {
        "✓".green().bold()
    };
    println!();
    println!("{} {}", mark, result.status().bright_white());
    if let Some(sitemap) = result.sitemap_url() {
        println!("  {} {}", "Sitemap:".blue(), sitemap);
    }
    println!("  {} {}", "Comment:".blue(), result.comment());
    println!("  {} {}", "Fix:".blue(), result.suggested_fix());
    Ok(())
}
