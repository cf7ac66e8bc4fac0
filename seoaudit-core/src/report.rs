//! Report rendering: a self-contained editable HTML page or a JSON document.

use crate::audit::PageAudit;
use crate::metadata::{NO_ISSUE, NOT_APPLICABLE};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use url::Url;

const TEMPLATE: &str = include_str!("../templates/report_template.html");
const STYLE: &str = include_str!("../templates/report_style.css");
const SCRIPT: &str = include_str!("../templates/report_script.js");

pub const ALT_NEEDS_FIX: &str = "Needs fix";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "html" | "htm" => Some(ReportFormat::Html),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

pub fn generate_report(
    format: ReportFormat,
    ticket: &str,
    pages: &[PageAudit],
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Html => Ok(generate_html_report(ticket, pages)),
        ReportFormat::Json => generate_json_report(ticket, pages),
    }
}

/// Replace `{{KEY}}` placeholders in one pass. Substituted text is never
/// scanned again and unknown keys are left as they are.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn escape(text: &str) -> String {
    html_escape::encode_safe(text).into_owned()
}

/// Last path segment of the page, or its host for a root URL.
pub fn tab_label(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    parsed
        .path()
        .trim_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .or_else(|| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

fn comment_status(comment: &str) -> &'static str {
    let comment = comment.trim().to_lowercase();
    if comment.is_empty() || comment == NO_ISSUE.to_lowercase() || comment == NOT_APPLICABLE.to_lowercase() {
        "ok"
    } else {
        "issue"
    }
}

fn render_seo_table(out: &mut String, page: &PageAudit) {
    out.push_str("<h3>SEO QA</h3>\n");
    out.push_str(
        "<table class='seo-table'><thead><tr><th class='factor-name'>Factor</th>\
         <th style='width:30%'>Current</th><th class='len-col'>Length</th>\
         <th style='width:22%'>Comment</th><th>Suggested fix</th>\
         <th class='len-col'>Length</th></tr></thead><tbody>\n",
    );

    for factor in &page.factors {
        let current = escape(&factor.current);
        let _ = writeln!(out, "<tr>\n  <td class='factor-name'>{}</td>", escape(&factor.name));

        if factor.is_length_checked() {
            let length = factor.current_length.map(|n| n.to_string()).unwrap_or_default();
            let _ = writeln!(out, "  <td><div class='editable-field'>{}</div></td>", current);
            let _ = writeln!(out, "  <td class='len-col'>{}</td>", length);
        } else if factor.is_manual_review() {
            let _ = writeln!(
                out,
                "  <td colspan='2'><div class='editable-field' contenteditable='true'>{}</div></td>",
                current
            );
        } else {
            let _ = writeln!(out, "  <td colspan='2'>{}</td>", current);
        }

        let _ = writeln!(
            out,
            "  <td class='comment-cell' data-status='{}'><div class='editable-field' contenteditable='true'>{}</div></td>",
            comment_status(&factor.comment),
            escape(&factor.comment)
        );

        let fix = escape(&factor.suggested_fix);
        if factor.is_length_checked() {
            let _ = writeln!(
                out,
                "  <td class='fix-cell'><div class='editable-field' contenteditable='true'>{}</div></td>",
                fix
            );
            let _ = writeln!(
                out,
                "  <td class='len-col len-counter-fix'>{}</td>",
                factor.suggested_fix.chars().count()
            );
        } else {
            let _ = writeln!(
                out,
                "  <td class='fix-cell' colspan='2'><div class='editable-field' contenteditable='true'>{}</div></td>",
                fix
            );
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody></table>\n");
}

fn render_alt_table(out: &mut String, page: &PageAudit) {
    if page.alt_texts.is_empty() {
        return;
    }
    out.push_str("<h3>Image Alt QA</h3>\n");
    out.push_str(
        "<table class='alt-table'><thead><tr><th style='width:25%'>Image URL</th>\
         <th>Preview</th><th style='width:20%'>Alt text (current)</th>\
         <th class='sortable' style='width:15%'>Comment <i class='sort-icon'>&#8597;</i></th>\
         <th>Alt text (proposed)</th></tr></thead><tbody>\n",
    );

    for record in &page.alt_texts {
        let (comment, proposed, status) = if record.needs_fix() {
            (ALT_NEEDS_FIX, "", "issue")
        } else {
            (NO_ISSUE, NOT_APPLICABLE, "ok")
        };
        let image_url = escape(&record.image_url);
        let _ = writeln!(
            out,
            "<tr>\n  <td>{url}</td>\n  <td><img src='{url}' alt='Image preview' loading='lazy'></td>\n  \
             <td>{alt}</td>\n  <td class='comment-cell' data-status='{status}'><div class='alt-comment-toggle'>{comment}</div></td>\n  \
             <td><div class='editable-field' contenteditable='true'>{proposed}</div></td>\n</tr>",
            url = image_url,
            alt = escape(&record.alt_text),
            status = status,
            comment = comment,
            proposed = proposed,
        );
    }
    out.push_str("</tbody></table>\n");
}

pub fn generate_html_report(ticket: &str, pages: &[PageAudit]) -> String {
    let mut buttons = String::new();
    let mut contents = String::new();

    for (i, page) in pages.iter().enumerate() {
        let url = escape(&page.url);
        let _ = writeln!(
            buttons,
            "<button type='button' class='tab-button' title='{}' onclick='showTab({})'>{}</button>",
            url,
            i,
            escape(&tab_label(&page.url))
        );

        let active = if i == 0 { " active" } else { "" };
        let _ = writeln!(
            contents,
            "<div id='urlContent_{}' class='tab-content{}' data-url='{}'>\n<p class='page-url'>{}</p>",
            i, active, url, url
        );
        render_seo_table(&mut contents, page);
        render_alt_table(&mut contents, page);
        contents.push_str("</div>\n");
    }

    let ticket = escape(ticket);
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    render(
        TEMPLATE,
        &[
            ("TICKET_NAME", ticket.as_str()),
            ("VERSION", env!("CARGO_PKG_VERSION")),
            ("GENERATED_AT", generated_at.as_str()),
            ("STYLE", STYLE),
            ("SCRIPT", SCRIPT),
            ("TAB_BUTTONS", buttons.as_str()),
            ("TAB_CONTENTS", contents.as_str()),
        ],
    )
}

pub fn generate_json_report(ticket: &str, pages: &[PageAudit]) -> Result<String, serde_json::Error> {
    let issues: usize = pages
        .iter()
        .map(|p| p.factors.iter().filter(|f| !f.is_ok()).count())
        .sum();
    let missing_alt: usize = pages
        .iter()
        .map(|p| p.alt_texts.iter().filter(|a| a.needs_fix()).count())
        .sum();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "seoaudit",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "ticket": ticket,
            "urls": pages.iter().map(|p| p.url.as_str()).collect::<Vec<_>>(),
            "summary": {
                "total_pages": pages.len(),
                "factor_issues": issues,
                "images": pages.iter().map(|p| p.alt_texts.len()).sum::<usize>(),
                "images_missing_alt": missing_alt
            },
            "pages": pages
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
