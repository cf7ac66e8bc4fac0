//! Image alt text collection for the Image Alt QA table.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("static selector is valid"));
static MAGENTO_INIT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="text/x-magento-init"]"#).expect("static selector is valid")
});

const GALLERY_WIDGET: &str = "mage/gallery/gallery";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AltTextRecord {
    pub page_url: String,
    pub image_url: String,
    pub alt_text: String,
}

impl AltTextRecord {
    pub fn needs_fix(&self) -> bool {
        self.alt_text.trim().is_empty()
    }
}

fn is_hidden(img: &ElementRef<'_>) -> bool {
    let attrs = img.value();
    if attrs.attr("hidden").is_some() {
        return true;
    }
    if attrs.classes().any(|c| c == "hidden") {
        return true;
    }
    let style: String = attrs
        .attr("style")
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    style.contains("display:none") || style.contains("visibility:hidden")
}

fn resolve(page: Option<&Url>, raw: &str) -> String {
    if raw.starts_with("http") {
        return raw.to_string();
    }
    page.and_then(|base| base.join(raw).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Visible `<img>` tags first, then Magento gallery widget images, each
/// image URL reported once per page.
pub fn collect_alt_texts(page_url: &str, html: &str) -> Vec<AltTextRecord> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    let mut push = |raw_src: &str, alt: &str| {
        let raw_src = raw_src.trim();
        if raw_src.is_empty() {
            return;
        }
        let image_url = resolve(base.as_ref(), raw_src);
        if !seen.insert(image_url.clone()) {
            return;
        }
        records.push(AltTextRecord {
            page_url: page_url.to_string(),
            image_url,
            alt_text: alt.to_string(),
        });
    };

    for img in document.select(&IMG) {
        if is_hidden(&img) {
            continue;
        }
        let attrs = img.value();
        let src = attrs
            .attr("data-amsrc")
            .filter(|s| !s.is_empty())
            .or_else(|| attrs.attr("src"))
            .unwrap_or_default();
        push(src, attrs.attr("alt").unwrap_or_default());
    }

    for script in document.select(&MAGENTO_INIT) {
        let text: String = script.text().collect();
        let config: Value = match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                debug!("Skipping unparseable magento-init block on {}: {}", page_url, e);
                continue;
            }
        };
        let Some(widgets) = config.as_object() else {
            continue;
        };

        for widget in widgets.values() {
            let Some(items) = widget
                .get(GALLERY_WIDGET)
                .and_then(|g| g.get("data"))
                .and_then(Value::as_array)
            else {
                continue;
            };
            for item in items {
                let src = ["img", "full"]
                    .iter()
                    .filter_map(|key| item.get(*key).and_then(Value::as_str))
                    .find(|s| !s.is_empty())
                    .unwrap_or_default();
                let caption = item.get("caption").and_then(Value::as_str).unwrap_or_default();
                push(src, caption);
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://sg.brand.com/products/serum";

    #[test]
    fn test_collects_visible_images() {
        let html = r#"<body>
            <img src="/media/a.jpg" alt="Serum bottle">
            <img data-amsrc="https://cdn.brand.com/b.jpg" src="/placeholder.gif" alt="">
            <img src="/media/hidden.jpg" hidden>
            <img src="/media/hidden2.jpg" class="thumb hidden">
            <img src="/media/hidden3.jpg" style="display: none">
            <img src="/media/hidden4.jpg" style="Visibility : Hidden">
            <img alt="no source">
            <img src="/media/a.jpg" alt="duplicate">
        </body>"#;

        let records = collect_alt_texts(PAGE, html);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].image_url, "https://sg.brand.com/media/a.jpg");
        assert_eq!(records[0].alt_text, "Serum bottle");
        assert!(!records[0].needs_fix());
        assert_eq!(records[1].image_url, "https://cdn.brand.com/b.jpg");
        assert!(records[1].needs_fix());
        assert!(records.iter().all(|r| r.page_url == PAGE));
    }

    #[test]
    fn test_collects_gallery_images() {
        let html = r#"<body>
            <img src="https://sg.brand.com/media/g1.jpg" alt="first">
            <script type="text/x-magento-init">
            {"[data-gallery-role=gallery-placeholder]": {"mage/gallery/gallery": {"data": [
                {"img": "https://sg.brand.com/media/g1.jpg", "caption": "again"},
                {"full": "/media/g2.jpg", "caption": "Second view"},
                {"thumb": "/media/t.jpg"}
            ]}}}
            </script>
            <script type="text/x-magento-init">{ not json</script>
        </body>"#;

        let records = collect_alt_texts(PAGE, html);
        let urls: Vec<&str> = records.iter().map(|r| r.image_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://sg.brand.com/media/g1.jpg",
                "https://sg.brand.com/media/g2.jpg"
            ]
        );
        assert_eq!(records[0].alt_text, "first");
        assert_eq!(records[1].alt_text, "Second view");
    }
}
