//! Typed parse of sitemap protocol documents.

use crate::error::{Result, ScanError};
use quick_xml::Reader;
use quick_xml::events::Event;

#[derive(Debug, Clone, Copy)]
enum EntryKind {
    Sitemap,
    Url,
}

/// A fetched sitemap, classified once after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: child sitemap URLs from `<sitemap><loc>`
    Index(Vec<String>),
    /// `<urlset>`: page URLs from `<url><loc>`
    UrlSet(Vec<String>),
}

impl SitemapDocument {
    /// Parse a sitemap body. Any `<sitemap>` element makes the document an
    /// index; otherwise every `<url><loc>` is collected. Tags are matched
    /// by local name so namespace prefixes do not matter.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        let mut is_index = false;
        let mut children = Vec::new();
        let mut urls = Vec::new();

        // Depth of the open <sitemap>/<url> entry. Only a <loc> directly
        // under it counts, so <image:loc> and friends are ignored.
        let mut depth = 0usize;
        let mut entry: Option<(usize, EntryKind)> = None;
        let mut in_loc = false;
        let mut loc_text = String::new();
        let mut current_loc: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    match e.local_name().as_ref() {
                        b"sitemap" if entry.is_none() => {
                            is_index = true;
                            entry = Some((depth, EntryKind::Sitemap));
                            current_loc = None;
                        }
                        b"url" if entry.is_none() => {
                            entry = Some((depth, EntryKind::Url));
                            current_loc = None;
                        }
                        b"loc" => {
                            if matches!(entry, Some((d, _)) if d + 1 == depth) {
                                in_loc = true;
                                loc_text.clear();
                            }
                        }
                        _ => {}
                    }
                    depth += 1;
                }
                Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"sitemap" {
                        is_index = true;
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if in_loc {
                        let text = e
                            .unescape()
                            .map_err(|err| ScanError::ParseError(err.to_string()))?;
                        loc_text.push_str(&text);
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if in_loc {
                        loc_text.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    match e.local_name().as_ref() {
                        b"loc" if in_loc => {
                            in_loc = false;
                            let loc = loc_text.trim();
                            if current_loc.is_none() && !loc.is_empty() {
                                current_loc = Some(loc.to_string());
                            }
                        }
                        b"sitemap" | b"url" => {
                            if let Some((d, kind)) = entry
                                && d == depth
                            {
                                entry = None;
                                if let Some(loc) = current_loc.take() {
                                    match kind {
                                        EntryKind::Sitemap => children.push(loc),
                                        EntryKind::Url => urls.push(loc),
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ScanError::ParseError(format!(
                        "malformed XML at position {}: {}",
                        reader.error_position(),
                        e
                    )));
                }
                _ => {}
            }
            buf.clear();
        }

        if is_index {
            Ok(SitemapDocument::Index(children))
        } else {
            Ok(SitemapDocument::UrlSet(urls))
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, SitemapDocument::Index(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sitemap_index() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <sitemap><loc>https://example.com/a.xml</loc><lastmod>2024-01-01</lastmod></sitemap>
              <sitemap><loc> https://example.com/b.xml </loc></sitemap>
              <sitemap><lastmod>2024-01-01</lastmod></sitemap>
            </sitemapindex>"#;

        let doc = SitemapDocument::parse(xml).unwrap();
        assert_eq!(
            doc,
            SitemapDocument::Index(vec![
                "https://example.com/a.xml".to_string(),
                "https://example.com/b.xml".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_url_set_unescapes_entities() {
        let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://example.com/p?a=1&amp;b=2</loc></url>
              <url><loc><![CDATA[https://example.com/cdata]]></loc></url>
            </urlset>"#;

        let doc = SitemapDocument::parse(xml).unwrap();
        assert_eq!(
            doc,
            SitemapDocument::UrlSet(vec![
                "https://example.com/p?a=1&b=2".to_string(),
                "https://example.com/cdata".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_prefixed_tags() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
              <sm:url><sm:loc>https://example.com/x</sm:loc></sm:url>
            </sm:urlset>"#;

        let doc = SitemapDocument::parse(xml).unwrap();
        assert_eq!(
            doc,
            SitemapDocument::UrlSet(vec!["https://example.com/x".to_string()])
        );
    }

    #[test]
    fn test_image_loc_is_not_a_page() {
        let xml = r#"<urlset xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
              <url>
                <loc>https://example.com/page</loc>
                <image:image><image:loc>https://example.com/img.png</image:loc></image:image>
              </url>
            </urlset>"#;

        let doc = SitemapDocument::parse(xml).unwrap();
        assert_eq!(
            doc,
            SitemapDocument::UrlSet(vec!["https://example.com/page".to_string()])
        );
    }

    #[test]
    fn test_parse_empty_document() {
        let doc = SitemapDocument::parse("<urlset></urlset>").unwrap();
        assert_eq!(doc, SitemapDocument::UrlSet(vec![]));
        assert!(!doc.is_index());
    }

    #[test]
    fn test_parse_malformed_document() {
        let result = SitemapDocument::parse("<urlset><url><loc>x</url></urlset>");
        assert!(matches!(result, Err(ScanError::ParseError(_))));
    }
}
