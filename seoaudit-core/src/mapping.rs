//! Sitemap mapping table: page URL prefix to governing sitemap.
//!
//! A [`SitemapMapping`] is an immutable snapshot. Editing produces a new
//! snapshot which is persisted with [`SitemapMapping::save`] and swapped in
//! by the caller; an audit in progress keeps the snapshot it started with.

use crate::error::{AuditError, Result};
use crate::locale::remove_locale_code;
use seoaudit_scanner::LogSink;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_MAPPING_FILE: &str = "sitemap_mapping.json";

/// Known brand/locale sitemaps, used when no mapping file exists yet.
const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    ("https://hk.sulwhasoo.com/tc_s/", "https://hk.sulwhasoo.com/media/sulwhasoo_hk.xml"),
    ("https://hk.sulwhasoo.com/en_s/", "https://hk.sulwhasoo.com/media/sulwhasoo_hk.xml"),
    ("https://my.sulwhasoo.com/", "https://my.sulwhasoo.com/sitemap.xml"),
    ("https://sg.sulwhasoo.com/", "https://sg.sulwhasoo.com/sitemap.xml"),
    ("https://th.sulwhasoo.com/", "https://th.sulwhasoo.com/sitemap.xml"),
    ("https://tw.sulwhasoo.com/", "https://tw.sulwhasoo.com/media/sulwhasoo_sitemap.xml"),
    ("https://vn.sulwhasoo.com/", "https://vn.sulwhasoo.com/sitemap.xml"),
    ("https://hk.laneige.com/tc_l/", "https://hk.laneige.com/media/laneige_hk.xml"),
    ("https://my.laneige.com/", "https://my.laneige.com/sitemap.xml"),
    ("https://www.laneige.com.vn/", "https://www.laneige.com.vn/media/vn_laneige_sitemap.xml"),
    ("https://ph.laneige.com/", "https://ph.laneige.com/sitemap.xml"),
    ("https://sg.laneige.com/", "https://sg.laneige.com/sitemap.xml"),
    ("https://th.laneige.com/", "https://th.laneige.com/sitemap.xml"),
    ("https://tw.laneige.com/", "https://tw.laneige.com/media/laneige_sitemap.xml"),
    ("https://www.laneige.com/jp/ja/", "https://www.laneige.com/jp/ja/sitemap.xml"),
    ("https://jp.hera.com/", "https://jp.hera.com/sitemap.xml"),
    ("https://hk.ap-beauty.com/tc_a/", "https://hk.amorepacific.com/media/amorepacific_hk.xml"),
    ("https://www.sulwhasoo.com/int/en/", "https://www.sulwhasoo.com/int/en/sitemap.xml"),
    ("https://www.sulwhasoo.com/kr/ko/", "https://www.sulwhasoo.com/kr/ko/sitemap.xml"),
    ("https://www.laneige.com/kr/ko/", "https://www.laneige.com/kr/ko/sitemap.xml"),
    ("https://www.hera.com/kr/ko/", "https://www.hera.com/kr/ko/sitemap.xml"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub prefix: String,
    pub sitemap_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapMapping {
    entries: Vec<MappingEntry>,
}

impl SitemapMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_ENTRIES.iter().copied())
    }

    /// Build a snapshot from ordered pairs. A repeated prefix keeps its first
    /// position and takes the last value, like a JSON object does.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |mapping, (prefix, sitemap)| {
                mapping.with_entry(prefix, sitemap)
            })
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.prefix == prefix)
            .map(|e| e.sitemap_url.as_str())
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.get(prefix).is_some()
    }

    /// New snapshot with `prefix` pointing at `sitemap_url`. An existing
    /// prefix is updated in place; a new one is appended. Blank values are
    /// ignored.
    pub fn with_entry(&self, prefix: impl Into<String>, sitemap_url: impl Into<String>) -> Self {
        let prefix = prefix.into().trim().to_string();
        let sitemap_url = sitemap_url.into().trim().to_string();

        let mut entries = self.entries.clone();
        if prefix.is_empty() || sitemap_url.is_empty() {
            debug!("Ignoring blank mapping entry '{}' -> '{}'", prefix, sitemap_url);
            return Self { entries };
        }

        match entries.iter_mut().find(|e| e.prefix == prefix) {
            Some(entry) => entry.sitemap_url = sitemap_url,
            None => entries.push(MappingEntry {
                prefix,
                sitemap_url,
            }),
        }
        Self { entries }
    }

    pub fn without_entry(&self, prefix: &str) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|e| e.prefix != prefix)
                .cloned()
                .collect(),
        }
    }

    /// Parse a `{ "<prefix>": "<sitemap>" }` object, keeping key order.
    pub fn from_json(json: &str) -> Result<Self> {
        let object: Map<String, Value> = serde_json::from_str(json)?;

        let mut pairs = Vec::with_capacity(object.len());
        for (prefix, value) in object {
            let Value::String(sitemap_url) = value else {
                return Err(AuditError::InvalidMapping(format!(
                    "sitemap for '{}' must be a string",
                    prefix
                )));
            };
            pairs.push((prefix, sitemap_url));
        }

        Ok(Self::from_pairs(pairs))
    }

    pub fn to_json(&self) -> Result<String> {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|e| (e.prefix.clone(), Value::String(e.sitemap_url.clone())))
            .collect();
        Ok(serde_json::to_string_pretty(&object)?)
    }

    /// Load the mapping file, falling back to the built-in table when it
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(
                "No mapping file at {}, using built-in mapping",
                path.display()
            );
            return Ok(Self::builtin());
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Overwrite the mapping file as a whole. The new content is written to a
    /// sibling temporary file first and then renamed over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut content = self.to_json()?;
        content.push('\n');

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = Path::new(&tmp_name);

        fs::write(tmp_path, content)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

/// First mapping entry whose normalized prefix starts the normalized base URL.
///
/// Entries are tried in stored order and the first hit wins, so when two
/// prefixes both match, their order in the table decides.
pub fn find_sitemap_url<'m>(
    base_url: &str,
    mapping: &'m SitemapMapping,
    sink: &dyn LogSink,
) -> Option<&'m str> {
    let normalized_base = remove_locale_code(base_url);

    let found = mapping.entries().iter().find(|entry| {
        let normalized_key = remove_locale_code(&entry.prefix);
        !normalized_key.is_empty() && normalized_base.starts_with(&normalized_key)
    });

    match found {
        Some(entry) => {
            sink.info(&format!(
                "Sitemap mapping found for {}: {}",
                base_url, entry.sitemap_url
            ));
            Some(entry.sitemap_url.as_str())
        }
        None => {
            sink.warn(&format!(
                "No sitemap mapping found for base URL: {}",
                base_url
            ));
            None
        }
    }
}
