//! HTML extraction of links and records
//!
//! This module turns a fetched body into:
//! - In-scope links to feed back into the frontier
//! - A record, depending on the page role and the policy variant

use crate::config::{ExtractConfig, PolicyVariant};
use crate::output::{ItemRecord, PageRecord, Record};
use crate::url::{normalize_url, PageRole, SiteScope};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use url::Url;

/// Failure to turn a body into a queryable document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },
}

/// Links and optional record extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// In-scope absolute links, deduplicated in first-seen order
    pub links: Vec<String>,
    pub record: Option<Record>,
}

/// Compiled selectors for every field the extractor reads
#[derive(Debug, Clone)]
struct Selectors {
    links: Selector,
    title: Selector,
    description: Selector,
    feature_row: Selector,
    feature_cell: Selector,
    item_name: Selector,
    item_paragraph: Selector,
    item_image: Selector,
}

impl Selectors {
    fn compile(config: &ExtractConfig) -> Result<Self, ConfigError> {
        let parse = |selector: &str| {
            Selector::parse(selector)
                .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
        };

        Ok(Self {
            links: parse("a[href]")?,
            title: parse(&config.title_selector)?,
            description: parse(&config.description_selector)?,
            feature_row: parse(&config.feature_row_selector)?,
            feature_cell: parse(&config.feature_cell_selector)?,
            item_name: parse(&config.item_name_selector)?,
            item_paragraph: parse(&config.item_paragraph_selector)?,
            item_image: parse(&config.item_image_selector)?,
        })
    }
}

/// Extracts links and records from fetched pages
#[derive(Debug, Clone)]
pub struct Extractor {
    scope: SiteScope,
    base_url: Url,
    policy: PolicyVariant,
    selectors: Selectors,
}

impl Extractor {
    /// Creates an extractor
    ///
    /// # Arguments
    ///
    /// * `scope` - Site scope used to filter links and classify pages
    /// * `base_url` - Fixed base every `href` is resolved against
    /// * `policy` - Decides which pages produce records and what they hold
    /// * `config` - CSS selectors for the record fields
    pub fn new(
        scope: SiteScope,
        base_url: Url,
        policy: PolicyVariant,
        config: &ExtractConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            base_url,
            policy,
            selectors: Selectors::compile(config)?,
        })
    }

    pub fn scope(&self) -> &SiteScope {
        &self.scope
    }

    /// Parses a fetched body into a document
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected, so
    /// pages in legacy encodings still parse. A body containing NUL bytes is
    /// binary data (an image, an archive) and is a parse failure for this URL.
    pub fn parse_document(&self, page_url: &str, body: &[u8]) -> Result<Html, ExtractError> {
        if body.contains(&0) {
            return Err(ExtractError::Parse {
                url: page_url.to_string(),
                message: "body is binary data, not markup".to_string(),
            });
        }

        let text = String::from_utf8_lossy(body);
        if let Cow::Owned(_) = text {
            tracing::debug!("{} is not valid UTF-8, invalid bytes replaced", page_url);
        }
        Ok(Html::parse_document(&text))
    }

    /// Parses a body and extracts from it in one step
    pub fn extract_body(&self, page_url: &str, body: &[u8]) -> Result<Extraction, ExtractError> {
        let document = self.parse_document(page_url, body)?;
        Ok(self.extract(page_url, &document))
    }

    /// Extracts links and the page's record from a parsed document
    ///
    /// Missing optional elements never fail the extraction.
    pub fn extract(&self, page_url: &str, document: &Html) -> Extraction {
        let links = self.extract_links(document);

        let record = match self.policy {
            PolicyVariant::Minimal => {
                if self.scope.classify(page_url) == PageRole::Item {
                    self.extract_item(page_url, document).map(Record::from)
                } else {
                    None
                }
            }
            PolicyVariant::Extended => {
                Some(self.extract_page(page_url, document, links.clone()).into())
            }
        };

        Extraction { links, record }
    }

    /// Extracts all in-scope links, deduplicated in first-seen order
    pub fn extract_links(&self, document: &Html) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&self.selectors.links) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(absolute) = resolve_link(href, &self.base_url) else {
                continue;
            };
            if !self.scope.contains(&absolute) {
                tracing::trace!("Dropping out-of-scope link {}", absolute);
                continue;
            }
            if seen.insert(absolute.clone()) {
                links.push(absolute);
            }
        }

        links
    }

    /// Builds the minimal-policy record; `None` if any required element is absent
    fn extract_item(&self, page_url: &str, document: &Html) -> Option<ItemRecord> {
        let name = document.select(&self.selectors.item_name).next();
        let paragraph = document.select(&self.selectors.item_paragraph).next();
        let image_src = document
            .select(&self.selectors.item_image)
            .next()
            .and_then(|img| img.value().attr("src"));

        match (name, paragraph, image_src) {
            (Some(name), Some(paragraph), Some(image_src)) => Some(ItemRecord {
                url: page_url.to_string(),
                name: element_text(name),
                paragraph: element_text(paragraph),
                image_src: image_src.trim().to_string(),
            }),
            _ => {
                tracing::debug!("Item page {} is missing a required field", page_url);
                None
            }
        }
    }

    /// Builds the extended-policy record
    fn extract_page(&self, page_url: &str, document: &Html, links: Vec<String>) -> PageRecord {
        let first_text = |selector: &Selector| {
            document
                .select(selector)
                .next()
                .map(element_text)
                .unwrap_or_default()
        };

        PageRecord {
            url: page_url.to_string(),
            title: first_text(&self.selectors.title),
            description: first_text(&self.selectors.description),
            features: self.extract_features(document),
            links,
        }
    }

    /// Parses the feature table: first cell is the key, second the value
    fn extract_features(&self, document: &Html) -> BTreeMap<String, String> {
        let mut features = BTreeMap::new();

        for row in document.select(&self.selectors.feature_row) {
            let mut cells = row.select(&self.selectors.feature_cell);
            let (Some(key), Some(value)) = (cells.next(), cells.next()) else {
                continue;
            };
            features.insert(element_text(key).to_lowercase(), element_text(value));
        }

        features
    }
}

/// Text content of an element with whitespace runs collapsed and ends trimmed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a link href to a normalized absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links (same page anchors)
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_url(absolute.as_str())
        .ok()
        .map(|url| url.to_string())
}
