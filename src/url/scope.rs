use crate::url::{normalize_scope, PageRole};
use crate::ConfigError;
use regex::Regex;

/// The part of the web a crawl is allowed to touch, and how URLs inside it
/// are classified
#[derive(Debug, Clone)]
pub struct SiteScope {
    prefix: String,
    seed_url: String,
    item_pattern: Regex,
    listing_pattern: Option<Regex>,
}

impl SiteScope {
    /// Builds a scope from explicit parts
    ///
    /// # Arguments
    ///
    /// * `prefix` - Every in-scope URL starts with this string, once both are
    ///   normalized
    /// * `seed_url` - Always classified as a listing page
    /// * `item_pattern` - Regular expression matched at the start of the URL
    /// * `listing_pattern` - Optional extra listing pages, matched the same way
    pub fn new(
        prefix: &str,
        seed_url: &str,
        item_pattern: &str,
        listing_pattern: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
        };

        let prefix = normalize_scope(prefix).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid site scope '{}': {}", prefix, e))
        })?;

        Ok(Self {
            prefix,
            seed_url: seed_url.to_string(),
            item_pattern: compile(item_pattern)?,
            listing_pattern: listing_pattern.map(compile).transpose()?,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if the absolute URL lies within the site scope
    pub fn contains(&self, url: &str) -> bool {
        url.starts_with(&self.prefix)
    }

    /// Classifies an absolute URL by its shape
    ///
    /// Item patterns take precedence over listing patterns; the seed URL is
    /// always a listing page unless it looks like an item.
    pub fn classify(&self, url: &str) -> PageRole {
        if matches_at_start(&self.item_pattern, url) {
            PageRole::Item
        } else if url == self.seed_url
            || self
                .listing_pattern
                .as_ref()
                .is_some_and(|pattern| matches_at_start(pattern, url))
        {
            PageRole::Listing
        } else {
            PageRole::Other
        }
    }
}

/// Leftmost-first search: a match at offset 0 exists iff the first match starts there
fn matches_at_start(pattern: &Regex, url: &str) -> bool {
    pattern.find(url).is_some_and(|m| m.start() == 0)
}
