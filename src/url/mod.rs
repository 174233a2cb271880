//! URL handling module
//!
//! This module provides URL normalization, the site scope check, and page
//! role classification.

mod normalize;
mod scope;

use std::fmt;

// Re-export main functions
pub use normalize::{normalize_scope, normalize_url};
pub use scope::SiteScope;

/// Role of a page, decided from the shape of its URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRole {
    /// Page enumerating or linking to item pages
    Listing,
    /// Page representing a single catalog entry
    Item,
    /// Anything else inside the site scope
    Other,
}

impl PageRole {
    /// Returns true if URLs of this role go to the priority queue
    pub fn is_priority(&self) -> bool {
        matches!(self, Self::Item)
    }
}

impl fmt::Display for PageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing => write!(f, "listing"),
            Self::Item => write!(f, "item"),
            Self::Other => write!(f, "other"),
        }
    }
}
