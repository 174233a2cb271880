//! Records produced by visiting pages

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record of any visited page, produced under the extended policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,

    /// Title text, empty when the page has none
    pub title: String,

    /// Description text, empty when the page has none
    pub description: String,

    /// Feature table rows, keyed by the lower-cased first cell
    pub features: BTreeMap<String, String>,

    /// In-scope links found on the page, in first-seen order
    pub links: Vec<String>,
}

/// Record of an item page, produced under the minimal policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub url: String,
    pub name: String,
    pub paragraph: String,
    #[serde(rename = "imageSrc")]
    pub image_src: String,
}

/// Structured result of visiting one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Page(PageRecord),
    Item(ItemRecord),
}

impl Record {
    /// URL of the page the record was extracted from
    pub fn url(&self) -> &str {
        match self {
            Self::Page(page) => &page.url,
            Self::Item(item) => &item.url,
        }
    }

    /// Returns true if the record's URL carries a query string
    ///
    /// Query-string variants of an item page are reported separately from
    /// the main records in the console summary.
    pub fn has_query(&self) -> bool {
        self.url().contains('?')
    }

    /// Labeled lines describing the record in the console summary
    pub fn labeled_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Item(item) => vec![
                ("URL", item.url.clone()),
                ("Name", item.name.clone()),
                ("Paragraph", item.paragraph.clone()),
                ("Image", item.image_src.clone()),
            ],
            Self::Page(page) => vec![
                ("URL", page.url.clone()),
                ("Title", page.title.clone()),
                ("Description", page.description.clone()),
                ("Features", page.features.len().to_string()),
            ],
        }
    }
}

impl From<PageRecord> for Record {
    fn from(record: PageRecord) -> Self {
        Self::Page(record)
    }
}

impl From<ItemRecord> for Record {
    fn from(record: ItemRecord) -> Self {
        Self::Item(record)
    }
}
