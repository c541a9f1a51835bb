//! The prompt catalog.
//!
//! A catalog is an ordered list of categories, each holding display
//! metadata and the prompts that belong to it. It is loaded once at
//! startup and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Catalog bundled with the crate.
const BUILTIN_CATALOG: &str = include_str!("../data/cards.json");

/// Errors from loading a catalog. These are fatal for a session.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Category at position {0} has an empty id")]
    EmptyId(usize),

    #[error("Duplicate category id: {0}")]
    DuplicateId(String),
}

/// Presentation tokens for a category.
///
/// The engine carries these through to drawn cards without interpreting them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMeta {
    /// Style token for the category badge and toggle button.
    #[serde(default)]
    pub color: String,

    /// Style token for the backdrop shown behind a card of this category.
    #[serde(default)]
    pub gradient: String,
}

impl DisplayMeta {
    pub fn new(color: impl Into<String>, gradient: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            gradient: gradient.into(),
        }
    }
}

/// A named group of prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub meta: DisplayMeta,
    #[serde(default)]
    pub prompts: Vec<String>,
}

impl Category {
    /// Create a category with empty display metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            meta: DisplayMeta::default(),
            prompts: Vec::new(),
        }
    }

    pub fn with_meta(mut self, meta: DisplayMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_prompts<I, S>(mut self, prompts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prompts = prompts.into_iter().map(Into::into).collect();
        self
    }
}

/// On-disk layout of a catalog document.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    categories: Vec<Category>,
}

/// An immutable, ordered set of categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Build a catalog from categories, checking that ids are present and unique.
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        {
            let mut seen = HashSet::new();
            for (position, category) in categories.iter().enumerate() {
                if category.id.trim().is_empty() {
                    return Err(CatalogError::EmptyId(position));
                }
                if !seen.insert(category.id.as_str()) {
                    return Err(CatalogError::DuplicateId(category.id.clone()));
                }
            }
        }
        Ok(Self { categories })
    }

    /// Parse a catalog document.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(content)?;
        Self::new(document.categories)
    }

    /// Load a catalog document from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let catalog = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            categories = catalog.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// The catalog that ships with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of prompts across every category.
    pub fn total_prompts(&self) -> usize {
        self.categories.iter().map(|c| c.prompts.len()).sum()
    }
}
