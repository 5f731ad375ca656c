//! Use-case catalog.
//!
//! A small, read-only list of labelled records. Every dot points at exactly
//! one entry by index; relatedness between dots is derived from shared tags
//! and never stored.
//!
//! # JSON format
//!
//! ```json
//! [
//!   { "id": 1, "title": "Fraud detection", "description": "...",
//!     "tags": ["finance", "anomaly"], "cluster": "risk" }
//! ]
//! ```
//!
//! `id` and `cluster` accept strings or integers. `description`, `tags` and
//! `cluster` may be omitted.

use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::CatalogError;

/// Entries shipped with the binary.
const BUILTIN_JSON: &str = include_str!("../assets/usecases.json");

/// A labelled, tagged descriptive record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UseCase {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub cluster: String,
}

impl UseCase {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        tags: &[&str],
        cluster: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            cluster: cluster.into(),
        }
    }

    /// True if the two use cases share at least one tag.
    pub fn shares_tag(&self, other: &UseCase) -> bool {
        self.tags.iter().any(|t| other.tags.contains(t))
    }
}

/// Symmetric relatedness test: tag sets intersect.
pub fn are_related(a: &UseCase, b: &UseCase) -> bool {
    a.shares_tag(b)
}

/// Immutable list of use cases, guaranteed non-empty.
#[derive(Debug, Clone)]
pub struct Catalog {
    cases: Vec<UseCase>,
}

impl Catalog {
    /// Build a catalog from records. Fails on an empty list.
    pub fn new(cases: Vec<UseCase>) -> Result<Self, CatalogError> {
        if cases.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { cases })
    }

    /// Parse a JSON array of use-case records.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let cases: Vec<UseCase> = serde_json::from_str(json)?;
        Self::new(cases)
    }

    /// Read and parse a JSON use-case file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        log::info!("loaded {} use cases from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// The built-in catalog used when no file is given.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_JSON)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&UseCase> {
        self.cases.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UseCase> {
        self.cases.iter()
    }

    /// Relatedness between two catalog entries by index.
    ///
    /// Out-of-range indices are never related.
    pub fn related(&self, a: usize, b: usize) -> bool {
        match (self.cases.get(a), self.cases.get(b)) {
            (Some(a), Some(b)) => are_related(a, b),
            _ => false,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Key::deserialize(deserializer)? {
        Key::Text(s) => s,
        Key::Int(n) => n.to_string(),
        Key::Float(f) => f.to_string(),
    })
}
