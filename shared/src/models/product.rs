//! Product reference data and catalog search

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A product identified by its catalog code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub code: String,
    pub description: String,
    #[serde(rename = "lab")]
    pub laboratory: String,
    pub expiry_date: Option<NaiveDate>,
    /// Nationally manufactured (as opposed to imported)
    pub national: Option<bool>,
}

impl Product {
    pub fn new(code: impl Into<String>, description: impl Into<String>, laboratory: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            laboratory: laboratory.into(),
            expiry_date: None,
            national: None,
        }
    }
}

/// Normalized, non-blank search query.
///
/// Matches case-insensitively on code, description or laboratory substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Returns `None` for a blank query; a blank search yields no results
    pub fn parse(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, product: &Product) -> bool {
        product.code.to_lowercase().contains(&self.0)
            || product.description.to_lowercase().contains(&self.0)
            || product.laboratory.to_lowercase().contains(&self.0)
    }
}
