//! Port traits the orchestration consumes. Adapters live in [`crate::feed`]
//! and [`crate::taxonomy`]; tests substitute scripted implementations.

use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::CategoryIdentifier;
use crate::errors::Result;

/// Raw paper record as returned by a feed source. Equality and hashing are
/// defined by `arxiv_id` alone so overlapping category queries collapse in a
/// deduplicating set.
#[derive(Debug, Clone, Eq)]
pub struct PaperDto {
    pub arxiv_id: String,
    pub title: String,
    pub abstract_text: String,
    pub published_at: NaiveDate,
    pub categories: Vec<String>,
}

impl PartialEq for PaperDto {
    fn eq(&self, other: &Self) -> bool {
        self.arxiv_id == other.arxiv_id
    }
}

impl Hash for PaperDto {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arxiv_id.hash(state);
    }
}

/// Raw category record as returned by a taxonomy source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDto {
    pub archive: String,
    pub subcategory: Option<String>,
    pub archive_name: Option<String>,
    pub category_name: Option<String>,
    pub description: Option<String>,
}

/// A feed of recent papers for a bounded set of category identifiers.
///
/// The underlying feed returns at most `limit()` entries per call with no
/// pagination cursor; callers must treat a result of exactly `limit()`
/// entries as possibly truncated.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Maximum number of entries one `fetch_latest_papers` call can return.
    fn limit(&self) -> usize;

    /// Fetches the latest papers for the given category identifiers.
    ///
    /// Fails with [`crate::errors::AppError::PaperMissingField`] when any
    /// entry lacks a required field; the whole call fails, no entry is
    /// skipped silently.
    async fn fetch_latest_papers(
        &self,
        category_identifiers: &[CategoryIdentifier],
    ) -> Result<Vec<PaperDto>>;
}

/// The full category taxonomy: every archive and subcategory with its
/// descriptive metadata.
#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<CategoryDto>>;
}
