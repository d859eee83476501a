use chrono::{Datelike, NaiveDate};

use super::Category;

const BASE_URL: &str = "https://arxiv.org";

/// An arXiv paper. `arxiv_id` is the natural key and never changes once
/// assigned; `categories` may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub arxiv_id: String,
    pub title: String,
    pub abstract_text: String,
    pub published_at: NaiveDate,
    pub categories: Vec<Category>,
}

impl Paper {
    pub fn new(
        arxiv_id: impl Into<String>,
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        published_at: NaiveDate,
        categories: Vec<Category>,
    ) -> Self {
        Self {
            arxiv_id: arxiv_id.into(),
            title: title.into(),
            abstract_text: abstract_text.into(),
            published_at,
            categories,
        }
    }

    /// Published date as a `YYYYMMDD` integer.
    pub fn published_at_int(&self) -> u32 {
        self.published_at.year() as u32 * 10_000
            + self.published_at.month() * 100
            + self.published_at.day()
    }

    pub fn summary_url(&self) -> String {
        format!("{BASE_URL}/abs/{}", self.arxiv_id)
    }

    pub fn pdf_url(&self) -> String {
        format!("{BASE_URL}/pdf/{}", self.arxiv_id)
    }

    pub fn html_url(&self) -> String {
        format!("{BASE_URL}/html/{}", self.arxiv_id)
    }
}
