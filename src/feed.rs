//! arXiv RSS feed adapter.
//!
//! Queries `{base_url}{id+id+...}` and maps feed entries to [`PaperDto`]s.
//! Any entry missing a required field fails the whole call; retry and
//! backoff policy is out of scope here.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use feed_rs::model::Entry;
use regex_lite::Regex;

use crate::config::FeedConfig;
use crate::domain::CategoryIdentifier;
use crate::errors::{AppError, Result};
use crate::ports::{FeedSource, PaperDto};

pub struct ArxivFeed {
    client: reqwest::Client,
    base_url: String,
    limit: usize,
}

impl ArxivFeed {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            limit: config.limit,
        }
    }

    fn to_dto(entry: &Entry) -> Result<PaperDto> {
        let arxiv_id = extract_arxiv_id(entry)?;
        let title = extract_title(entry)?;
        let abstract_text = extract_abstract(entry)?;
        let published_at = extract_published_date(entry)?;
        let categories = entry
            .categories
            .iter()
            .map(|c| c.term.clone())
            .collect();

        Ok(PaperDto {
            arxiv_id,
            title,
            abstract_text,
            published_at,
            categories,
        })
    }
}

#[async_trait]
impl FeedSource for ArxivFeed {
    fn limit(&self) -> usize {
        self.limit
    }

    async fn fetch_latest_papers(
        &self,
        category_identifiers: &[CategoryIdentifier],
    ) -> Result<Vec<PaperDto>> {
        let query = category_identifiers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("+");
        let url = format!("{}{}", self.base_url, query);

        tracing::debug!(%url, groups = category_identifiers.len(), "Fetching arXiv feed");

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let feed = feed_rs::parser::parse(body.as_ref())
            .map_err(|e| AppError::Feed(e.to_string()))?;

        feed.entries.iter().map(Self::to_dto).collect()
    }
}

// new-style `2501.12345` (optionally `v1`) or old-style `hep-th/9901001`
const ARXIV_ID_PATTERN: &str = r"^(\d{4}\.\d{4,5}|[a-zA-Z.\-]+/\d{7})(v\d+)?$";

/// The feed carries ids like `oai:arXiv.org:2501.12345`; the arXiv id is the
/// part after the last colon. feed-rs synthesizes a hash id for entries with
/// no guid, so anything that does not look like an arXiv id counts as a
/// missing id rather than passing through.
fn extract_arxiv_id(entry: &Entry) -> Result<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(ARXIV_ID_PATTERN).expect("literal pattern compiles"));

    let raw = entry.id.trim();
    let id = raw.rsplit(':').next().unwrap_or(raw).trim();
    if !pattern.is_match(id) {
        return Err(AppError::PaperMissingField("id".into()));
    }
    Ok(id.to_string())
}

fn extract_title(entry: &Entry) -> Result<String> {
    entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .ok_or_else(|| AppError::PaperMissingField("title".into()))
}

/// Summaries are prefixed with announcement boilerplate ending in
/// `Abstract:`; only the text after that marker is the abstract.
fn extract_abstract(entry: &Entry) -> Result<String> {
    let summary = entry
        .summary
        .as_ref()
        .ok_or_else(|| AppError::PaperMissingField("summary".into()))?;
    let text = summary
        .content
        .rsplit("Abstract:")
        .next()
        .unwrap_or(&summary.content);
    Ok(text.trim().replace('\n', " "))
}

fn extract_published_date(entry: &Entry) -> Result<NaiveDate> {
    entry
        .published
        .map(|dt| dt.date_naive())
        .ok_or_else(|| AppError::PaperMissingField("published".into()))
}
