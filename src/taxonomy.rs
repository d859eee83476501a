//! arXiv category-taxonomy adapter.
//!
//! Scrapes the taxonomy page and walks the `#category_taxonomy_list`
//! section: `h2` elements name a group, `h3` an archive, `h4` a category
//! header of the form `"archive.sub (Category Name)"`, and the following
//! `p` carries the description.

use async_trait::async_trait;
use regex_lite::Regex;
use scraper::{Html, Selector};

use crate::config::TaxonomyConfig;
use crate::errors::{AppError, Result};
use crate::ports::{CategoryDto, CategorySource};

const CATEGORY_PATTERN: &str = r"^([a-zA-Z\-]+)(?:\.([a-zA-Z\-]+))?\s*\(([^)]+)\)";
const ARCHIVE_PATTERN: &str = r"^(.*?)\s*\(";

pub struct ArxivTaxonomy {
    client: reqwest::Client,
    url: String,
}

impl ArxivTaxonomy {
    pub fn new(config: &TaxonomyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.clone(),
        }
    }
}

#[async_trait]
impl CategorySource for ArxivTaxonomy {
    async fn fetch_categories(&self) -> Result<Vec<CategoryDto>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::CategoryFetch(format!("{}: {e}", self.url)))?
            .error_for_status()
            .map_err(|e| AppError::CategoryFetch(format!("{}: {e}", self.url)))?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::CategoryFetch(format!("{}: {e}", self.url)))?;

        parse_taxonomy(&body)
    }
}

/// Parses the taxonomy page body into category records.
fn parse_taxonomy(body: &str) -> Result<Vec<CategoryDto>> {
    let list_selector = selector("#category_taxonomy_list")?;
    let element_selector = selector("h2, h3, h4, p")?;
    let category_re = regex(CATEGORY_PATTERN)?;
    let archive_re = regex(ARCHIVE_PATTERN)?;

    let document = Html::parse_document(body);
    let root = document
        .select(&list_selector)
        .next()
        .ok_or_else(|| {
            AppError::CategoryParse("category taxonomy list not found in the response".into())
        })?;

    let mut categories = Vec::new();
    let mut group_name: Option<String> = None;
    let mut archive_name: Option<String> = None;
    let mut archive: Option<String> = None;
    let mut subcategory: Option<String> = None;
    let mut category_name: Option<String> = None;

    for element in root.select(&element_selector) {
        let text = element.text().collect::<String>();
        match element.value().name() {
            "h2" => {
                group_name = Some(text.trim().to_string());
                archive_name = None;
                archive = None;
                subcategory = None;
                category_name = None;
            }
            "h3" => {
                archive_name = archive_re
                    .captures(&text)
                    .map(|c| c[1].trim().to_string());
                archive = None;
                subcategory = None;
                category_name = None;
            }
            "h4" => {
                let caps = category_re.captures(text.trim()).ok_or_else(|| {
                    AppError::CategoryParse(format!(
                        "failed to parse category header {:?}",
                        text.trim()
                    ))
                })?;
                archive = Some(caps[1].to_string());
                subcategory = caps.get(2).map(|m| m.as_str().to_string());
                category_name = Some(caps[3].to_string());
            }
            "p" => {
                let Some(archive) = archive.clone() else {
                    return Err(AppError::CategoryParse(format!(
                        "missing archive for category {category_name:?} in group {group_name:?}"
                    )));
                };
                categories.push(CategoryDto {
                    archive,
                    subcategory: subcategory.clone(),
                    archive_name: archive_name.clone().or_else(|| group_name.clone()),
                    category_name: category_name.clone(),
                    description: Some(text.trim().to_string()),
                });
            }
            _ => {}
        }
    }

    Ok(categories)
}

fn selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::CategoryParse(format!("bad selector {s:?}: {e}")))
}

fn regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| AppError::CategoryParse(format!("bad pattern {pattern:?}: {e}")))
}
