//! Fetch orchestration: the category-aware adaptive paper fetch and the
//! taxonomy refresh.
//!
//! The feed source returns at most `limit()` entries per call with no
//! pagination cursor. A result of exactly that size from a splittable group
//! is suspected truncated, so the group is subdivided (bisection for multi-
//! identifier groups, archive expansion into subcategories for a single
//! archive) and re-queried until every result set is believed complete.
//! Groups are processed strictly sequentially: splitting decisions depend on
//! the previous group's result size.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::db::uow::UnitOfWork;
use crate::domain::{Category, CategoryIdentifier, Paper};
use crate::errors::{AppError, Result};
use crate::ports::{CategoryDto, CategorySource, FeedSource, PaperDto};

/// Upper bound when resolving "all stored categories"; the arXiv taxonomy is
/// a few hundred rows.
const CATEGORY_RESOLVE_LIMIT: u64 = 10_000;

pub struct FetchService {
    db: DatabaseConnection,
    feed: Arc<dyn FeedSource>,
    taxonomy: Arc<dyn CategorySource>,
}

impl FetchService {
    pub fn new(
        db: DatabaseConnection,
        feed: Arc<dyn FeedSource>,
        taxonomy: Arc<dyn CategorySource>,
    ) -> Self {
        Self { db, feed, taxonomy }
    }

    /// Fetches the full category taxonomy and upserts it.
    pub async fn fetch_and_store_categories(&self) -> Result<Vec<Category>> {
        let dtos = self.taxonomy.fetch_categories().await?;
        let categories: Vec<Category> = dtos.into_iter().map(to_category).collect();

        let uow = UnitOfWork::begin(&self.db).await?;
        uow.papers().upsert_categories(&categories).await?;
        uow.commit().await?;

        tracing::info!(count = categories.len(), "Stored category taxonomy");
        Ok(categories)
    }

    /// Fetches the complete set of recent papers for the selection and
    /// persists it.
    ///
    /// With `None` (or an empty list) the selection defaults to every stored
    /// category; if none are stored the operation fails with
    /// [`AppError::NoCategories`]. Any failure aborts the whole operation
    /// before the transaction commits, leaving the store untouched.
    pub async fn fetch_and_store_latest_papers(
        &self,
        selection: Option<Vec<String>>,
    ) -> Result<Vec<Paper>> {
        let roots = self.resolve_selection(selection).await?;
        let dtos = self.fetch_complete(roots).await?;

        let uow = UnitOfWork::begin(&self.db).await?;
        let papers = {
            let repo = uow.papers();

            // One enrichment lookup per distinct category string, not per
            // paper. Categories the store does not know are synthesized with
            // only the identifier; they are persisted later as a side effect
            // of the paper upsert, not of enrichment itself.
            let mut enriched: HashMap<String, Category> = HashMap::new();
            for dto in &dtos {
                for category_str in &dto.categories {
                    if !enriched.contains_key(category_str) {
                        let identifier = CategoryIdentifier::parse(category_str);
                        let category = repo
                            .get_category(&identifier)
                            .await?
                            .unwrap_or_else(|| Category::new(identifier));
                        enriched.insert(category_str.clone(), category);
                    }
                }
            }

            let papers: Vec<Paper> = dtos
                .into_iter()
                .map(|dto| {
                    let categories = dto
                        .categories
                        .iter()
                        .filter_map(|s| enriched.get(s).cloned())
                        .collect();
                    Paper {
                        arxiv_id: dto.arxiv_id,
                        title: dto.title,
                        abstract_text: dto.abstract_text,
                        published_at: dto.published_at,
                        categories,
                    }
                })
                .collect();

            for paper in &papers {
                repo.upsert_paper(paper).await?;
            }
            papers
        };
        uow.commit().await?;

        tracing::info!(count = papers.len(), "Stored latest papers");
        Ok(papers)
    }

    /// Resolves the category selection: explicit strings are parsed, an
    /// absent selection falls back to every stored category identifier.
    async fn resolve_selection(
        &self,
        selection: Option<Vec<String>>,
    ) -> Result<Vec<CategoryIdentifier>> {
        match selection {
            Some(list) if !list.is_empty() => Ok(list
                .iter()
                .map(|s| CategoryIdentifier::parse(s))
                .collect()),
            _ => {
                let uow = UnitOfWork::begin(&self.db).await?;
                let stored = uow.papers().list_categories(CATEGORY_RESOLVE_LIMIT).await?;
                uow.rollback().await?;

                if stored.is_empty() {
                    return Err(AppError::NoCategories);
                }
                Ok(stored.into_iter().map(|c| c.identifier).collect())
            }
        }
    }

    /// Adaptive paginated fetch over a FIFO queue of category groups.
    ///
    /// Accumulates every fetched record into a first-seen-wins set keyed by
    /// arXiv id, so overlapping archive- and subcategory-level queries never
    /// produce duplicates.
    async fn fetch_complete(&self, roots: Vec<CategoryIdentifier>) -> Result<Vec<PaperDto>> {
        let limit = self.feed.limit();
        let mut queue: VecDeque<Vec<CategoryIdentifier>> = VecDeque::from([roots]);
        let mut seen: HashSet<String> = HashSet::new();
        let mut results: Vec<PaperDto> = Vec::new();
        // the taxonomy is fetched at most once per call, and only when an
        // archive-level group needs expanding
        let mut taxonomy_cache: Option<Vec<CategoryDto>> = None;

        while let Some(group) = queue.pop_front() {
            let page = self.feed.fetch_latest_papers(&group).await?;
            let at_cap = page.len() == limit;

            for dto in page {
                if seen.insert(dto.arxiv_id.clone()) {
                    results.push(dto);
                }
            }

            if !at_cap {
                continue;
            }

            if group.len() >= 2 {
                let mid = group.len() / 2;
                let (first, second) = group.split_at(mid);
                tracing::debug!(
                    group = group.len(),
                    "Result hit the feed cap; bisecting the category group"
                );
                queue.push_back(first.to_vec());
                queue.push_back(second.to_vec());
            } else if let Some(identifier) = group.first() {
                if identifier.is_archive() {
                    let subcategories = self
                        .subcategories_of(&identifier.archive, &mut taxonomy_cache)
                        .await?;
                    if subcategories.is_empty() {
                        // An archive with no subcategories cannot be split
                        // further; the possibly-truncated result is accepted
                        // as final. Known completeness gap.
                        tracing::warn!(
                            archive = %identifier.archive,
                            "Result hit the feed cap but the archive has no subcategories"
                        );
                    } else {
                        tracing::debug!(
                            archive = %identifier.archive,
                            subcategories = subcategories.len(),
                            "Result hit the feed cap; expanding archive into subcategories"
                        );
                        queue.push_back(subcategories);
                    }
                }
                // A single-subcategory group at the cap is trusted as
                // complete; there is nothing narrower to query.
            }
        }

        Ok(results)
    }

    async fn subcategories_of(
        &self,
        archive: &str,
        cache: &mut Option<Vec<CategoryDto>>,
    ) -> Result<Vec<CategoryIdentifier>> {
        if cache.is_none() {
            *cache = Some(self.taxonomy.fetch_categories().await?);
        }
        let taxonomy = cache.as_deref().unwrap_or_default();

        Ok(taxonomy
            .iter()
            .filter(|dto| dto.archive == archive && dto.subcategory.is_some())
            .map(|dto| CategoryIdentifier::new(dto.archive.clone(), dto.subcategory.clone()))
            .collect())
    }
}

fn to_category(dto: CategoryDto) -> Category {
    Category {
        identifier: CategoryIdentifier::new(dto.archive, dto.subcategory),
        archive_name: dto.archive_name,
        category_name: dto.category_name,
        description: dto.description,
    }
}
