//! Vector index port and an in-memory cosine-similarity implementation.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Category, CategoryIdentifier, Paper};
use crate::errors::{AppError, Result};

/// Technology-agnostic filter for vector search.
#[derive(Debug, Clone, Default)]
pub struct VectorSearchFilter {
    /// Categories the paper must all carry (AND).
    pub categories: Option<Vec<Category>>,
    /// Only papers published on or after this date.
    pub published_after: Option<NaiveDate>,
    /// Only papers published on or before this date.
    pub published_before: Option<NaiveDate>,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts one embedding per paper; the slices must be the same length.
    async fn insert_embeddings(
        &self,
        embeddings: &[Vec<f32>],
        papers: &[Paper],
    ) -> Result<()>;

    async fn delete_embeddings(&self, arxiv_ids: &[String]) -> Result<()>;

    /// Returns the arXiv ids of the `top_k` most similar papers passing the
    /// filter, most similar first.
    async fn query_embedding(
        &self,
        query: &[f32],
        top_k: usize,
        filter: Option<&VectorSearchFilter>,
    ) -> Result<Vec<String>>;
}

struct IndexEntry {
    arxiv_id: String,
    embedding: Vec<f32>,
    categories: Vec<CategoryIdentifier>,
    published_at: NaiveDate,
}

/// Cosine-similarity index held in process memory. Suitable for tests and
/// small single-node deployments; a persistent backend can replace it behind
/// the same trait.
#[derive(Default)]
pub struct InMemoryVectorIndex {
    entries: RwLock<Vec<IndexEntry>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn insert_embeddings(
        &self,
        embeddings: &[Vec<f32>],
        papers: &[Paper],
    ) -> Result<()> {
        if embeddings.len() != papers.len() {
            return Err(AppError::Embedding(format!(
                "got {} embeddings for {} papers",
                embeddings.len(),
                papers.len()
            )));
        }

        let mut entries = self.entries.write().expect("vector index lock poisoned");
        for (embedding, paper) in embeddings.iter().zip(papers) {
            // re-inserting a paper replaces its previous embedding
            entries.retain(|e| e.arxiv_id != paper.arxiv_id);
            entries.push(IndexEntry {
                arxiv_id: paper.arxiv_id.clone(),
                embedding: embedding.clone(),
                categories: paper
                    .categories
                    .iter()
                    .map(|c| c.identifier.clone())
                    .collect(),
                published_at: paper.published_at,
            });
        }
        Ok(())
    }

    async fn delete_embeddings(&self, arxiv_ids: &[String]) -> Result<()> {
        let mut entries = self.entries.write().expect("vector index lock poisoned");
        entries.retain(|e| !arxiv_ids.contains(&e.arxiv_id));
        Ok(())
    }

    async fn query_embedding(
        &self,
        query: &[f32],
        top_k: usize,
        filter: Option<&VectorSearchFilter>,
    ) -> Result<Vec<String>> {
        let entries = self.entries.read().expect("vector index lock poisoned");

        let mut scored: Vec<(f32, &IndexEntry)> = entries
            .iter()
            .filter(|e| matches_filter(e, filter))
            .map(|e| (cosine_similarity(query, &e.embedding), e))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(_, e)| e.arxiv_id.clone())
            .collect())
    }
}

fn matches_filter(entry: &IndexEntry, filter: Option<&VectorSearchFilter>) -> bool {
    let Some(filter) = filter else { return true };

    if let Some(categories) = &filter.categories {
        if !categories
            .iter()
            .all(|c| entry.categories.contains(&c.identifier))
        {
            return false;
        }
    }
    if let Some(after) = filter.published_after {
        if entry.published_at < after {
            return false;
        }
    }
    if let Some(before) = filter.published_before {
        if entry.published_at > before {
            return false;
        }
    }
    true
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(arxiv_id: &str, category: &str, date: (i32, u32, u32)) -> Paper {
        Paper::new(
            arxiv_id,
            "title",
            "abstract",
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            vec![Category::parse(category)],
        )
    }

    #[tokio::test]
    async fn ranks_by_cosine_similarity() {
        let index = InMemoryVectorIndex::new();
        index
            .insert_embeddings(
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
                &[
                    paper("a", "cs.CV", (2025, 1, 1)),
                    paper("b", "cs.CL", (2025, 1, 2)),
                    paper("c", "cs.CV", (2025, 1, 3)),
                ],
            )
            .await
            .unwrap();

        let ids = index
            .query_embedding(&[1.0, 0.0], 2, None)
            .await
            .unwrap();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn filters_by_category_and_date() {
        let index = InMemoryVectorIndex::new();
        index
            .insert_embeddings(
                &[vec![1.0, 0.0], vec![1.0, 0.0]],
                &[
                    paper("old", "cs.CV", (2024, 1, 1)),
                    paper("new", "cs.CL", (2025, 6, 1)),
                ],
            )
            .await
            .unwrap();

        let filter = VectorSearchFilter {
            categories: Some(vec![Category::parse("cs.CL")]),
            published_after: Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            published_before: None,
        };
        let ids = index
            .query_embedding(&[1.0, 0.0], 10, Some(&filter))
            .await
            .unwrap();
        assert_eq!(ids, vec!["new"]);
    }

    #[tokio::test]
    async fn reinsert_and_delete_replace_entries() {
        let index = InMemoryVectorIndex::new();
        let p = paper("a", "cs.CV", (2025, 1, 1));
        index
            .insert_embeddings(&[vec![1.0, 0.0]], &[p.clone()])
            .await
            .unwrap();
        index
            .insert_embeddings(&[vec![0.0, 1.0]], &[p])
            .await
            .unwrap();

        let ids = index.query_embedding(&[0.0, 1.0], 10, None).await.unwrap();
        assert_eq!(ids, vec!["a"]);

        index.delete_embeddings(&["a".to_string()]).await.unwrap();
        let ids = index.query_embedding(&[0.0, 1.0], 10, None).await.unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn mismatched_lengths_are_rejected() {
        let index = InMemoryVectorIndex::new();
        let err = index
            .insert_embeddings(&[vec![1.0]], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Embedding(_)));
    }
}
