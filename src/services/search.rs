//! Semantic retrieval over stored papers.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::db::uow::UnitOfWork;
use crate::domain::Paper;
use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::vector::{VectorIndex, VectorSearchFilter};

pub struct SearchService {
    db: DatabaseConnection,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl SearchService {
    pub fn new(
        db: DatabaseConnection,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            db,
            embedder,
            index,
        }
    }

    /// Embeds title and abstract of each paper and inserts the vectors.
    pub async fn index_papers(&self, papers: &[Paper]) -> Result<()> {
        if papers.is_empty() {
            return Ok(());
        }
        let texts: Vec<String> = papers
            .iter()
            .map(|p| format!("{}\n{}", p.title, p.abstract_text))
            .collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;
        self.index.insert_embeddings(&embeddings, papers).await?;

        tracing::info!(count = papers.len(), "Indexed paper embeddings");
        Ok(())
    }

    /// Returns the stored papers most similar to the query, most similar
    /// first. Ids the index returns but the store no longer has are skipped.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&VectorSearchFilter>,
    ) -> Result<Vec<Paper>> {
        let query_embedding = self.embedder.embed_query(query).await?;
        let arxiv_ids = self
            .index
            .query_embedding(&query_embedding, top_k, filter)
            .await?;

        let uow = UnitOfWork::begin(&self.db).await?;
        let mut papers = Vec::with_capacity(arxiv_ids.len());
        {
            let repo = uow.papers();
            for arxiv_id in &arxiv_ids {
                if let Some(paper) = repo.get_paper(arxiv_id).await? {
                    papers.push(paper);
                }
            }
        }
        uow.rollback().await?;

        Ok(papers)
    }
}
