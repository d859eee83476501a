//! Repository for papers and categories with category-aware reconciliation.
//!
//! All operations run against the connection they are handed, so a
//! repository bound to a [`crate::db::uow::UnitOfWork`] transaction takes
//! part in that transaction.

use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::db::models::{category, paper, paper_category};
use crate::domain::{Category, CategoryIdentifier, Paper};
use crate::errors::{AppError, Result};

pub struct PaperRepository<'c, C: ConnectionTrait> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> PaperRepository<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Inserts the category or, if a row with the same (archive, subcategory)
    /// key exists, overwrites its descriptive fields in place. Idempotent.
    pub async fn upsert_category(&self, cat: &Category) -> Result<()> {
        let existing = category::Entity::find()
            .filter(identifier_condition(&cat.identifier))
            .one(self.conn)
            .await?;

        match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.archive_name = Set(cat.archive_name.clone());
                active.category_name = Set(cat.category_name.clone());
                active.description = Set(cat.description.clone());
                active.update(self.conn).await?;
            }
            None => {
                to_category_active(cat).insert(self.conn).await?;
            }
        }
        Ok(())
    }

    /// Batch variant of [`Self::upsert_category`]; semantics identical to the
    /// per-item upsert applied within the surrounding transaction.
    pub async fn upsert_categories(&self, categories: &[Category]) -> Result<()> {
        for cat in categories {
            self.upsert_category(cat).await?;
        }
        Ok(())
    }

    pub async fn get_category(
        &self,
        identifier: &CategoryIdentifier,
    ) -> Result<Option<Category>> {
        let model = category::Entity::find()
            .filter(identifier_condition(identifier))
            .one(self.conn)
            .await?;
        Ok(model.map(to_category))
    }

    pub async fn delete_category(&self, identifier: &CategoryIdentifier) -> Result<()> {
        let model = category::Entity::find()
            .filter(identifier_condition(identifier))
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::CategoryNotFound {
                archive: identifier.archive.clone(),
                subcategory: identifier.subcategory.clone(),
            })?;

        // Associations are removed explicitly so the behavior does not depend
        // on backend foreign-key enforcement.
        paper_category::Entity::delete_many()
            .filter(paper_category::Column::CategoryId.eq(model.id))
            .exec(self.conn)
            .await?;
        model.delete(self.conn).await?;
        Ok(())
    }

    /// Lists categories in insertion (id) order.
    pub async fn list_categories(&self, limit: u64) -> Result<Vec<Category>> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(to_category).collect())
    }

    /// Upserts a paper and reconciles its category associations.
    ///
    /// Categories the store has never seen are inserted with only their
    /// identifier populated. If the paper already exists its scalar fields
    /// are overwritten and the association set is replaced wholesale; the
    /// feed always supplies the complete current category list, so no
    /// incremental diff is attempted.
    pub async fn upsert_paper(&self, paper: &Paper) -> Result<()> {
        let mut resolved: Vec<category::Model> = if paper.categories.is_empty() {
            Vec::new()
        } else {
            let mut cond = Condition::any();
            for cat in &paper.categories {
                cond = cond.add(identifier_condition(&cat.identifier));
            }
            category::Entity::find().filter(cond).all(self.conn).await?
        };

        let mut known: HashSet<CategoryIdentifier> = resolved
            .iter()
            .map(|m| CategoryIdentifier::new(m.archive.clone(), m.subcategory.clone()))
            .collect();
        for cat in &paper.categories {
            if known.insert(cat.identifier.clone()) {
                let inserted = to_category_active(cat).insert(self.conn).await?;
                resolved.push(inserted);
            }
        }

        let existing = paper::Entity::find()
            .filter(paper::Column::ArxivId.eq(paper.arxiv_id.as_str()))
            .one(self.conn)
            .await?;

        let paper_id = match existing {
            Some(model) => {
                let id = model.id;
                let mut active = model.into_active_model();
                active.title = Set(paper.title.clone());
                active.abstract_text = Set(paper.abstract_text.clone());
                active.published_at = Set(paper.published_at);
                active.update(self.conn).await?;

                paper_category::Entity::delete_many()
                    .filter(paper_category::Column::PaperId.eq(id))
                    .exec(self.conn)
                    .await?;
                id
            }
            None => {
                let inserted = paper::ActiveModel {
                    arxiv_id: Set(paper.arxiv_id.clone()),
                    title: Set(paper.title.clone()),
                    abstract_text: Set(paper.abstract_text.clone()),
                    published_at: Set(paper.published_at),
                    ..Default::default()
                }
                .insert(self.conn)
                .await?;
                inserted.id
            }
        };

        let mut seen_ids = HashSet::new();
        for model in &resolved {
            if seen_ids.insert(model.id) {
                // composite-key row; skip the post-insert refetch
                paper_category::Entity::insert(paper_category::ActiveModel {
                    paper_id: Set(paper_id),
                    category_id: Set(model.id),
                })
                .exec_without_returning(self.conn)
                .await?;
            }
        }
        Ok(())
    }

    pub async fn get_paper(&self, arxiv_id: &str) -> Result<Option<Paper>> {
        let model = paper::Entity::find()
            .filter(paper::Column::ArxivId.eq(arxiv_id))
            .one(self.conn)
            .await?;

        match model {
            Some(model) => Ok(Some(self.to_paper(model).await?)),
            None => Ok(None),
        }
    }

    pub async fn delete_paper(&self, arxiv_id: &str) -> Result<()> {
        let model = paper::Entity::find()
            .filter(paper::Column::ArxivId.eq(arxiv_id))
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::PaperNotFound(arxiv_id.to_string()))?;

        paper_category::Entity::delete_many()
            .filter(paper_category::Column::PaperId.eq(model.id))
            .exec(self.conn)
            .await?;
        model.delete(self.conn).await?;
        Ok(())
    }

    /// Lists papers in insertion (id) order, not published-date order;
    /// callers needing recency order must sort.
    pub async fn list_papers(&self, limit: u64) -> Result<Vec<Paper>> {
        let models = paper::Entity::find()
            .order_by_asc(paper::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await?;

        let mut papers = Vec::with_capacity(models.len());
        for model in models {
            papers.push(self.to_paper(model).await?);
        }
        Ok(papers)
    }

    async fn to_paper(&self, model: paper::Model) -> Result<Paper> {
        let categories = model
            .find_related(category::Entity)
            .order_by_asc(category::Column::Id)
            .all(self.conn)
            .await?;

        Ok(Paper {
            arxiv_id: model.arxiv_id,
            title: model.title,
            abstract_text: model.abstract_text,
            published_at: model.published_at,
            categories: categories.into_iter().map(to_category).collect(),
        })
    }
}

/// Null-aware natural-key match: an absent subcategory only matches rows
/// where the column is NULL.
fn identifier_condition(identifier: &CategoryIdentifier) -> Condition {
    let cond = Condition::all().add(category::Column::Archive.eq(identifier.archive.as_str()));
    match &identifier.subcategory {
        Some(sub) => cond.add(category::Column::Subcategory.eq(sub.as_str())),
        None => cond.add(category::Column::Subcategory.is_null()),
    }
}

fn to_category(model: category::Model) -> Category {
    Category {
        identifier: CategoryIdentifier::new(model.archive, model.subcategory),
        archive_name: model.archive_name,
        category_name: model.category_name,
        description: model.description,
    }
}

fn to_category_active(cat: &Category) -> category::ActiveModel {
    category::ActiveModel {
        archive: Set(cat.identifier.archive.clone()),
        subcategory: Set(cat.identifier.subcategory.clone()),
        archive_name: Set(cat.archive_name.clone()),
        category_name: Set(cat.category_name.clone()),
        description: Set(cat.description.clone()),
        ..Default::default()
    }
}
