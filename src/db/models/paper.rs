//! Paper entity. `arxiv_id` is globally unique; categories are attached
//! through the `paper_categories` junction table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub arxiv_id: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    // 'abstract' is a reserved keyword in Rust
    #[sea_orm(column_type = "Text")]
    pub abstract_text: String,

    pub published_at: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::paper_category::Entity")]
    PaperCategories,
}

impl Related<super::paper_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaperCategories.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::paper_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::paper_category::Relation::Paper.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
