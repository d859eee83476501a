//! Category entity. Natural key is (archive, subcategory); an absent
//! subcategory is a distinct key value, matched with IS NULL, never as a
//! wildcard.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub archive: String,

    #[sea_orm(nullable)]
    pub subcategory: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub archive_name: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub category_name: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
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

impl Related<super::paper::Entity> for Entity {
    fn to() -> RelationDef {
        super::paper_category::Relation::Paper.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::paper_category::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
