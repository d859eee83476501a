use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Application error taxonomy.
///
/// Precondition errors (`NoCategories`), upstream data errors
/// (`PaperMissingField`, `CategoryFetch`, `CategoryParse`, `Feed`),
/// referential errors (`CategoryNotFound`, `PaperNotFound`) and
/// infrastructure errors. None of these are recovered locally: every
/// failure aborts the surrounding operation before its transaction commits.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No categories stored; fetch the category taxonomy first or pass an explicit selection")]
    NoCategories,

    #[error("Missing required field {0:?} in the feed entry")]
    PaperMissingField(String),

    #[error("Failed to fetch the category taxonomy: {0}")]
    CategoryFetch(String),

    #[error("Failed to parse the category taxonomy: {0}")]
    CategoryParse(String),

    #[error("Failed to parse the paper feed: {0}")]
    Feed(String),

    #[error("Category with archive {archive:?} and subcategory {subcategory:?} not found")]
    CategoryNotFound {
        archive: String,
        subcategory: Option<String>,
    },

    #[error("Paper with arXiv ID {0:?} not found")]
    PaperNotFound(String),

    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
