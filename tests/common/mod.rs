//! Shared fixtures: an in-memory SQLite database with the schema applied.

// not every test binary uses every fixture
#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use arxivist::db::ensure_schema;
use arxivist::domain::{Category, Paper};

/// Connects to a fresh in-memory SQLite database. A single pooled connection
/// keeps every query on the same database instance.
pub async fn test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("in-memory sqlite connects");
    ensure_schema(&db).await.expect("schema applies");
    db
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn sample_paper(arxiv_id: &str, categories: &[&str]) -> Paper {
    Paper::new(
        arxiv_id,
        "Sample Paper",
        "This is a sample abstract.",
        date(2025, 1, 1),
        categories.iter().map(|s| Category::parse(s)).collect(),
    )
}
