//! Repository contract tests on in-memory SQLite.

mod common;

use std::collections::HashSet;

use arxivist::db::repository::PaperRepository;
use arxivist::db::uow::UnitOfWork;
use arxivist::domain::{Category, CategoryIdentifier, Paper};
use arxivist::errors::AppError;

use common::{date, sample_paper, test_db};

#[tokio::test]
async fn upsert_paper_is_idempotent() {
    let db = test_db().await;
    let paper = sample_paper("2501.00001", &["cs.CV", "cs.CL"]);

    let uow = UnitOfWork::begin(&db).await.unwrap();
    uow.papers().upsert_paper(&paper).await.unwrap();
    uow.papers().upsert_paper(&paper).await.unwrap();
    uow.commit().await.unwrap();

    let repo = PaperRepository::new(&db);
    let papers = repo.list_papers(50).await.unwrap();
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].arxiv_id, "2501.00001");
    assert_eq!(papers[0].categories.len(), 2);
}

#[tokio::test]
async fn upsert_paper_replaces_scalar_fields_and_categories() {
    let db = test_db().await;
    let repo = PaperRepository::new(&db);

    repo.upsert_paper(&sample_paper("2501.00002", &["cs.CV", "cs.CL"]))
        .await
        .unwrap();

    let updated = Paper::new(
        "2501.00002",
        "Revised Title",
        "Revised abstract.",
        date(2025, 2, 1),
        vec![Category::parse("cs.AI")],
    );
    repo.upsert_paper(&updated).await.unwrap();

    let stored = repo.get_paper("2501.00002").await.unwrap().unwrap();
    assert_eq!(stored.title, "Revised Title");
    assert_eq!(stored.abstract_text, "Revised abstract.");
    assert_eq!(stored.published_at, date(2025, 2, 1));

    let identifiers: HashSet<String> = stored
        .categories
        .iter()
        .map(|c| c.identifier.to_string())
        .collect();
    assert_eq!(identifiers, HashSet::from(["cs.AI".to_string()]));

    // the replaced categories still exist as rows, only the associations went
    let repo = PaperRepository::new(&db);
    assert!(repo
        .get_category(&CategoryIdentifier::parse("cs.CV"))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn upsert_paper_creates_missing_categories_and_reuses_existing() {
    let db = test_db().await;
    let repo = PaperRepository::new(&db);

    let known = Category {
        identifier: CategoryIdentifier::parse("cs.CV"),
        archive_name: Some("Computer Science".into()),
        category_name: Some("Computer Vision".into()),
        description: None,
    };
    repo.upsert_category(&known).await.unwrap();

    repo.upsert_paper(&sample_paper("2501.00003", &["cs.CV", "cs.NE"]))
        .await
        .unwrap();

    // the pre-existing row was reused, its metadata untouched
    let stored = repo
        .get_category(&CategoryIdentifier::parse("cs.CV"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.category_name.as_deref(), Some("Computer Vision"));

    // the unknown category was created with only its identifier
    let created = repo
        .get_category(&CategoryIdentifier::parse("cs.NE"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.category_name, None);
    assert_eq!(repo.list_categories(50).await.unwrap().len(), 2);
}

#[tokio::test]
async fn delete_paper_cascades_associations_but_keeps_shared_categories() {
    let db = test_db().await;
    let repo = PaperRepository::new(&db);

    repo.upsert_paper(&sample_paper("2501.00004", &["cs.CV"]))
        .await
        .unwrap();
    repo.upsert_paper(&sample_paper("2501.00005", &["cs.CV"]))
        .await
        .unwrap();

    repo.delete_paper("2501.00004").await.unwrap();

    assert!(repo.get_paper("2501.00004").await.unwrap().is_none());
    let survivor = repo.get_paper("2501.00005").await.unwrap().unwrap();
    assert_eq!(survivor.categories.len(), 1);
    assert!(repo
        .get_category(&CategoryIdentifier::parse("cs.CV"))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn deleting_missing_entities_signals_not_found() {
    let db = test_db().await;
    let repo = PaperRepository::new(&db);

    let err = repo.delete_paper("nope").await.unwrap_err();
    assert!(matches!(err, AppError::PaperNotFound(id) if id == "nope"));

    let err = repo
        .delete_category(&CategoryIdentifier::new("X", Some("Y".into())))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::CategoryNotFound { archive, subcategory }
            if archive == "X" && subcategory.as_deref() == Some("Y")
    ));
}

#[tokio::test]
async fn subcategory_key_is_null_aware() {
    let db = test_db().await;
    let repo = PaperRepository::new(&db);

    repo.upsert_category(&Category::parse("cs")).await.unwrap();
    repo.upsert_category(&Category::parse("cs.CV")).await.unwrap();

    // an absent subcategory matches only the archive-level row
    let archive_level = repo
        .get_category(&CategoryIdentifier::new("cs", None))
        .await
        .unwrap()
        .unwrap();
    assert!(archive_level.identifier.is_archive());

    repo.delete_category(&CategoryIdentifier::new("cs", None))
        .await
        .unwrap();
    assert!(repo
        .get_category(&CategoryIdentifier::parse("cs.CV"))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn upsert_category_overwrites_descriptive_fields_in_place() {
    let db = test_db().await;
    let repo = PaperRepository::new(&db);

    repo.upsert_category(&Category::parse("cs.CL")).await.unwrap();
    repo.upsert_category(&Category {
        identifier: CategoryIdentifier::parse("cs.CL"),
        archive_name: Some("Computer Science".into()),
        category_name: Some("Computation and Language".into()),
        description: Some("Covers NLP.".into()),
    })
    .await
    .unwrap();

    let categories = repo.list_categories(50).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(
        categories[0].category_name.as_deref(),
        Some("Computation and Language")
    );
}

#[tokio::test]
async fn listings_are_in_insertion_order() {
    let db = test_db().await;
    let repo = PaperRepository::new(&db);

    let mut late = sample_paper("2501.00007", &[]);
    late.published_at = date(2025, 3, 1);
    let mut early = sample_paper("2501.00008", &[]);
    early.published_at = date(2024, 1, 1);

    repo.upsert_paper(&late).await.unwrap();
    repo.upsert_paper(&early).await.unwrap();

    let papers = repo.list_papers(50).await.unwrap();
    let ids: Vec<&str> = papers.iter().map(|p| p.arxiv_id.as_str()).collect();
    // insertion order, not published-date order
    assert_eq!(ids, vec!["2501.00007", "2501.00008"]);

    let limited = repo.list_papers(1).await.unwrap();
    assert_eq!(limited.len(), 1);
}
