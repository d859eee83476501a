pub mod models;
pub mod repository;
pub mod uow;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, Statement};

use crate::config::DatabaseConfig;
use crate::errors::Result;

/// Connects to the configured database.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut opt = sea_orm::ConnectOptions::new(&config.url);
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(std::time::Duration::from_secs(config.connect_timeout))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    Ok(db)
}

/// Creates the schema from the entity definitions if it does not exist yet.
/// Works on both the Postgres and SQLite backends.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tables = [
        schema.create_table_from_entity(models::category::Entity),
        schema.create_table_from_entity(models::paper::Entity),
        schema.create_table_from_entity(models::paper_category::Entity),
    ];
    for stmt in &mut tables {
        db.execute(backend.build(stmt.if_not_exists())).await?;
    }

    // Composite natural key; NULL subcategories are handled by the
    // repository's null-aware matching, not by this constraint.
    db.execute(Statement::from_string(
        backend,
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_categories_archive_subcategory \
         ON categories (archive, subcategory)",
    ))
    .await?;

    Ok(())
}
