use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arxivist::config::AppConfig;
use arxivist::db;
use arxivist::db::uow::UnitOfWork;
use arxivist::embeddings::{Embedder, HttpEmbedder, MockEmbedder};
use arxivist::feed::ArxivFeed;
use arxivist::services::{FetchService, SearchService};
use arxivist::taxonomy::ArxivTaxonomy;
use arxivist::vector::InMemoryVectorIndex;

/// Upper bound on how many stored papers the in-memory search index embeds.
const SEARCH_CORPUS_LIMIT: u64 = 100_000;

#[derive(Parser)]
#[command(name = "arxivist")]
#[command(about = "Fetch, store and search arXiv paper metadata")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the category taxonomy from arXiv and store it
    FetchCategories,

    /// Fetch and store the latest papers
    FetchPapers {
        /// Categories to fetch (e.g. 'cs', 'cs.AI'). Defaults to every
        /// stored category.
        #[arg(short, long, value_delimiter = ',')]
        categories: Option<Vec<String>>,
    },

    /// List stored papers in insertion order
    ListPapers {
        #[arg(short, long, default_value_t = 50)]
        limit: u64,
    },

    /// Semantic search over stored papers
    Search {
        query: String,

        #[arg(short, long, default_value_t = 10)]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse before anything side-effecting, so `--help` and flag errors
    // never create or touch the database
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = AppConfig::build()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.rust_log))
        .init();

    let db = db::connect(&config.database).await?;
    db::ensure_schema(&db).await?;

    match cli.command {
        Commands::FetchCategories => {
            let service = build_fetch_service(&config, db);
            let categories = service.fetch_and_store_categories().await?;
            println!("Fetched and stored {} categories from arXiv.", categories.len());
        }
        Commands::FetchPapers { categories } => {
            let service = build_fetch_service(&config, db);
            let papers = service.fetch_and_store_latest_papers(categories).await?;
            println!("Fetched {} papers from arXiv.", papers.len());
        }
        Commands::ListPapers { limit } => {
            let uow = UnitOfWork::begin(&db).await?;
            let papers = uow.papers().list_papers(limit).await?;
            uow.rollback().await?;
            for paper in papers {
                println!(
                    "{}  {}  [{}]",
                    paper.arxiv_id,
                    paper.title,
                    paper
                        .categories
                        .iter()
                        .map(|c| c.identifier.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
        Commands::Search { query, top_k } => {
            let embedder: Arc<dyn Embedder> = if config.embeddings.api_key == "mock" {
                Arc::new(MockEmbedder::new(config.embeddings.embedding_dim))
            } else {
                Arc::new(HttpEmbedder::new(config.embeddings.clone()))
            };
            let index = Arc::new(InMemoryVectorIndex::new());
            let service = SearchService::new(db.clone(), embedder, index);

            // the index lives in process memory, so embed the stored corpus
            // before querying
            let uow = UnitOfWork::begin(&db).await?;
            let corpus = uow.papers().list_papers(SEARCH_CORPUS_LIMIT).await?;
            uow.rollback().await?;
            service.index_papers(&corpus).await?;

            for paper in service.search(&query, top_k, None).await? {
                println!("{}  {}", paper.arxiv_id, paper.title);
            }
        }
    }

    Ok(())
}

fn build_fetch_service(config: &AppConfig, db: sea_orm::DatabaseConnection) -> FetchService {
    FetchService::new(
        db,
        Arc::new(ArxivFeed::new(&config.feed)),
        Arc::new(ArxivTaxonomy::new(&config.taxonomy)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fetch_papers_splits_comma_separated_categories() {
        let cli = Cli::try_parse_from([
            "arxivist",
            "fetch-papers",
            "--categories",
            "cs.CV,cs.CL",
        ])
        .expect("valid invocation parses");

        match cli.command {
            Commands::FetchPapers { categories } => {
                assert_eq!(categories, Some(vec!["cs.CV".into(), "cs.CL".into()]));
            }
            _ => panic!("parsed the wrong subcommand"),
        }
    }
}
