use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub feed: FeedConfig,
    pub taxonomy: TaxonomyConfig,
    pub embeddings: EmbeddingsConfig,
    pub rust_log: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub base_url: String,
    /// Maximum entries one feed call can return. Results of exactly this
    /// size are suspected truncated and trigger a category split.
    pub limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TaxonomyConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingsConfig {
    pub api_url: String,
    pub api_key: String,
    pub embedding_dim: usize,
}

impl AppConfig {
    pub fn build() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("database.url", "sqlite://arxivist.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 30)?
            .set_default("feed.base_url", "https://rss.arxiv.org/rss/")?
            .set_default("feed.limit", 1000)?
            .set_default("taxonomy.url", "https://arxiv.org/category_taxonomy")?
            .set_default("embeddings.api_url", "https://api.openai.com/v1/embeddings")?
            .set_default("embeddings.api_key", "mock")?
            .set_default("embeddings.embedding_dim", 768)?
            .set_default("rust_log", "info,arxivist=debug")?
            // E.g. `ARXIVIST_DATABASE__URL=postgres://...` overrides `database.url`
            .add_source(Environment::default().separator("__").prefix("ARXIVIST"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = AppConfig::build().expect("defaults should satisfy every field");
        assert!(config.feed.limit > 0);
        assert!(config.feed.base_url.starts_with("https://"));
        assert_eq!(config.embeddings.api_key, "mock");
    }
}
