//! Embedding generation port and adapters.

use async_trait::async_trait;

use crate::config::EmbeddingsConfig;
use crate::errors::{AppError, Result};

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embedder backed by an OpenAI-format HTTP embeddings endpoint.
pub struct HttpEmbedder {
    client: reqwest::Client,
    config: EmbeddingsConfig,
}

impl HttpEmbedder {
    pub fn new(config: EmbeddingsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let payload = serde_json::json!({
            "input": text,
            "model": "text-embedding-3-small",
        });

        let res = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("request failed: {e}")))?;

        if !res.status().is_success() {
            return Err(AppError::Embedding(format!("API error: {}", res.status())));
        }

        let body: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("parse error: {e}")))?;

        body["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| AppError::Embedding("invalid response format".into()))?
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| AppError::Embedding("non-numeric embedding value".into()))
            })
            .collect()
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed_query(text).await?);
        }
        Ok(results)
    }
}

/// Deterministic embedder for tests and offline runs: the vector is derived
/// from the text bytes, so equal texts embed equally and distinct texts
/// (almost always) differ.
pub struct MockEmbedder {
    dim: usize,
}

impl MockEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for b in text.bytes() {
            state ^= u64::from(b);
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }
        (0..self.dim)
            .map(|i| {
                let x = state.wrapping_add(i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
                (x >> 40) as f32 / (1u64 << 24) as f32 - 0.5
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_embedder_is_deterministic() {
        let embedder = MockEmbedder::new(8);
        let a = embedder.embed_query("same text").await.unwrap();
        let b = embedder.embed_query("same text").await.unwrap();
        let c = embedder.embed_query("other text").await.unwrap();
        assert_eq!(a.len(), 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn mock_embedder_batches_documents() {
        let embedder = MockEmbedder::new(4);
        let out = embedder
            .embed_documents(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_ne!(out[0], out[1]);
    }
}
