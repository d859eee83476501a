//! Category-aware arXiv paper ingestion.
//!
//! The crate is laid out hexagonally: a small domain model, use-case
//! services, and swappable infrastructure adapters behind port traits.

pub mod config;
pub mod db;
pub mod domain;
pub mod embeddings;
pub mod errors;
pub mod feed;
pub mod ports;
pub mod services;
pub mod taxonomy;
pub mod vector;
