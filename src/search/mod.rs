// ABOUTME: Search subsystem — embedding clients, ingestion, the local index, and hybrid query execution

pub mod embeddings;
pub mod engine;
pub mod ingestion;
pub mod local;

pub use embeddings::EmbeddingClient;
pub use engine::SearchEngine;
