//! Scoring and ranking engine

pub mod document;
pub mod embedding_manager;
pub mod embeddings;
pub mod entities;
pub mod lexical;
pub mod ranker;
pub mod scoring;
pub mod semantic;
pub mod skills;
pub mod text_processor;
