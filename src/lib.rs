//! Resume ranker library
//!
//! Ranks candidate resumes against a job description by blending a corpus-fitted
//! TF-IDF similarity with a sentence-embedding similarity, and reports required
//! skill coverage for each candidate.

pub mod cli;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, ResumeRankerError};
pub use processing::document::Document;
pub use processing::ranker::{MatchResult, RankedBatch, Ranker, RankingOptions};
