//! Document and corpus structures

use serde::{Deserialize, Serialize};

/// A named piece of plain text, immutable once extracted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    /// Set when the upstream extractor could not produce text for this document
    pub extraction_error: Option<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            extraction_error: None,
        }
    }

    /// A document whose text could not be extracted; it ranks as empty text
    pub fn failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            extraction_error: Some(reason.into()),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// The texts of one ranking run: the reference first, then every candidate in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    texts: Vec<String>,
}

impl Corpus {
    pub fn for_run(reference: &str, candidates: &[Document]) -> Self {
        let mut texts = Vec::with_capacity(candidates.len() + 1);
        texts.push(reference.to_string());
        texts.extend(candidates.iter().map(|c| c.text.clone()));
        Self { texts }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
