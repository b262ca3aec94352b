//! Input manager: extracts and normalizes document text

use crate::error::{Result, ResumeRankerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{
    MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use crate::processing::document::Document;
use crate::processing::text_processor::TextProcessor;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
    processor: TextProcessor,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
            processor: TextProcessor::new(),
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Normalized plain text of a `.pdf`, `.txt` or `.md` file
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(path) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(ResumeRankerError::Extraction {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }

        let raw = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(ResumeRankerError::UnsupportedFormat(format!(
                    "{} (expected .pdf, .txt or .md)",
                    path.display()
                )));
            }
        };

        let text = self.processor.clean_text(&raw);
        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), text.clone());
        }
        Ok(text)
    }

    /// A candidate document; any failure yields a document marked as failed instead of an error
    pub async fn load_document(&mut self, path: &Path) -> Document {
        let id = document_id(path);
        match self.extract_text(path).await {
            Ok(text) => Document::new(id, text),
            Err(e) => {
                warn!("Could not extract text from {}: {}", path.display(), e);
                Document::failed(id, e.to_string())
            }
        }
    }

    pub async fn load_documents(&mut self, paths: &[PathBuf]) -> Vec<Document> {
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(self.load_document(path).await);
        }
        documents
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

/// File name used as a document identifier
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_extract_normalizes_and_caches() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resume.txt");
        std::fs::write(&path, "Jane  Doe\r\n\r\n   Python\tdeveloper  \n").unwrap();

        let mut manager = InputManager::new();
        let text = manager.extract_text(&path).await.unwrap();
        assert_eq!(text, "Jane Doe\nPython developer");
        assert_eq!(manager.cache_size(), 1);

        std::fs::remove_file(&path).unwrap();
        assert_eq!(manager.extract_text(&path).await.unwrap(), text);

        manager.clear_cache();
        assert!(manager.extract_text(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_unsupported_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resume.docx");
        std::fs::write(&path, "binary").unwrap();

        let mut manager = InputManager::new().with_cache(false);
        assert!(matches!(
            manager.extract_text(&path).await,
            Err(ResumeRankerError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_load_document_degrades_failures() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.md");
        std::fs::write(&good, "# Skills\n\nRust and SQL").unwrap();
        let missing = temp_dir.path().join("missing.pdf");

        let mut manager = InputManager::new();
        let documents = manager.load_documents(&[good, missing]).await;

        assert_eq!(documents[0].id, "good.md");
        assert_eq!(documents[0].text, "Skills\nRust and SQL");
        assert!(documents[0].extraction_error.is_none());

        assert_eq!(documents[1].id, "missing.pdf");
        assert!(documents[1].text.is_empty());
        assert!(documents[1].extraction_error.is_some());
    }
}
