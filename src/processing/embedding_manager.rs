//! Known Model2Vec models: listing, resolution and download into the models directory

use crate::error::{Result, ResumeRankerError};
use hf_hub::api::tokio::Api;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Files the Model2Vec loader reads from a model directory
const REQUIRED_FILES: &[&str] = &["tokenizer.json", "model.safetensors", "config.json"];
const OPTIONAL_FILES: &[&str] = &["README.md"];

/// Default model, also the first choice when several are downloaded
pub const DEFAULT_MODEL: &str = "potion-base-8M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub id: String,
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub dimensions: u32,
    pub description: String,
}

fn known_models() -> Vec<EmbeddingModelInfo> {
    vec![
        EmbeddingModelInfo {
            id: DEFAULT_MODEL.to_string(),
            name: "Potion Base 8M".to_string(),
            repo_id: "minishlab/potion-base-8M".to_string(),
            size_mb: 33,
            dimensions: 256,
            description: "Compact static embeddings, good quality for its size".to_string(),
        },
        EmbeddingModelInfo {
            id: "m2v-base".to_string(),
            name: "Model2Vec Base".to_string(),
            repo_id: "minishlab/M2V_base_output".to_string(),
            size_mb: 90,
            dimensions: 256,
            description: "Original Model2Vec base model".to_string(),
        },
        EmbeddingModelInfo {
            id: "m2v-large".to_string(),
            name: "Model2Vec Large".to_string(),
            repo_id: "minishlab/M2V_large_output".to_string(),
            size_mb: 250,
            dimensions: 512,
            description: "Larger Model2Vec model for higher accuracy".to_string(),
        },
    ]
}

/// Tracks which known models exist under `models_dir` and fetches missing ones
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available: BTreeMap<String, EmbeddingModelInfo>,
    downloaded: BTreeSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&models_dir).await?;

        let available = known_models()
            .into_iter()
            .map(|info| (info.id.clone(), info))
            .collect();

        let mut manager = Self {
            models_dir,
            available,
            downloaded: BTreeSet::new(),
        };
        manager.scan_downloaded().await?;
        Ok(manager)
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    async fn scan_downloaded(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let model_id = entry.file_name().to_string_lossy().to_string();
            if is_complete_model_dir(&entry.path()).await {
                debug!("Found downloaded embedding model: {}", model_id);
                self.downloaded.insert(model_id);
            }
        }
        Ok(())
    }

    /// Known models in id order
    pub fn list_available_models(&self) -> Vec<&EmbeddingModelInfo> {
        self.available.values().collect()
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        self.downloaded.iter().cloned().collect()
    }

    pub fn get_model_info(&self, model_id: &str) -> Option<&EmbeddingModelInfo> {
        self.resolve_model_id(model_id)
            .and_then(|id| self.available.get(&id))
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded.contains(model_id)
    }

    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.is_model_downloaded(model_id)
            .then(|| self.models_dir.join(model_id))
    }

    /// Accepts a model id, a hub repo id, or a display name (case-insensitive)
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if self.available.contains_key(input) {
            return Some(input.to_string());
        }
        let lowered = input.to_lowercase();
        self.available
            .values()
            .find(|info| info.repo_id == input || info.name.to_lowercase() == lowered)
            .map(|info| info.id.clone())
    }

    /// First downloaded model in preference order, else the default
    pub fn auto_select_model(&self) -> String {
        [DEFAULT_MODEL, "m2v-base", "m2v-large"]
            .iter()
            .find(|id| self.downloaded.contains(**id))
            .unwrap_or(&DEFAULT_MODEL)
            .to_string()
    }

    pub async fn ensure_model_available(&mut self, model_id: &str) -> Result<PathBuf> {
        match self.get_model_path(model_id) {
            Some(path) => Ok(path),
            None => self.download_model(model_id).await,
        }
    }

    pub async fn download_model(&mut self, model_id: &str) -> Result<PathBuf> {
        let info = self
            .get_model_info(model_id)
            .cloned()
            .ok_or_else(|| ResumeRankerError::ModelNotFound(model_id.to_string()))?;

        let model_dir = self.models_dir.join(&info.id);
        if self.downloaded.contains(&info.id) {
            return Ok(model_dir);
        }

        info!(
            "Downloading embedding model {} ({} MB) from {}",
            info.name, info.size_mb, info.repo_id
        );
        fs::create_dir_all(&model_dir).await?;

        let api = Api::new()
            .map_err(|e| ResumeRankerError::Network(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.model(info.repo_id.clone());

        let progress = ProgressBar::new((REQUIRED_FILES.len() + OPTIONAL_FILES.len()) as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| ResumeRankerError::OutputFormatting(e.to_string()))?,
        );
        progress.enable_steady_tick(Duration::from_millis(120));

        for file in REQUIRED_FILES.iter().chain(OPTIONAL_FILES) {
            progress.set_message(file.to_string());
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                    debug!("Downloaded {} for {}", file, info.id);
                }
                Err(e) if OPTIONAL_FILES.contains(file) => {
                    warn!("Optional file {} not available for {}: {}", file, info.id, e);
                }
                Err(e) => {
                    progress.abandon_with_message(format!("failed on {}", file));
                    return Err(ResumeRankerError::Network(format!(
                        "Failed to download {} from {}: {}",
                        file, info.repo_id, e
                    )));
                }
            }
            progress.inc(1);
        }
        progress.finish_with_message("done");

        self.downloaded.insert(info.id.clone());
        info!("Embedding model {} ready at {}", info.id, model_dir.display());
        Ok(model_dir)
    }
}

async fn is_complete_model_dir(path: &Path) -> bool {
    for file in REQUIRED_FILES {
        if fs::metadata(path.join(file)).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_manager_creation_lists_known_models() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().join("models"))
            .await
            .unwrap();

        let ids: Vec<&str> = manager
            .list_available_models()
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["m2v-base", "m2v-large", "potion-base-8M"]);
        assert!(manager.list_downloaded_models().is_empty());
        assert!(manager.models_dir().exists());
    }

    #[tokio::test]
    async fn test_auto_select_prefers_downloaded() {
        let temp_dir = TempDir::new().unwrap();
        let model_dir = temp_dir.path().join("m2v-large");
        std::fs::create_dir_all(&model_dir).unwrap();
        for file in REQUIRED_FILES {
            std::fs::write(model_dir.join(file), b"{}").unwrap();
        }
        // Incomplete directories are ignored
        std::fs::create_dir_all(temp_dir.path().join("m2v-base")).unwrap();

        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        assert_eq!(manager.list_downloaded_models(), vec!["m2v-large".to_string()]);
        assert_eq!(manager.auto_select_model(), "m2v-large");
        assert_eq!(manager.get_model_path("m2v-large"), Some(model_dir));
        assert_eq!(manager.get_model_path("m2v-base"), None);
    }

    #[tokio::test]
    async fn test_auto_select_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        assert_eq!(manager.auto_select_model(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_resolve_model_id() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(manager.resolve_model_id("potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(
            manager.resolve_model_id("minishlab/potion-base-8M"),
            Some("potion-base-8M".to_string())
        );
        assert_eq!(manager.resolve_model_id("potion base 8m"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("bert-base"), None);
    }

    #[tokio::test]
    async fn test_unknown_model_download_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        assert!(matches!(
            manager.download_model("bert-base").await,
            Err(ResumeRankerError::ModelNotFound(_))
        ));
    }
}
