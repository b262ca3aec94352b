//! Configuration management for the resume ranker

use crate::error::{Result, ResumeRankerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest word-group size accepted for the lexical n-gram range
pub const MAX_NGRAM: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub matching: MatchingConfig,
    pub scoring: ScoringConfig,
    pub skills: SkillsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub embedding_model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub ngram_min: usize,
    pub ngram_max: usize,
    pub max_features: usize,
    pub top_k_sentences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub lexical_weight: f32,
    pub semantic_weight: f32,
    /// Percentage of required skills a candidate should cover
    pub required_skill_threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary_path: Option<PathBuf>,
    pub detect_entities: bool,
    pub entity_scan_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub redact_pii: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Csv,
    Markdown,
    Html,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-ranker")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "potion-base-8M".to_string(),
            },
            matching: MatchingConfig {
                ngram_min: 1,
                ngram_max: 2,
                max_features: 10_000,
                top_k_sentences: 10,
            },
            scoring: ScoringConfig {
                lexical_weight: 0.4,
                semantic_weight: 0.6,
                required_skill_threshold: 60.0,
            },
            skills: SkillsConfig {
                dictionary_path: None,
                detect_entities: true,
                entity_scan_chars: 5000,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                redact_pii: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load the user configuration, writing defaults on first use
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load a configuration file from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ResumeRankerError::Configuration(format!(
                "Failed to parse config {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ResumeRankerError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-ranker")
            .join("config.toml")
    }

    /// Type and range sanity only; weights are deliberately left unbounded
    pub fn validate(&self) -> Result<()> {
        let m = &self.matching;
        if m.ngram_min < 1 || m.ngram_max > MAX_NGRAM || m.ngram_min > m.ngram_max {
            return Err(ResumeRankerError::Configuration(format!(
                "n-gram range must satisfy 1 <= min <= max <= {}, got ({}, {})",
                MAX_NGRAM, m.ngram_min, m.ngram_max
            )));
        }
        if m.max_features == 0 {
            return Err(ResumeRankerError::Configuration(
                "max_features must be greater than zero".to_string(),
            ));
        }
        if m.top_k_sentences == 0 {
            return Err(ResumeRankerError::Configuration(
                "top_k_sentences must be greater than zero".to_string(),
            ));
        }

        let s = &self.scoring;
        if !s.lexical_weight.is_finite() || !s.semantic_weight.is_finite() {
            return Err(ResumeRankerError::Configuration(
                "scoring weights must be finite numbers".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&s.required_skill_threshold) {
            return Err(ResumeRankerError::Configuration(format!(
                "required_skill_threshold must be within 0..=100, got {}",
                s.required_skill_threshold
            )));
        }

        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}
