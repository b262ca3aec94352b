//! Sentence embeddings: the encoder seam, the Model2Vec encoder and vector helpers

use crate::config::Config;
use crate::error::{Result, ResumeRankerError};
use log::info;
use model2vec_rs::model::StaticModel;
use std::path::{Path, PathBuf};
use std::time::Instant;
use unicode_segmentation::UnicodeSegmentation;

/// A pretrained, read-only text encoder producing fixed-dimension vectors.
///
/// Implementations are loaded once per process and shared by every ranking run.
pub trait SentenceEncoder: Send + Sync {
    fn name(&self) -> &str;

    /// One vector per input text, all of the same dimension
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Model2Vec static embedding model
pub struct Model2VecEncoder {
    model: StaticModel,
    model_name: String,
}

impl Model2VecEncoder {
    /// Load from a local model directory or a Hugging Face repo id
    pub fn load(model_path: &Path, model_name: impl Into<String>) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| {
            ResumeRankerError::ModelInitialization(format!(
                "failed to load embedding model '{}': {:#}",
                model_path.display(),
                e
            ))
        })?;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_name.into(),
        })
    }

    /// Load the model named in the configuration, preferring a copy under `models_dir`
    pub fn from_config(config: &Config) -> Result<Self> {
        let model_name = &config.models.embedding_model;
        Self::load(&Self::resolve_model_path(config), model_name.clone())
    }

    fn resolve_model_path(config: &Config) -> PathBuf {
        let model_name = &config.models.embedding_model;
        let local_path = config.models_dir().join(model_name);
        if local_path.exists() {
            return local_path;
        }
        // Either a path given directly or a hub repo id the loader fetches itself
        PathBuf::from(model_name)
    }
}

impl SentenceEncoder for Model2VecEncoder {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.model.encode(texts);
        check_batch(texts.len(), &embeddings)?;
        Ok(embeddings)
    }
}

/// Deterministic feature-hashing encoder over lowercase words.
///
/// Needs no model files, so it backs tests and offline dry runs.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dimension: usize,
}

impl HashingEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn encode_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension];
        for word in text.unicode_words() {
            let bucket = fnv1a(&word.to_lowercase()) as usize % self.dimension;
            vector[bucket] += 1.0;
        }
        vector
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl SentenceEncoder for HashingEncoder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.encode_one(t)).collect())
    }
}

fn fnv1a(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in text.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn check_batch(expected: usize, embeddings: &[Vec<f32>]) -> Result<()> {
    if embeddings.len() != expected {
        return Err(ResumeRankerError::Embedding(format!(
            "encoder returned {} vectors for {} texts",
            embeddings.len(),
            expected
        )));
    }
    if let Some(first) = embeddings.first() {
        if embeddings.iter().any(|e| e.len() != first.len()) {
            return Err(ResumeRankerError::Embedding(
                "encoder returned vectors of differing dimensions".to_string(),
            ));
        }
    }
    Ok(())
}

/// Cosine similarity; zero vectors compare as 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ResumeRankerError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

/// Element-wise mean of equally sized vectors
pub fn mean_embedding(embeddings: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = embeddings.first()?;
    let mut mean = vec![0.0; first.len()];
    for embedding in embeddings {
        for (acc, value) in mean.iter_mut().zip(embedding) {
            *acc += value;
        }
    }
    let count = embeddings.len() as f32;
    mean.iter_mut().for_each(|v| *v /= count);
    Some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 1.0];
        assert_relative_eq!(cosine_similarity(&a, &a).unwrap(), 1.0, epsilon = 1e-6);
        assert_eq!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]).unwrap(), 0.0);
        assert!(cosine_similarity(&a, &[1.0]).is_err());
    }

    #[test]
    fn test_mean_embedding() {
        let mean = mean_embedding(&[vec![1.0, 3.0], vec![3.0, 5.0]]).unwrap();
        assert_eq!(mean, vec![2.0, 4.0]);
        assert!(mean_embedding(&[]).is_none());
    }

    #[test]
    fn test_hashing_encoder_is_deterministic() {
        let encoder = HashingEncoder::new(64);
        let texts = vec!["Python and SQL".to_string(), "python AND sql".to_string()];
        let vectors = encoder.encode(&texts).unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 64);
        assert_eq!(vectors[0], vectors[1]);
        assert_relative_eq!(
            cosine_similarity(&vectors[0], &vectors[1]).unwrap(),
            1.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_hashing_encoder_empty_text_is_zero() {
        let encoder = HashingEncoder::default();
        let vectors = encoder.encode(&[String::new()]).unwrap();
        assert!(vectors[0].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_missing_model_is_initialization_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("no-such-model");
        std::fs::create_dir_all(&missing).unwrap();

        let result = Model2VecEncoder::load(&missing, "no-such-model");
        assert!(matches!(
            result,
            Err(ResumeRankerError::ModelInitialization(_))
        ));
    }

    #[test]
    fn test_batch_shape_is_checked() {
        assert!(check_batch(2, &[vec![1.0]]).is_err());
        assert!(check_batch(2, &[vec![1.0], vec![1.0, 2.0]]).is_err());
        assert!(check_batch(2, &[vec![1.0], vec![2.0]]).is_ok());
    }
}
