//! Semantic matching with sentence embeddings

use crate::error::{Result, ResumeRankerError};
use crate::processing::embeddings::{cosine_similarity, mean_embedding, SentenceEncoder};
use crate::processing::text_processor::split_sentences;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Compares a reference text to candidates sentence by sentence.
///
/// The encoder is borrowed, never owned: it is shared by every run. Reference
/// embeddings are cached for the lifetime of one fit.
pub struct SemanticMatcher<'a> {
    encoder: &'a dyn SentenceEncoder,
    corpus: Option<Vec<String>>,
    reference_cache: HashMap<String, Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceMatch {
    pub sentence: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticScore {
    /// Reference vs. mean candidate sentence embedding, in [0, 1]
    pub similarity: f32,
    /// Best supporting sentences, strongest first
    pub top_sentences: Vec<SentenceMatch>,
}

impl SemanticScore {
    fn empty() -> Self {
        Self {
            similarity: 0.0,
            top_sentences: Vec::new(),
        }
    }
}

impl<'a> SemanticMatcher<'a> {
    pub fn new(encoder: &'a dyn SentenceEncoder) -> Self {
        Self {
            encoder,
            corpus: None,
            reference_cache: HashMap::new(),
        }
    }

    /// Nothing is trained; this scopes the matcher to one run's corpus
    pub fn fit(&mut self, corpus: &[String]) {
        self.corpus = Some(corpus.to_vec());
        self.reference_cache.clear();
    }

    pub fn is_fitted(&self) -> bool {
        self.corpus.is_some()
    }

    pub fn score(
        &mut self,
        reference_text: &str,
        candidate_text: &str,
        top_k: usize,
    ) -> Result<SemanticScore> {
        if !self.is_fitted() {
            return Err(ResumeRankerError::NotFitted("SemanticMatcher"));
        }

        let sentences = split_sentences(candidate_text);
        if sentences.is_empty() {
            return Ok(SemanticScore::empty());
        }

        let reference = self.reference_embedding(reference_text)?;
        let sentence_embeddings = self.encoder.encode(&sentences)?;
        if sentence_embeddings.len() != sentences.len() {
            return Err(ResumeRankerError::Embedding(format!(
                "encoder '{}' returned {} vectors for {} sentences",
                self.encoder.name(),
                sentence_embeddings.len(),
                sentences.len()
            )));
        }

        let per_sentence = sentence_embeddings
            .iter()
            .map(|e| cosine_similarity(&reference, e).map(unit_interval))
            .collect::<Result<Vec<f32>>>()?;

        // Averaging happens in embedding space, before the final comparison
        let similarity = match mean_embedding(&sentence_embeddings) {
            Some(doc_embedding) => unit_interval(cosine_similarity(&reference, &doc_embedding)?),
            None => 0.0,
        };

        let mut ranked: Vec<(usize, f32)> = per_sentence.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let top_sentences = ranked
            .into_iter()
            .take(top_k)
            .map(|(idx, sim)| SentenceMatch {
                sentence: sentences[idx].clone(),
                similarity: sim,
            })
            .collect();

        debug!(
            "Semantic similarity {:.3} over {} sentences",
            similarity,
            sentences.len()
        );

        Ok(SemanticScore {
            similarity,
            top_sentences,
        })
    }

    fn reference_embedding(&mut self, reference_text: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.reference_cache.get(reference_text) {
            return Ok(cached.clone());
        }
        let embedding = self
            .encoder
            .encode(&[reference_text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ResumeRankerError::Embedding(format!(
                    "encoder '{}' returned no vector for the reference text",
                    self.encoder.name()
                ))
            })?;
        self.reference_cache
            .insert(reference_text.to_string(), embedding.clone());
        Ok(embedding)
    }
}

fn unit_interval(score: f32) -> f32 {
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::HashingEncoder;
    use approx::assert_relative_eq;

    /// Maps known words onto fixed axes so similarities are predictable
    struct AxisEncoder;

    impl SentenceEncoder for AxisEncoder {
        fn name(&self) -> &str {
            "axis"
        }

        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    vec![
                        if t.contains("python") { 1.0 } else { 0.0 },
                        if t.contains("cooking") { 1.0 } else { 0.0 },
                        if t.contains("sql") { 1.0 } else { 0.0 },
                    ]
                })
                .collect())
        }
    }

    fn fitted<'a>(encoder: &'a dyn SentenceEncoder, corpus: &[&str]) -> SemanticMatcher<'a> {
        let mut matcher = SemanticMatcher::new(encoder);
        let corpus: Vec<String> = corpus.iter().map(|s| s.to_string()).collect();
        matcher.fit(&corpus);
        matcher
    }

    #[test]
    fn test_identical_documents_score_one() {
        let encoder = HashingEncoder::default();
        let doc = "Built data pipelines in Python.";
        let mut matcher = fitted(&encoder, &[doc, doc]);

        let score = matcher.score(doc, doc, 5).unwrap();
        assert_relative_eq!(score.similarity, 1.0, epsilon = 1e-5);
        assert_eq!(score.top_sentences.len(), 1);
    }

    #[test]
    fn test_document_score_uses_mean_embedding() {
        let encoder = AxisEncoder;
        let reference = "python";
        let candidate = "I write python. I enjoy cooking.";
        let mut matcher = fitted(&encoder, &[reference, candidate]);

        let score = matcher.score(reference, candidate, 5).unwrap();

        // mean of [1,0,0] and [0,1,0] is [.5,.5,0]; cosine with [1,0,0] is 1/sqrt(2)
        assert_relative_eq!(score.similarity, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-5);
        assert_eq!(score.top_sentences[0].sentence, "I write python.");
        assert_relative_eq!(score.top_sentences[0].similarity, 1.0, epsilon = 1e-6);
        assert_eq!(score.top_sentences[1].similarity, 0.0);
    }

    #[test]
    fn test_top_k_ties_keep_sentence_order() {
        let encoder = AxisEncoder;
        let reference = "python";
        let candidate = "First python job. Second python job. Cooking hobby. Third python job.";
        let mut matcher = fitted(&encoder, &[reference, candidate]);

        let score = matcher.score(reference, candidate, 2).unwrap();
        let sentences: Vec<&str> = score
            .top_sentences
            .iter()
            .map(|s| s.sentence.as_str())
            .collect();
        assert_eq!(sentences, vec!["First python job.", "Second python job."]);
    }

    #[test]
    fn test_empty_candidate_scores_zero() {
        let encoder = HashingEncoder::default();
        let mut matcher = fitted(&encoder, &["python", ""]);

        let score = matcher.score("python", "  ", 5).unwrap();
        assert_eq!(score.similarity, 0.0);
        assert!(score.top_sentences.is_empty());
    }

    #[test]
    fn test_punctuation_only_candidate_is_encoded() {
        let encoder = HashingEncoder::default();
        let mut matcher = fitted(&encoder, &["python", "..."]);

        let score = matcher.score("python", "...", 5).unwrap();
        assert_eq!(score.top_sentences.len(), 1);
        assert_eq!(score.top_sentences[0].sentence, "...");
    }

    #[test]
    fn test_score_before_fit_fails() {
        let encoder = HashingEncoder::default();
        let mut matcher = SemanticMatcher::new(&encoder);
        assert!(matches!(
            matcher.score("a", "b", 3),
            Err(ResumeRankerError::NotFitted(_))
        ));
    }

    #[test]
    fn test_similarity_in_unit_range() {
        let encoder = HashingEncoder::new(32);
        let reference = "Looking for SQL and Spark engineers.";
        let candidates = [
            "Spark expert. Wrote SQL daily.",
            "Painter and sculptor.\nGallery curator.",
            "x",
        ];
        let mut corpus = vec![reference];
        corpus.extend(candidates);
        let mut matcher = fitted(&encoder, &corpus);

        for candidate in candidates {
            let score = matcher.score(reference, candidate, 3).unwrap();
            assert!((0.0..=1.0).contains(&score.similarity));
            for s in &score.top_sentences {
                assert!((0.0..=1.0).contains(&s.similarity));
            }
        }
    }
}
