//! Lexical matching with corpus-fitted TF-IDF term vectors

use crate::config::MAX_NGRAM;
use crate::error::{Result, ResumeRankerError};
use crate::processing::text_processor::TextProcessor;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Upper bound on the shared terms reported per comparison
pub const MAX_SHARED_TERMS: usize = 20;

/// TF-IDF matcher. `fit` must see the whole corpus before any `score` call.
pub struct LexicalMatcher {
    ngram_min: usize,
    ngram_max: usize,
    max_features: usize,
    processor: TextProcessor,
    vocabulary: Option<Vocabulary>,
}

/// Terms kept after fitting, in first-encountered order, with their IDF weights
#[derive(Debug, Clone)]
struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f32>,
}

/// Sparse, L2-normalized weighted-term vector; absent terms weigh zero.
/// Ordered by vocabulary index so sums are reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: BTreeMap<usize, f32>,
}

impl TermVector {
    pub fn is_zero(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    fn weight(&self, idx: usize) -> f32 {
        self.weights.get(&idx).copied().unwrap_or(0.0)
    }

    fn dot(&self, other: &TermVector) -> f32 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .weights
            .iter()
            .map(|(idx, w)| w * large.weight(*idx))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalScore {
    /// Cosine similarity in [0, 1]
    pub similarity: f32,
    /// Terms weighted in both documents, strongest first
    pub shared_terms: Vec<WeightedTerm>,
}

impl LexicalMatcher {
    pub fn new(ngram_min: usize, ngram_max: usize, max_features: usize) -> Result<Self> {
        if ngram_min < 1 || ngram_max > MAX_NGRAM || ngram_min > ngram_max {
            return Err(ResumeRankerError::ModelInitialization(format!(
                "invalid n-gram range ({}, {}) for lexical vectorizer",
                ngram_min, ngram_max
            )));
        }
        if max_features == 0 {
            return Err(ResumeRankerError::ModelInitialization(
                "lexical vectorizer needs a vocabulary cap above zero".to_string(),
            ));
        }

        Ok(Self {
            ngram_min,
            ngram_max,
            max_features,
            processor: TextProcessor::new(),
            vocabulary: None,
        })
    }

    /// Build vocabulary and IDF weights from the run's corpus, replacing any previous fit
    pub fn fit(&mut self, corpus: &[String]) {
        let mut first_seen: Vec<String> = Vec::new();
        let mut totals: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in corpus {
            let terms = self.extract_terms(doc);
            let mut seen_in_doc = HashSet::new();
            for term in terms {
                let total = totals.entry(term.clone()).or_insert(0);
                if *total == 0 {
                    first_seen.push(term.clone());
                }
                *total += 1;
                if seen_in_doc.insert(term.clone()) {
                    *doc_freq.entry(term).or_insert(0) += 1;
                }
            }
        }

        // Keep the most frequent terms; stable sort leaves ties in first-encountered order
        if first_seen.len() > self.max_features {
            let mut ranked: Vec<(usize, &String)> = first_seen.iter().enumerate().collect();
            ranked.sort_by(|a, b| totals[b.1].cmp(&totals[a.1]));
            let mut keep: Vec<usize> = ranked
                .into_iter()
                .take(self.max_features)
                .map(|(pos, _)| pos)
                .collect();
            keep.sort_unstable();
            first_seen = keep.into_iter().map(|pos| first_seen[pos].clone()).collect();
        }

        let n_docs = corpus.len() as f32;
        let idf: Vec<f32> = first_seen
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f32;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let index = first_seen
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        if first_seen.is_empty() {
            warn!("Lexical vocabulary is empty; every lexical score will be 0");
        } else {
            debug!(
                "Fitted lexical vocabulary: {} terms over {} documents",
                first_seen.len(),
                corpus.len()
            );
        }

        self.vocabulary = Some(Vocabulary {
            terms: first_seen,
            index,
            idf,
        });
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, |v| v.terms.len())
    }

    /// Weighted-term vector of a text under the fitted vocabulary
    pub fn transform(&self, text: &str) -> Result<TermVector> {
        let vocabulary = self
            .vocabulary
            .as_ref()
            .ok_or(ResumeRankerError::NotFitted("LexicalMatcher"))?;

        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for term in self.extract_terms(text) {
            if let Some(&idx) = vocabulary.index.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        for (idx, value) in counts.iter_mut() {
            *value *= vocabulary.idf[*idx];
        }

        let norm = counts.values().map(|w| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in counts.values_mut() {
                *value /= norm;
            }
        } else {
            counts.clear();
        }

        Ok(TermVector { weights: counts })
    }

    /// Cosine similarity and shared weighted terms between two texts
    pub fn score(&self, reference_text: &str, candidate_text: &str) -> Result<LexicalScore> {
        let vocabulary = self
            .vocabulary
            .as_ref()
            .ok_or(ResumeRankerError::NotFitted("LexicalMatcher"))?;

        let reference = self.transform(reference_text)?;
        let candidate = self.transform(candidate_text)?;

        if reference.is_zero() || candidate.is_zero() {
            return Ok(LexicalScore {
                similarity: 0.0,
                shared_terms: Vec::new(),
            });
        }

        let similarity = reference.dot(&candidate).clamp(0.0, 1.0);

        let mut shared: Vec<(usize, f32)> = reference
            .weights
            .iter()
            .filter_map(|(&idx, &w)| {
                let overlap = w.min(candidate.weight(idx));
                (overlap > 0.0).then_some((idx, overlap))
            })
            .collect();
        shared.sort_by(|a, b| b.1.total_cmp(&a.1));

        let shared_terms = shared
            .into_iter()
            .take(MAX_SHARED_TERMS)
            .map(|(idx, weight)| WeightedTerm {
                term: vocabulary.terms[idx].clone(),
                weight,
            })
            .collect();

        Ok(LexicalScore {
            similarity,
            shared_terms,
        })
    }

    /// Word n-grams over the stop-word-filtered token stream
    fn extract_terms(&self, text: &str) -> Vec<String> {
        let tokens = self.processor.tokenize(text);
        let mut terms = Vec::new();
        for n in self.ngram_min..=self.ngram_max {
            if tokens.len() < n {
                break;
            }
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }
}
