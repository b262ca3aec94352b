//! Ranking orchestration: fits the matchers on one run's corpus and scores every candidate

use crate::config::Config;
use crate::error::{Result, ResumeRankerError};
use crate::processing::document::{Corpus, Document};
use crate::processing::embeddings::SentenceEncoder;
use crate::processing::lexical::{LexicalMatcher, WeightedTerm};
use crate::processing::scoring::{coverage, ScoreWeights};
use crate::processing::semantic::{SemanticMatcher, SentenceMatch};
use crate::processing::skills::{ReferenceSkills, SkillExtractor, SkillSet};
use crate::processing::text_processor::truncate_chars;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

const EXPLANATION_SKILLS: usize = 5;
const EXPLANATION_TERMS: usize = 5;
const EXPLANATION_SENTENCE_CHARS: usize = 160;
const EXPLANATION_FRAGMENTS: usize = 3;
const EXPLANATION_SEPARATOR: &str = "  ";

/// Per-run knobs; defaults mirror the configuration defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingOptions {
    pub weights: ScoreWeights,
    pub ngram_min: usize,
    pub ngram_max: usize,
    pub max_features: usize,
    pub top_k_sentences: usize,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            ngram_min: 1,
            ngram_max: 2,
            max_features: 10_000,
            top_k_sentences: 10,
        }
    }
}

impl RankingOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            weights: ScoreWeights::from_config(&config.scoring)?,
            ngram_min: config.matching.ngram_min,
            ngram_max: config.matching.ngram_max,
            max_features: config.matching.max_features,
            top_k_sentences: config.matching.top_k_sentences,
        })
    }
}

/// Everything computed for one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: String,
    pub lexical_score: f32,
    pub shared_terms: Vec<WeightedTerm>,
    pub semantic_score: f32,
    pub top_sentences: Vec<SentenceMatch>,
    pub skills: SkillSet,
    /// Percentage of the reference's required skills found, 0-100
    pub required_coverage: f32,
    pub combined_score: f32,
    pub explanation: String,
    pub extraction_error: Option<String>,
}

/// Results of one run, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedBatch {
    pub reference_skills: ReferenceSkills,
    pub results: Vec<MatchResult>,
}

impl RankedBatch {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn best(&self) -> Option<&MatchResult> {
        self.results.first()
    }
}

/// Holds the process-wide read-only resources shared by every run
pub struct Ranker<'a> {
    encoder: &'a dyn SentenceEncoder,
    skills: &'a SkillExtractor,
}

impl<'a> Ranker<'a> {
    pub fn new(encoder: &'a dyn SentenceEncoder, skills: &'a SkillExtractor) -> Self {
        Self { encoder, skills }
    }

    pub fn rank(
        &self,
        reference_text: &str,
        candidates: &[Document],
        options: &RankingOptions,
    ) -> Result<RankedBatch> {
        if reference_text.trim().is_empty() {
            return Err(ResumeRankerError::Validation(
                "reference text is empty".to_string(),
            ));
        }
        if candidates.is_empty() {
            return Err(ResumeRankerError::Validation(
                "no candidate documents to rank".to_string(),
            ));
        }

        let start_time = Instant::now();
        info!(
            "Ranking {} candidates with encoder '{}'",
            candidates.len(),
            self.encoder.name()
        );

        let corpus = Corpus::for_run(reference_text, candidates);

        let mut lexical =
            LexicalMatcher::new(options.ngram_min, options.ngram_max, options.max_features)?;
        lexical.fit(corpus.texts());

        let mut semantic = SemanticMatcher::new(self.encoder);
        semantic.fit(corpus.texts());

        let reference_skills = self.skills.classify_reference(reference_text);
        debug!(
            "Reference skills: {} required, {} preferred, {} total",
            reference_skills.required.len(),
            reference_skills.preferred.len(),
            reference_skills.all.len()
        );

        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let result = match &candidate.extraction_error {
                Some(reason) => {
                    warn!("Ranking '{}' as empty text: {}", candidate.id, reason);
                    failed_result(candidate, reason)
                }
                None => self.score_candidate(
                    reference_text,
                    candidate,
                    &reference_skills,
                    &lexical,
                    &mut semantic,
                    options,
                )?,
            };
            debug!(
                "{}: lexical {:.3}, semantic {:.3}, combined {:.3}, coverage {:.1}%",
                result.id,
                result.lexical_score,
                result.semantic_score,
                result.combined_score,
                result.required_coverage
            );
            results.push(result);
        }

        // Stable: equal scores keep input order
        results.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));

        info!(
            "Ranked {} candidates in {:.2?}",
            results.len(),
            start_time.elapsed()
        );

        Ok(RankedBatch {
            reference_skills,
            results,
        })
    }

    fn score_candidate(
        &self,
        reference_text: &str,
        candidate: &Document,
        reference_skills: &ReferenceSkills,
        lexical: &LexicalMatcher,
        semantic: &mut SemanticMatcher<'_>,
        options: &RankingOptions,
    ) -> Result<MatchResult> {
        let lexical_score = lexical.score(reference_text, &candidate.text)?;
        let semantic_score =
            semantic.score(reference_text, &candidate.text, options.top_k_sentences)?;
        let skills = self.skills.extract(&candidate.text);
        let required_coverage = coverage(&reference_skills.required, &skills);
        let combined_score = options
            .weights
            .combine(lexical_score.similarity, semantic_score.similarity);
        let explanation = build_explanation(
            &skills,
            &lexical_score.shared_terms,
            &semantic_score.top_sentences,
        );

        Ok(MatchResult {
            id: candidate.id.clone(),
            lexical_score: lexical_score.similarity,
            shared_terms: lexical_score.shared_terms,
            semantic_score: semantic_score.similarity,
            top_sentences: semantic_score.top_sentences,
            skills,
            required_coverage,
            combined_score,
            explanation,
            extraction_error: None,
        })
    }
}

fn failed_result(candidate: &Document, reason: &str) -> MatchResult {
    MatchResult {
        id: candidate.id.clone(),
        lexical_score: 0.0,
        shared_terms: Vec::new(),
        semantic_score: 0.0,
        top_sentences: Vec::new(),
        skills: SkillSet::new(),
        required_coverage: 0.0,
        combined_score: 0.0,
        explanation: format!("Text extraction failed: {}", reason),
        extraction_error: Some(reason.to_string()),
    }
}

fn build_explanation(
    skills: &SkillSet,
    shared_terms: &[WeightedTerm],
    top_sentences: &[SentenceMatch],
) -> String {
    let mut fragments = Vec::new();

    if !skills.is_empty() {
        let listed: Vec<&str> = skills
            .iter()
            .take(EXPLANATION_SKILLS)
            .map(String::as_str)
            .collect();
        fragments.push(format!("Contains skills: {}", listed.join(", ")));
    }

    if !shared_terms.is_empty() {
        let listed: Vec<&str> = shared_terms
            .iter()
            .take(EXPLANATION_TERMS)
            .map(|t| t.term.as_str())
            .collect();
        fragments.push(format!("Keyword overlap: {}", listed.join(", ")));
    }

    if let Some(best) = top_sentences.first() {
        fragments.push(format!(
            "Relevant sentence: {}",
            truncate_chars(&best.sentence, EXPLANATION_SENTENCE_CHARS)
        ));
    }

    fragments.truncate(EXPLANATION_FRAGMENTS);
    fragments.join(EXPLANATION_SEPARATOR)
}
