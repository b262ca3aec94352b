//! Report structures built from a ranked batch for presentation

use crate::processing::document::Document;
use crate::processing::ranker::{MatchResult, RankedBatch};
use crate::processing::scoring::ScoreWeights;
use crate::processing::semantic::SentenceMatch;
use crate::processing::text_processor::{truncate_chars, TextProcessor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const REPORT_SENTENCES: usize = 5;
const REPORT_TERMS: usize = 10;
const PREVIEW_CHARS: usize = 2000;

/// Presentation-ready view of one ranking run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub metadata: ReportMetadata,
    pub reference: ReferenceSummary,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub ranker_version: String,
    /// File name of the job description, or "inline text"
    pub job_source: String,
    pub embedding_model: String,
    pub weights: ScoreWeights,
    pub required_skill_threshold: f32,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSummary {
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub all_skills: Vec<String>,
}

/// One ranked resume; scores rounded to 3 decimals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub rank: usize,
    pub resume: String,
    pub lexical_score: f64,
    pub semantic_score: f64,
    pub combined_score: f64,
    pub required_coverage: f64,
    pub meets_threshold: bool,
    pub matched_required: Vec<String>,
    pub missing_required: Vec<String>,
    pub skills: Vec<String>,
    pub shared_terms: Vec<String>,
    pub top_sentences: Vec<SentenceMatch>,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

/// Caller-side inputs that are not part of the ranked batch
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub job_source: String,
    pub embedding_model: String,
    pub weights: ScoreWeights,
    pub required_skill_threshold: f32,
    pub processing_time_ms: u64,
    pub include_preview: bool,
    pub redact_pii: bool,
}

pub fn round3(value: f32) -> f64 {
    (f64::from(value) * 1000.0).round() / 1000.0
}

impl RankingReport {
    /// `documents` supplies the text for previews, matched to results by id
    pub fn build(batch: &RankedBatch, documents: &[Document], context: &ReportContext) -> Self {
        let processor = TextProcessor::new();
        let required = &batch.reference_skills.required;

        let rows = batch
            .results
            .iter()
            .enumerate()
            .map(|(idx, result)| {
                let preview = context
                    .include_preview
                    .then(|| documents.iter().find(|d| d.id == result.id))
                    .flatten()
                    .filter(|d| !d.is_blank())
                    .map(|d| {
                        let text = if context.redact_pii {
                            processor.redact_pii(&d.text)
                        } else {
                            d.text.clone()
                        };
                        truncate_chars(&text, PREVIEW_CHARS)
                    });
                build_row(idx + 1, result, required, context.required_skill_threshold, preview)
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                ranker_version: env!("CARGO_PKG_VERSION").to_string(),
                job_source: context.job_source.clone(),
                embedding_model: context.embedding_model.clone(),
                weights: context.weights,
                required_skill_threshold: context.required_skill_threshold,
                processing_time_ms: context.processing_time_ms,
            },
            reference: ReferenceSummary {
                required_skills: required.iter().cloned().collect(),
                preferred_skills: batch.reference_skills.preferred.iter().cloned().collect(),
                all_skills: batch.reference_skills.all.iter().cloned().collect(),
            },
            rows,
        }
    }

    pub fn qualified_count(&self) -> usize {
        self.rows.iter().filter(|r| r.meets_threshold).count()
    }
}

fn build_row(
    rank: usize,
    result: &MatchResult,
    required: &std::collections::BTreeSet<String>,
    threshold: f32,
    preview: Option<String>,
) -> ReportRow {
    let (matched_required, missing_required): (Vec<String>, Vec<String>) = required
        .iter()
        .cloned()
        .partition(|skill| result.skills.contains(skill));

    ReportRow {
        rank,
        resume: result.id.clone(),
        lexical_score: round3(result.lexical_score),
        semantic_score: round3(result.semantic_score),
        combined_score: round3(result.combined_score),
        required_coverage: round3(result.required_coverage),
        meets_threshold: result.required_coverage >= threshold,
        matched_required,
        missing_required,
        skills: result.skills.iter().cloned().collect(),
        shared_terms: result
            .shared_terms
            .iter()
            .take(REPORT_TERMS)
            .map(|t| t.term.clone())
            .collect(),
        top_sentences: result
            .top_sentences
            .iter()
            .take(REPORT_SENTENCES)
            .cloned()
            .collect(),
        explanation: result.explanation.clone(),
        preview,
        extraction_error: result.extraction_error.clone(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::processing::lexical::WeightedTerm;
    use crate::processing::skills::{ReferenceSkills, SkillSet};

    fn set(items: &[&str]) -> SkillSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    pub(crate) fn sample_batch() -> RankedBatch {
        RankedBatch {
            reference_skills: ReferenceSkills {
                required: set(&["python", "sql"]),
                preferred: set(&["docker"]),
                all: set(&["docker", "python", "sql"]),
            },
            results: vec![
                MatchResult {
                    id: "alice.txt".to_string(),
                    lexical_score: 0.41234,
                    shared_terms: vec![WeightedTerm {
                        term: "python".to_string(),
                        weight: 0.3,
                    }],
                    semantic_score: 0.8766,
                    top_sentences: (0..7)
                        .map(|i| SentenceMatch {
                            sentence: format!("Sentence {}.", i),
                            similarity: 0.9 - i as f32 * 0.1,
                        })
                        .collect(),
                    skills: set(&["python", "sql", "docker"]),
                    required_coverage: 100.0,
                    combined_score: 0.69084,
                    explanation: "Contains skills: docker, python, sql".to_string(),
                    extraction_error: None,
                },
                MatchResult {
                    id: "bob.pdf".to_string(),
                    lexical_score: 0.0,
                    shared_terms: Vec::new(),
                    semantic_score: 0.0,
                    top_sentences: Vec::new(),
                    skills: SkillSet::new(),
                    required_coverage: 0.0,
                    combined_score: 0.0,
                    explanation: "Text extraction failed: unreadable".to_string(),
                    extraction_error: Some("unreadable".to_string()),
                },
            ],
        }
    }

    pub(crate) fn sample_context() -> ReportContext {
        ReportContext {
            job_source: "job.txt".to_string(),
            embedding_model: "hashing".to_string(),
            weights: ScoreWeights::default(),
            required_skill_threshold: 60.0,
            processing_time_ms: 12,
            include_preview: false,
            redact_pii: false,
        }
    }

    pub(crate) fn sample_report() -> RankingReport {
        RankingReport::build(&sample_batch(), &[], &sample_context())
    }

    #[test]
    fn test_rows_are_rounded_and_ranked() {
        let report = sample_report();

        assert_eq!(report.rows.len(), 2);
        let alice = &report.rows[0];
        assert_eq!(alice.rank, 1);
        assert_eq!(alice.lexical_score, 0.412);
        assert_eq!(alice.semantic_score, 0.877);
        assert_eq!(alice.combined_score, 0.691);
        assert_eq!(alice.required_coverage, 100.0);
        assert!(alice.meets_threshold);
        assert_eq!(alice.matched_required, vec!["python", "sql"]);
        assert!(alice.missing_required.is_empty());
        assert_eq!(alice.top_sentences.len(), 5);

        let bob = &report.rows[1];
        assert_eq!(bob.rank, 2);
        assert!(!bob.meets_threshold);
        assert_eq!(bob.missing_required, vec!["python", "sql"]);
        assert_eq!(bob.extraction_error.as_deref(), Some("unreadable"));

        assert_eq!(report.qualified_count(), 1);
        assert_eq!(report.reference.required_skills, vec!["python", "sql"]);
    }

    #[test]
    fn test_preview_is_redacted_and_truncated() {
        let documents = vec![Document::new(
            "alice.txt",
            format!("Alice alice@example.com 555-123-4567 {}", "x".repeat(3000)),
        )];
        let context = ReportContext {
            include_preview: true,
            redact_pii: true,
            ..sample_context()
        };

        let report = RankingReport::build(&sample_batch(), &documents, &context);
        let preview = report.rows[0].preview.as_deref().unwrap();

        assert!(preview.starts_with("Alice [EMAIL] [PHONE] "));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(report.rows[1].preview.is_none());
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.12345), 0.123);
        assert_eq!(round3(0.9996), 1.0);
        assert_eq!(round3(66.666_67), 66.667);
    }
}
