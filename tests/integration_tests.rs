//! Integration tests for the resume ranker

use resume_ranker::config::OutputFormat;
use resume_ranker::evaluation;
use resume_ranker::input::InputManager;
use resume_ranker::output::{RankingReport, ReportContext, ReportGenerator};
use resume_ranker::processing::embeddings::HashingEncoder;
use resume_ranker::processing::ranker::{RankedBatch, Ranker, RankingOptions};
use resume_ranker::processing::scoring::ScoreWeights;
use resume_ranker::processing::skills::{SkillDictionary, SkillExtractor};
use resume_ranker::{Document, ResumeRankerError};
use std::path::{Path, PathBuf};

const JOB: &str = "tests/fixtures/job_data_engineer.txt";

fn resume_paths() -> Vec<PathBuf> {
    [
        "tests/fixtures/pastry_chef.txt",
        "tests/fixtures/frontend_developer.md",
        "tests/fixtures/data_engineer.txt",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

fn fixture_extractor() -> SkillExtractor {
    let dictionary = SkillDictionary::load(Path::new("tests/fixtures/skills.json")).unwrap();
    SkillExtractor::new(&dictionary).unwrap()
}

async fn rank_fixtures(paths: &[PathBuf]) -> (Vec<Document>, RankedBatch) {
    let mut manager = InputManager::new();
    let job = manager.extract_text(Path::new(JOB)).await.unwrap();
    let documents = manager.load_documents(paths).await;

    let encoder = HashingEncoder::default();
    let skills = fixture_extractor();
    let batch = Ranker::new(&encoder, &skills)
        .rank(&job, &documents, &RankingOptions::default())
        .unwrap();
    (documents, batch)
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let mut manager = InputManager::new();
    let text = manager
        .extract_text(Path::new("tests/fixtures/data_engineer.txt"))
        .await
        .unwrap();

    assert!(text.starts_with("Jane Doe\nData Engineer"));
    assert!(text.contains("Docker"));
    assert!(!text.contains("  "));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let mut manager = InputManager::new();
    let text = manager
        .extract_text(Path::new("tests/fixtures/frontend_developer.md"))
        .await
        .unwrap();

    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("Node.js"));
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
    assert!(!text.contains('`'));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/pastry_chef.txt");

    let first = manager.extract_text(path).await.unwrap();
    let second = manager.extract_text(path).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(manager.cache_size(), 1);
}

#[tokio::test]
async fn test_unsupported_and_missing_files() {
    let mut manager = InputManager::new();

    let unsupported = manager
        .extract_text(Path::new("tests/fixtures/unsupported.xyz"))
        .await;
    assert!(matches!(unsupported, Err(ResumeRankerError::UnsupportedFormat(_))));

    let missing = manager
        .extract_text(Path::new("tests/fixtures/nonexistent.txt"))
        .await;
    assert!(matches!(missing, Err(ResumeRankerError::Extraction { .. })));
}

#[tokio::test]
async fn test_ranks_matching_resume_first() {
    let (_, batch) = rank_fixtures(&resume_paths()).await;

    let ids: Vec<&str> = batch.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids[0], "data_engineer.txt");
    assert_eq!(ids.len(), 3);

    let required: Vec<&str> = batch.reference_skills.required.iter().map(String::as_str).collect();
    let preferred: Vec<&str> = batch.reference_skills.preferred.iter().map(String::as_str).collect();
    assert_eq!(required, vec!["python", "sql"]);
    assert_eq!(preferred, vec!["docker", "spark"]);

    let best = &batch.results[0];
    assert_eq!(best.required_coverage, 100.0);
    assert!(best.skills.contains("docker"));
    assert!(best.skills.contains("postgresql"));
    assert!(best.explanation.contains("Keyword overlap: "));

    for result in &batch.results {
        assert!((0.0..=1.0).contains(&result.lexical_score));
        assert!((0.0..=1.0).contains(&result.semantic_score));
        let expected = 0.4 * result.lexical_score + 0.6 * result.semantic_score;
        assert!((result.combined_score - expected).abs() < 1e-6);
    }
    for pair in batch.results.windows(2) {
        assert!(pair[0].combined_score >= pair[1].combined_score);
    }
}

#[tokio::test]
async fn test_unreadable_resume_does_not_abort_batch() {
    let mut paths = resume_paths();
    paths.push(PathBuf::from("tests/fixtures/unsupported.xyz"));
    paths.push(PathBuf::from("tests/fixtures/missing.pdf"));

    let (_, batch) = rank_fixtures(&paths).await;
    assert_eq!(batch.len(), 5);
    assert_eq!(batch.results[0].id, "data_engineer.txt");

    let failed: Vec<_> = batch
        .results
        .iter()
        .filter(|r| r.extraction_error.is_some())
        .collect();
    assert_eq!(failed.len(), 2);
    for result in failed {
        assert_eq!(result.combined_score, 0.0);
        assert!(result.skills.is_empty());
        assert!(result.explanation.starts_with("Text extraction failed"));
    }
}

#[tokio::test]
async fn test_report_csv_and_redacted_preview() {
    let (documents, batch) = rank_fixtures(&resume_paths()).await;
    let context = ReportContext {
        job_source: "job_data_engineer.txt".to_string(),
        embedding_model: "hashing".to_string(),
        weights: ScoreWeights::default(),
        required_skill_threshold: 60.0,
        processing_time_ms: 0,
        include_preview: true,
        redact_pii: true,
    };
    let report = RankingReport::build(&batch, &documents, &context);

    let top = &report.rows[0];
    assert!(top.meets_threshold);
    let preview = top.preview.as_deref().unwrap();
    assert!(preview.contains("[EMAIL]"));
    assert!(preview.contains("[PHONE]"));
    assert!(!preview.contains("jane.doe@example.com"));

    let csv = ReportGenerator::with_options(false, false)
        .generate_report(&report, OutputFormat::Csv)
        .unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Resume,Words Match Score,Job Fit Score,Final Fit Score,Required Skills %")
    );
    assert!(lines.next().unwrap().starts_with("data_engineer.txt,"));
    assert_eq!(lines.count(), 2);
}

#[tokio::test]
async fn test_evaluation_of_fixture_ranking() {
    let (_, batch) = rank_fixtures(&resume_paths()).await;
    let report = evaluation::evaluate(&batch, &["data_engineer.txt".to_string()], &[1, 3]);

    assert_eq!(report.precision_at_k[0].precision, 1.0);
    assert!((report.precision_at_k[1].precision - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(report.relevant_found, 1);
}

#[test]
fn test_inline_reference_ranking() {
    let encoder = HashingEncoder::default();
    let skills = SkillExtractor::new(&SkillDictionary::builtin()).unwrap();
    let ranker = Ranker::new(&encoder, &skills);

    let candidates = vec![
        Document::new("python.txt", "Python and SQL developer."),
        Document::new("empty.txt", ""),
    ];
    let batch = ranker
        .rank(
            "Must have Python and SQL. Nice to have Docker.",
            &candidates,
            &RankingOptions::default(),
        )
        .unwrap();

    assert_eq!(batch.results[0].id, "python.txt");
    assert_eq!(batch.results[0].required_coverage, 100.0);
    assert_eq!(batch.results[1].combined_score, 0.0);
    assert!(batch.results[1].explanation.is_empty());
}
