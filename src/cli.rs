//! CLI interface for the resume ranker

use crate::config::{Config, OutputFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-ranker")]
#[command(about = "Rank resumes against a job description")]
#[command(
    long_about = "Rank resumes against a job description by blending TF-IDF keyword overlap with sentence-embedding similarity, and report required-skill coverage for every candidate"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Where the job description comes from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct JobSource {
    /// Path to job description file (PDF, TXT, MD)
    #[arg(short, long)]
    pub job: Option<PathBuf>,

    /// Job description given inline
    #[arg(long)]
    pub job_text: Option<String>,
}

/// Per-run overrides of configuration values
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Weight of the lexical (TF-IDF) score
    #[arg(long)]
    pub lexical_weight: Option<f32>,

    /// Weight of the semantic (embedding) score
    #[arg(long)]
    pub semantic_weight: Option<f32>,

    /// Smallest word group used as a lexical term
    #[arg(long)]
    pub ngram_min: Option<usize>,

    /// Largest word group used as a lexical term (up to 5)
    #[arg(long)]
    pub ngram_max: Option<usize>,

    /// Number of supporting sentences kept per resume
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Required-skill coverage (percent) a resume should reach
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Skill dictionary JSON file
    #[arg(long)]
    pub skills: Option<PathBuf>,

    /// Embedding model id, local model directory, or "hashing"
    #[arg(short, long)]
    pub embedding: Option<String>,

    /// Only use the skill dictionary, without entity detection
    #[arg(long)]
    pub no_entities: bool,
}

impl TuningArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(weight) = self.lexical_weight {
            config.scoring.lexical_weight = weight;
        }
        if let Some(weight) = self.semantic_weight {
            config.scoring.semantic_weight = weight;
        }
        if let Some(n) = self.ngram_min {
            config.matching.ngram_min = n;
        }
        if let Some(n) = self.ngram_max {
            config.matching.ngram_max = n;
        }
        if let Some(k) = self.top_k {
            config.matching.top_k_sentences = k;
        }
        if let Some(threshold) = self.threshold {
            config.scoring.required_skill_threshold = threshold;
        }
        if let Some(path) = &self.skills {
            config.skills.dictionary_path = Some(path.clone());
        }
        if let Some(model) = &self.embedding {
            config.models.embedding_model = model.clone();
        }
        if self.no_entities {
            config.skills.detect_entities = false;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank resumes against a job description
    Rank {
        #[command(flatten)]
        source: JobSource,

        /// Resume files (PDF, TXT, MD)
        #[arg(short, long, num_args = 1.., required = true)]
        resumes: Vec<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Output format: console, json, csv, markdown, html
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file (a directory gets a suggested file name)
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Mask emails and phone numbers in resume previews
        #[arg(long)]
        redact: bool,

        /// Show per-resume details and previews
        #[arg(short, long)]
        detailed: bool,
    },

    /// Rank resumes and measure the ranking against known-relevant ones
    Evaluate {
        #[command(flatten)]
        source: JobSource,

        /// Resume files (PDF, TXT, MD)
        #[arg(short, long, num_args = 1.., required = true)]
        resumes: Vec<PathBuf>,

        /// File names of the resumes that should rank highly
        #[arg(long, num_args = 1.., required = true)]
        relevant: Vec<String>,

        /// Cutoffs for precision@k (repeatable)
        #[arg(short, long = "k", default_values_t = [1, 3, 5])]
        k: Vec<usize>,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Embedding model management
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List known embedding models
    List,

    /// Download an embedding model
    Download {
        /// Model id, repo id or name
        model: String,

        /// Download again even if present
        #[arg(short, long)]
        force: bool,
    },

    /// Show model information
    Info {
        /// Model id, repo id or name
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "csv" => Ok(OutputFormat::Csv),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, csv, markdown, html",
            format
        )),
    }
}
