//! Resume ranker: rank resumes against a job description

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use resume_ranker::cli::{self, Cli, Commands, ConfigAction, JobSource, ModelAction, TuningArgs};
use resume_ranker::config::Config;
use resume_ranker::error::{Result, ResumeRankerError};
use resume_ranker::evaluation;
use resume_ranker::input::InputManager;
use resume_ranker::output::{
    save_report_to_file, suggest_filename, RankingReport, ReportContext, ReportGenerator,
};
use resume_ranker::processing::document::Document;
use resume_ranker::processing::embedding_manager::EmbeddingModelManager;
use resume_ranker::processing::embeddings::{HashingEncoder, Model2VecEncoder, SentenceEncoder};
use resume_ranker::processing::ranker::{RankedBatch, Ranker, RankingOptions};
use resume_ranker::processing::skills::SkillExtractor;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) if path.exists() => Config::load_from(path),
        Some(path) => {
            info!("{} not found, using default configuration", path.display());
            Ok(Config::default())
        }
        None => Config::load(),
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Rank {
            source,
            resumes,
            tuning,
            output,
            save,
            redact,
            detailed,
        } => {
            let config = run_config(config, &tuning)?;
            let format = match output {
                Some(output) => {
                    cli::parse_output_format(&output).map_err(ResumeRankerError::InvalidInput)?
                }
                None => config.output.format,
            };

            let start_time = Instant::now();
            let run = rank_files(&config, &source, &resumes).await?;

            let context = ReportContext {
                job_source: run.job_source.clone(),
                embedding_model: run.encoder_name.clone(),
                weights: run.options.weights,
                required_skill_threshold: config.scoring.required_skill_threshold,
                processing_time_ms: start_time.elapsed().as_millis() as u64,
                include_preview: detailed || config.output.detailed,
                redact_pii: redact || config.output.redact_pii,
            };
            let report = RankingReport::build(&run.batch, &run.documents, &context);

            let use_colors = config.output.color_output && save.is_none();
            let generator =
                ReportGenerator::with_options(use_colors, detailed || config.output.detailed);
            let content = generator.generate_report(&report, format)?;

            match save {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(suggest_filename(format, &run.job_source, true))
                    } else {
                        path
                    };
                    save_report_to_file(&content, &path)?;
                    println!("{} Report saved to {}", "✓".green(), path.display());
                }
                None => println!("{}", content),
            }
        }

        Commands::Evaluate {
            source,
            resumes,
            relevant,
            k,
            tuning,
            json,
        } => {
            let config = run_config(config, &tuning)?;
            let run = rank_files(&config, &source, &resumes).await?;
            let report = evaluation::evaluate(&run.batch, &relevant, &k);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", "RANKING EVALUATION".blue().bold());
                for (position, result) in run.batch.results.iter().enumerate() {
                    let marker = if relevant.contains(&result.id) { "*" } else { " " };
                    println!(
                        "{} {:>3}. {:<30} {:.3}",
                        marker,
                        position + 1,
                        result.id,
                        result.combined_score
                    );
                }
                println!();
                for p in &report.precision_at_k {
                    println!("Precision@{}: {:.3}", p.k, p.precision);
                }
                match report.score_correlation {
                    Some(r) => println!("Lexical/semantic correlation: {:.3}", r),
                    None => println!("Lexical/semantic correlation: n/a"),
                }
                println!(
                    "Relevant resumes ranked: {}/{}",
                    report.relevant_found, report.relevant_total
                );
            }
        }

        Commands::Models { action } => run_models(action, &config).await?,

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("{}", "Current configuration".bold());
                    println!("File: {}\n", path.display());
                    let rendered = toml::to_string_pretty(&config)
                        .map_err(|e| ResumeRankerError::Configuration(e.to_string()))?;
                    println!("{}", rendered);
                }
                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("{} Configuration reset: {}", "✓".green(), path.display());
                }
                Some(ConfigAction::Path) => println!("{}", path.display()),
            }
        }
    }

    Ok(())
}

/// Config with this run's command-line overrides applied
fn run_config(mut config: Config, tuning: &TuningArgs) -> Result<Config> {
    tuning.apply(&mut config);
    config.validate()?;
    Ok(config)
}

struct RankRun {
    job_source: String,
    encoder_name: String,
    options: RankingOptions,
    documents: Vec<Document>,
    batch: RankedBatch,
}

async fn rank_files(config: &Config, source: &JobSource, resumes: &[PathBuf]) -> Result<RankRun> {
    let mut input_manager = InputManager::new();

    let (job_source, job_text) = match (&source.job, &source.job_text) {
        (Some(path), _) => {
            let name = resume_ranker::input::manager::document_id(path);
            (name, input_manager.extract_text(path).await?)
        }
        (None, Some(text)) => ("inline text".to_string(), text.clone()),
        (None, None) => {
            return Err(ResumeRankerError::Validation(
                "a job description is required".to_string(),
            ))
        }
    };

    let read_spinner = spinner(&format!("Reading {} resumes", resumes.len()))?;
    let documents = input_manager.load_documents(resumes).await;
    let failed = documents.iter().filter(|d| d.extraction_error.is_some()).count();
    read_spinner.finish_with_message(format!(
        "Read {} resumes ({} failed)",
        documents.len(),
        failed
    ));

    let encoder = load_encoder(config).await?;
    let skills = SkillExtractor::from_config(&config.skills)?;
    let options = RankingOptions::from_config(config)?;

    let spinner = spinner("Scoring resumes")?;
    let ranker = Ranker::new(encoder.as_ref(), &skills);
    let batch = ranker.rank(&job_text, &documents, &options);
    spinner.finish_and_clear();
    let batch = batch?;

    Ok(RankRun {
        job_source,
        encoder_name: encoder.name().to_string(),
        options,
        documents,
        batch,
    })
}

/// Encoder named in the configuration; known model ids are downloaded on first use
async fn load_encoder(config: &Config) -> Result<Box<dyn SentenceEncoder>> {
    let model = &config.models.embedding_model;
    if model == "hashing" {
        info!("Using hashing encoder; semantic scores are approximate");
        return Ok(Box::new(HashingEncoder::default()));
    }

    let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
    let encoder = match manager.resolve_model_id(model) {
        Some(model_id) => {
            let path = manager.ensure_model_available(&model_id).await?;
            let spinner = spinner(&format!("Loading embedding model {}", model_id))?;
            let encoder = Model2VecEncoder::load(&path, model_id);
            spinner.finish_and_clear();
            encoder?
        }
        None => Model2VecEncoder::from_config(config)?,
    };
    Ok(Box::new(encoder))
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map_err(|e| ResumeRankerError::OutputFormatting(e.to_string()))?,
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

async fn run_models(action: ModelAction, config: &Config) -> Result<()> {
    let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

    match action {
        ModelAction::List => {
            println!("{}\n", "Embedding models".bold());
            for model in manager.list_available_models() {
                let status = if manager.is_model_downloaded(&model.id) {
                    "downloaded".green()
                } else {
                    "available".yellow()
                };
                let default_marker = if model.id == config.models.embedding_model {
                    " (configured)"
                } else {
                    ""
                };
                println!(
                    "  {} - {} MB, {} dims [{}]{}",
                    model.id, model.size_mb, model.dimensions, status, default_marker
                );
                println!("    {}", model.description);
            }
            if manager.list_downloaded_models().is_empty() {
                println!(
                    "\nNo models downloaded yet. Try: resume-ranker models download {}",
                    manager.auto_select_model()
                );
            }
        }

        ModelAction::Download { model, force } => {
            let model_id = manager
                .resolve_model_id(&model)
                .ok_or_else(|| ResumeRankerError::ModelNotFound(model.clone()))?;

            if manager.is_model_downloaded(&model_id) {
                if !force {
                    println!("Model '{}' is already downloaded (use --force to fetch again)", model_id);
                    return Ok(());
                }
                let model_dir = manager.models_dir().join(&model_id);
                tokio::fs::remove_dir_all(&model_dir).await?;
                manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
            }

            let path = manager.download_model(&model_id).await?;
            println!("{} Model '{}' saved to {}", "✓".green(), model_id, path.display());
        }

        ModelAction::Info { model } => {
            let info = manager
                .get_model_info(&model)
                .ok_or_else(|| ResumeRankerError::ModelNotFound(model.clone()))?;

            println!("Id:          {}", info.id);
            println!("Name:        {}", info.name);
            println!("Repository:  {}", info.repo_id);
            println!("Size:        {} MB", info.size_mb);
            println!("Dimensions:  {}", info.dimensions);
            println!("Description: {}", info.description);
            match manager.get_model_path(&info.id) {
                Some(path) => println!("Location:    {}", path.display()),
                None => println!(
                    "Status:      not downloaded (resume-ranker models download {})",
                    info.id
                ),
            }
        }
    }

    Ok(())
}
