//! Output formatters: console, JSON, CSV, Markdown and HTML

use crate::config::OutputFormat;
use crate::error::{Result, ResumeRankerError};
use crate::output::report::{RankingReport, ReportRow};
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

/// Fixed column set of the tabular export
pub const CSV_HEADERS: [&str; 5] = [
    "Resume",
    "Words Match Score",
    "Job Fit Score",
    "Final Fit Score",
    "Required Skills %",
];

pub trait OutputFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct CsvFormatter;

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// Dispatches a report to the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    csv_formatter: CsvFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Resume Ranking Report</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.5;
            color: #333;
            max-width: 1100px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        h1 { color: #007acc; border-bottom: 3px solid #007acc; padding-bottom: 10px; }
        table { width: 100%; border-collapse: collapse; margin: 20px 0; }
        th, td { padding: 8px 10px; border-bottom: 1px solid #e9ecef; text-align: left; }
        th { background: #f1f3f5; }
        .pass { color: #28a745; font-weight: bold; }
        .fail { color: #dc3545; }
        .candidate { margin: 25px 0; padding: 15px; border-left: 4px solid #007acc; background: #fbfcfd; }
        .explanation { color: #555; font-style: italic; }
        .meta { color: #6c757d; font-size: 0.9em; }
        pre { white-space: pre-wrap; background: #f1f3f5; padding: 10px; border-radius: 4px; }
    </style>
    {% endif %}
</head>
<body>
<div class="container">
    <h1>Resume Ranking Report</h1>
    <p class="meta">Generated {{ generated_at }} | Job: {{ job_source }} | Model: {{ embedding_model }} | Weights: lexical {{ lexical_weight }}, semantic {{ semantic_weight }}</p>
    <p><strong>Required skills:</strong> {{ required_skills }}</p>
    <p><strong>Preferred skills:</strong> {{ preferred_skills }}</p>

    <table>
        <tr><th>#</th><th>Resume</th><th>Words Match</th><th>Job Fit</th><th>Final Fit</th><th>Required Skills %</th></tr>
        {% for row in rows %}
        <tr>
            <td>{{ row.rank }}</td>
            <td>{{ row.resume }}</td>
            <td>{{ row.lexical }}</td>
            <td>{{ row.semantic }}</td>
            <td>{{ row.combined }}</td>
            <td class="{{ row.coverage_class }}">{{ row.coverage }}</td>
        </tr>
        {% endfor %}
    </table>

    {% for row in rows %}
    <div class="candidate">
        <h3>{{ row.rank }}. {{ row.resume }}</h3>
        <p class="explanation">{{ row.explanation }}</p>
        {% if !row.missing.is_empty() %}<p><strong>Missing required:</strong> {{ row.missing }}</p>{% endif %}
        {% if !row.sentences.is_empty() %}
        <ul>
            {% for sentence in row.sentences %}<li>{{ sentence }}</li>{% endfor %}
        </ul>
        {% endif %}
        {% if !row.preview.is_empty() %}<pre>{{ row.preview }}</pre>{% endif %}
    </div>
    {% endfor %}

    <p class="meta">resume-ranker v{{ version }}</p>
</div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    generated_at: String,
    job_source: String,
    embedding_model: String,
    lexical_weight: String,
    semantic_weight: String,
    required_skills: String,
    preferred_skills: String,
    rows: Vec<HtmlRow>,
    version: String,
}

struct HtmlRow {
    rank: usize,
    resume: String,
    lexical: String,
    semantic: String,
    combined: String,
    coverage: String,
    coverage_class: &'static str,
    explanation: String,
    missing: String,
    sentences: Vec<String>,
    preview: String,
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{}\n", title.color(Color::Blue).bold())
        } else {
            format!("\n{}\n", title)
        }
    }

    fn score_color(score: f64) -> Color {
        match score {
            s if s >= 0.7 => Color::Green,
            s if s >= 0.4 => Color::Yellow,
            _ => Color::Red,
        }
    }

    fn format_row(&self, row: &ReportRow) -> String {
        let resume = if row.resume.chars().count() > 30 {
            crate::processing::text_processor::truncate_chars(&row.resume, 27)
        } else {
            row.resume.clone()
        };
        let combined = format!("{:>8.3}", row.combined_score);
        let coverage = format!("{:>9.1}%", row.required_coverage);
        let coverage_color = if row.meets_threshold {
            Color::Green
        } else {
            Color::Red
        };

        format!(
            "{:>3}  {:<30} {:>8.3} {:>8.3} {} {}\n",
            row.rank,
            resume,
            row.lexical_score,
            row.semantic_score,
            self.colorize(&combined, Self::score_color(row.combined_score)),
            self.colorize(&coverage, coverage_color)
        )
    }

    fn format_details(&self, row: &ReportRow) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\n{}. {}\n",
            row.rank,
            self.colorize(&row.resume, Color::Cyan)
        ));
        if let Some(error) = &row.extraction_error {
            output.push_str(&format!("   {}\n", self.colorize(error, Color::Red)));
            return output;
        }
        if !row.explanation.is_empty() {
            output.push_str(&format!("   {}\n", row.explanation));
        }
        output.push_str(&format!("   Skills: {}\n", join_or_none(&row.skills)));
        if !row.missing_required.is_empty() {
            output.push_str(&format!(
                "   Missing required: {}\n",
                self.colorize(&row.missing_required.join(", "), Color::Yellow)
            ));
        }
        if !row.shared_terms.is_empty() {
            output.push_str(&format!("   Shared terms: {}\n", row.shared_terms.join(", ")));
        }
        for sentence in &row.top_sentences {
            output.push_str(&format!("   [{:.3}] {}\n", sentence.similarity, sentence.sentence));
        }
        if let Some(preview) = &row.preview {
            output.push_str("   Preview:\n");
            for line in preview.lines() {
                output.push_str(&format!("     {}\n", line));
            }
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME RANKING"));
        output.push_str(&format!(
            "Job: {} | Model: {} | Weights: lexical {:.2}, semantic {:.2} | {}ms\n",
            report.metadata.job_source,
            report.metadata.embedding_model,
            report.metadata.weights.lexical,
            report.metadata.weights.semantic,
            report.metadata.processing_time_ms
        ));
        output.push_str(&format!(
            "Required skills: {}\n",
            join_or_none(&report.reference.required_skills)
        ));
        output.push_str(&format!(
            "Preferred skills: {}\n",
            join_or_none(&report.reference.preferred_skills)
        ));

        output.push_str(&self.format_header("Ranking"));
        output.push_str(&format!(
            "{:>3}  {:<30} {:>8} {:>8} {:>8} {:>10}\n",
            "#", "Resume", "Words", "Job Fit", "Final", "Required"
        ));
        output.push_str(&format!("{}\n", "-".repeat(72)));
        for row in &report.rows {
            output.push_str(&self.format_row(row));
        }

        output.push_str(&format!(
            "\n{} of {} resumes cover at least {:.0}% of required skills\n",
            report.qualified_count(),
            report.rows.len(),
            report.metadata.required_skill_threshold
        ));

        if self.detailed {
            output.push_str(&self.format_header("Details"));
            for row in &report.rows {
                output.push_str(&self.format_details(row));
            }
        } else if let Some(best) = report.rows.first() {
            if !best.explanation.is_empty() {
                output.push_str(&format!("\nTop match: {}\n", best.explanation));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADERS)?;
        for row in &report.rows {
            writer.write_record([
                row.resume.clone(),
                format!("{:.3}", row.lexical_score),
                format!("{:.3}", row.semantic_score),
                format!("{:.3}", row.combined_score),
                format!("{:.3}", row.required_coverage),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ResumeRankerError::OutputFormatting(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ResumeRankerError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Ranking Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Job:** `{}` | **Model:** `{}`\n\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.job_source,
                report.metadata.embedding_model
            ));
        }

        output.push_str(&format!(
            "**Required skills:** {}  \n**Preferred skills:** {}\n\n",
            join_or_none(&report.reference.required_skills),
            join_or_none(&report.reference.preferred_skills)
        ));

        output.push_str("| # | Resume | Words Match | Job Fit | Final Fit | Required Skills % |\n");
        output.push_str("|---|--------|-------------|---------|-----------|-------------------|\n");
        for row in &report.rows {
            output.push_str(&format!(
                "| {} | {} | {:.3} | {:.3} | {:.3} | {:.1}{} |\n",
                row.rank,
                Self::escape_cell(&row.resume),
                row.lexical_score,
                row.semantic_score,
                row.combined_score,
                row.required_coverage,
                if row.meets_threshold { " ✓" } else { "" }
            ));
        }

        output.push_str("\n## Details\n");
        for row in &report.rows {
            output.push_str(&format!("\n### {}. {}\n\n", row.rank, row.resume));
            if let Some(error) = &row.extraction_error {
                output.push_str(&format!("> Extraction failed: {}\n", error));
                continue;
            }
            if !row.explanation.is_empty() {
                output.push_str(&format!("_{}_\n\n", row.explanation));
            }
            output.push_str(&format!("- **Skills:** {}\n", join_or_none(&row.skills)));
            if !row.missing_required.is_empty() {
                output.push_str(&format!(
                    "- **Missing required:** {}\n",
                    row.missing_required.join(", ")
                ));
            }
            for sentence in &row.top_sentences {
                output.push_str(&format!(
                    "- ({:.3}) {}\n",
                    sentence.similarity, sentence.sentence
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn template_data(&self, report: &RankingReport) -> HtmlTemplate {
        let rows = report
            .rows
            .iter()
            .map(|row| HtmlRow {
                rank: row.rank,
                resume: row.resume.clone(),
                lexical: format!("{:.3}", row.lexical_score),
                semantic: format!("{:.3}", row.semantic_score),
                combined: format!("{:.3}", row.combined_score),
                coverage: format!("{:.1}", row.required_coverage),
                coverage_class: if row.meets_threshold { "pass" } else { "fail" },
                explanation: row.explanation.clone(),
                missing: row.missing_required.join(", "),
                sentences: row
                    .top_sentences
                    .iter()
                    .map(|s| format!("({:.3}) {}", s.similarity, s.sentence))
                    .collect(),
                preview: row.preview.clone().unwrap_or_default(),
            })
            .collect();

        HtmlTemplate {
            include_styles: self.include_styles,
            generated_at: report
                .metadata
                .generated_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            job_source: report.metadata.job_source.clone(),
            embedding_model: report.metadata.embedding_model.clone(),
            lexical_weight: format!("{:.2}", report.metadata.weights.lexical),
            semantic_weight: format!("{:.2}", report.metadata.weights.semantic),
            required_skills: join_or_none(&report.reference.required_skills),
            preferred_skills: join_or_none(&report.reference.preferred_skills),
            rows,
            version: report.metadata.ranker_version.clone(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        self.template_data(report)
            .render()
            .map_err(|e| ResumeRankerError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            csv_formatter: CsvFormatter,
            markdown_formatter: MarkdownFormatter::new(true),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &RankingReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Csv => self.csv_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, job_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(job_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "job".to_string());

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
    };
    format!("{}_ranking{}.{}", base_name, timestamp_suffix, extension)
}
