//! CLI entry point for branded search traffic analysis.

use anyhow::{Result, anyhow};
use brandlens::utils::truncate_str;
use brandlens::{AnalysisOutcome, AnalysisReport, ClassificationConfig, Pipeline, ReportGenerator, ingest};
use clap::Parser;
use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Environment variable consulted for brand terms when no flag or config file sets them.
const BRAND_TERMS_ENV: &str = "BRANDLENS_BRAND_TERMS";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Branded vs. non-branded search traffic analysis",
    long_about = "Classifies search-performance exports (query, page, clicks, impressions, ctr, position)\n\
                  as branded or non-branded traffic and aggregates them by path, language and content type.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  BRANDLENS_BRAND_TERMS    Comma-separated brand terms (used when --brand-terms is absent)\n\n\
                  EXAMPLES:\n  \
                  # Term matching\n  \
                  brandlens -i queries.csv --brand-terms \"acme, acme corp\"\n\n  \
                  # Custom pattern, with CSV exports and a JSON report\n  \
                  brandlens -i queries.csv --pattern \"^acme\\\\b\" --export --emit-report\n\n  \
                  # Machine-readable output\n  \
                  brandlens -i queries.csv --brand-terms acme --json"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: String,

    /// Output directory for reports and exports
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Comma-separated brand terms
    #[arg(short, long)]
    brand_terms: Option<String>,

    /// Regular expression identifying branded queries (replaces term matching)
    #[arg(short, long)]
    pattern: Option<String>,

    /// Match brand terms or pattern case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Do not resolve language codes from URL paths
    #[arg(long)]
    no_language: bool,

    /// JSON file holding a classification config (camelCase fields)
    ///
    /// Command-line flags override values from the file.
    #[arg(short, long)]
    config: Option<String>,

    /// Write the path, query, language and insight tables as CSV files
    #[arg(short, long)]
    export: bool,

    /// Write a JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;

    let data = ingest::load_csv(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let mut builder = Pipeline::builder().config(config.clone());
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let outcome = match pipeline.run_frame(&data) {
        Ok(outcome) => outcome,
        Err(e) if e.is_dataset_rejection() => {
            error!("Dataset rejected: {}", e);
            return Err(anyhow!("Dataset rejected: {}", e));
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed: {}", e));
        }
    };

    handle_output(&outcome, &config, &args)
}

/// Assemble the classification config from the config file, flags and environment.
fn build_config(args: &Args) -> Result<ClassificationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow!("Could not read config file {}: {}", path, e))?;
            serde_json::from_str::<ClassificationConfig>(&content)
                .map_err(|e| anyhow!("Invalid config file {}: {}", path, e))?
        }
        None => ClassificationConfig::default(),
    };

    if let Some(terms) = &args.brand_terms {
        config.brand_terms = terms.clone();
    } else if config.brand_terms.trim().is_empty()
        && let Ok(terms) = env::var(BRAND_TERMS_ENV)
    {
        info!("Using brand terms from {}", BRAND_TERMS_ENV);
        config.brand_terms = terms;
    }

    if let Some(pattern) = &args.pattern {
        config.use_custom_pattern = true;
        config.custom_pattern = pattern.clone();
    }
    if args.case_sensitive {
        config.case_sensitive = true;
    }
    if args.no_language {
        config.detect_language = false;
    }

    config.validate()?;
    Ok(config)
}

/// Handle analysis output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report to file
/// - `--export`: Write CSV tables to the output directory
fn handle_output(outcome: &AnalysisOutcome, config: &ClassificationConfig, args: &Args) -> Result<()> {
    let report = ReportGenerator::build_report(&args.input, config, outcome);
    let input_stem = extract_file_stem(&args.input);
    let generator = ReportGenerator::new(PathBuf::from(&args.output));

    if args.emit_report {
        let report_path = generator.write_report_to_file(&report, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.export {
        for path in generator.write_exports(outcome, &report.insights, &input_stem)? {
            info!("Export written to: {}", path.display());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&report, outcome);
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Print a human-readable summary of the analysis.
///
/// Uses `println!` rather than logging: this is the primary output and must
/// show regardless of log level.
fn print_human_readable_summary(report: &AnalysisReport, outcome: &AnalysisOutcome) {
    let summary = &report.summary;
    let result = &outcome.result;

    println!();
    println!("{}", "=".repeat(80));
    println!("ANALYSIS COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!("Input: {} ({} rows)", report.input_file, summary.input_rows);
    println!(
        "Rows:  {} analyzed, {} skipped, {} duplicates",
        summary.total_rows, summary.skipped_rows, summary.duplicate_count
    );
    println!();

    println!("Traffic Split:");
    for (label, bucket, share) in [
        ("Branded", &result.branded, summary.branded_percentage),
        ("Non-Branded", &result.non_branded, summary.non_branded_percentage),
    ] {
        println!(
            "  {:<12} {:>6} rows ({:>5.1}%)  clicks {:>8}  impressions {:>10}  CTR {:>6.2}%  avg pos {:>5.1}",
            label,
            bucket.count,
            share,
            bucket.metrics.clicks,
            bucket.metrics.impressions,
            bucket.metrics.ctr * 100.0,
            bucket.metrics.avg_position
        );
    }
    println!();

    if !result.path_stats.is_empty() {
        println!("Top Paths:");
        println!(
            "  {:<30} {:>8} {:>10} {:>14}",
            "Path", "Total", "Branded %", "Non-Branded %"
        );
        for stat in result.path_stats.iter().take(10) {
            println!(
                "  {:<30} {:>8} {:>10.1} {:>14.1}",
                truncate_str(&stat.path, 30),
                stat.split.total,
                stat.split.branded_percentage,
                stat.split.non_branded_percentage
            );
        }
        if result.path_stats.len() > 10 {
            println!("  ... and {} more paths", result.path_stats.len() - 10);
        }
        println!();
    }

    if !result.language_stats.is_empty() {
        println!("Languages:");
        for stat in &result.language_stats {
            println!(
                "  {:<10} {:>8} rows  {:>8} clicks  {:>5.1}% branded",
                stat.lang, stat.split.total, stat.clicks, stat.split.branded_percentage
            );
        }
        println!();
    }

    println!("Data Quality:");
    println!(
        "  Health score: {:.1} / 95 (completeness {:.1}%)",
        report.quality.health_score, report.quality.completeness
    );
    for warning in &report.quality.warnings {
        println!("  ! [{:?}] {}", warning.severity, warning.message);
    }
    println!();

    if !report.insights.is_empty() {
        println!("Insights:");
        for insight in &report.insights {
            println!("  - {}: {}", insight.title, insight.detail);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save a JSON report, --export for CSV tables");
    println!("{}", "=".repeat(80));
}
