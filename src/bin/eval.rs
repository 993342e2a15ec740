//! Evaluation CLI: grades the chatbot's answers against reference answers.
//!
//! Usage:
//!   rag-eval run <document>                # Built-in validation set
//!   rag-eval run <document> --dataset f    # Custom JSON validation set
//!   rag-eval report                        # Render the saved results
//!
//! Options:
//!   --output <path>    # Where to save results / the markdown report
//!   -v                 # Log progress (-vv for debug)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_rag_chatbot::config::Config;
use doc_rag_chatbot::document::Document;
use doc_rag_chatbot::eval::{
    EvaluationRecord, Evaluator, ScoreTally, ValidationSet, render_terminal, summary_line,
    write_markdown,
};
use doc_rag_chatbot::llm::{GeminiClient, Prompts};
use doc_rag_chatbot::persistence::{cache_exists, load, save};
use doc_rag_chatbot::session::RagSession;
use std::path::PathBuf;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "rag-eval")]
#[command(about = "Evaluate the document chatbot with an LLM grader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer and grade every question in a validation set
    Run {
        /// Path to the document (PDF or text file)
        document: PathBuf,

        /// Custom validation set (JSON); defaults to the built-in set
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Save results to this file (defaults to the cache directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print saved results and write them as a markdown report
    Report {
        /// Results file written by `run`
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Markdown report path (defaults to the cache directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            document,
            dataset,
            output,
        } => cmd_run(config, document, dataset, output).await,
        Commands::Report { input, output } => cmd_report(config, input, output),
    }
}

async fn cmd_run(
    config: Config,
    document_path: PathBuf,
    dataset: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    println!("Gemini API Base: {}", config.llm.api_base);
    println!("Gemini Model: {}", config.llm.model);

    let set = match &dataset {
        Some(path) => {
            println!("Loading validation set from {:?}...", path);
            ValidationSet::load_json(path)?
        }
        None => {
            println!("Using built-in validation set...");
            ValidationSet::builtin()
        }
    };
    if set.is_empty() {
        anyhow::bail!("Validation set '{}' has no questions", set.name);
    }
    println!("Validation set: {} ({} items)", set.name, set.len());

    let output_path = output.unwrap_or_else(|| config.cache.results_path());
    let report_path = config.cache.report_path();
    let labels = Prompts::new(config.rag.language).labels();

    let document = Document::load(&document_path).context("Failed to load document")?;
    let client = GeminiClient::new(config.llm.clone());
    let session = RagSession::open(config, &document, client.clone(), client)
        .await
        .context("Failed to prepare document index")?;

    let start = Instant::now();
    let total = set.len();
    println!("\n{}", "─".repeat(60));

    let summary = Evaluator::new(&session)
        .run(&set, |i, record: &EvaluationRecord| {
            let status = match (&record.error, record.score) {
                (Some(error), _) => format!("failed: {}", error),
                (None, Some(score)) => format!("{}: {}", labels.score, score),
                (None, None) => "no score".to_string(),
            };
            println!("[{}/{}] {} ({})", i + 1, total, record.question, status);
        })
        .await;

    println!("{}", "─".repeat(60));
    println!(
        "Evaluated {} questions in {:.2?} ({} scored, {} failed)",
        summary.records.len(),
        start.elapsed(),
        summary.tally.score_count,
        summary.failed_cases()
    );
    println!("{}", summary_line(summary.average(), &labels));

    save(&summary.records, &output_path).context("Failed to save results")?;
    println!("\nResults saved to {:?}", output_path);

    write_markdown(&summary.records, &labels, &report_path).context("Failed to write report")?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

fn cmd_report(config: Config, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let input_path = input.unwrap_or_else(|| config.cache.results_path());
    let output_path = output.unwrap_or_else(|| config.cache.report_path());

    if !cache_exists(&input_path) {
        anyhow::bail!(
            "Results not found at '{}'. Run 'run' command first.",
            input_path.display()
        );
    }

    let records: Vec<EvaluationRecord> = load(&input_path).context("Failed to load results")?;
    let labels = Prompts::new(config.rag.language).labels();

    print!("{}", render_terminal(&records, &labels));
    println!(
        "{}",
        summary_line(ScoreTally::from_records(&records).average(), &labels)
    );

    write_markdown(&records, &labels, &output_path).context("Failed to write report")?;
    println!("\nReport saved to {:?}", output_path);

    Ok(())
}
