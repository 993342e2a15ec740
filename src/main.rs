//! Doc RAG Chatbot CLI
//!
//! Ask questions about a document and get answers grounded in its text.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_rag_chatbot::{
    chat,
    chunker::Chunk,
    config::Config,
    document::Document,
    llm::GeminiClient,
    persistence::{cache_exists, file_size, load},
    session::RagSession,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::BufReader;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Doc RAG Chatbot - retrieval-augmented question answering over one document
#[derive(Parser)]
#[command(name = "rag-chatbot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk a document and build its embedding cache
    Index {
        /// Path to the document (PDF or text file)
        document: PathBuf,
    },

    /// Chat with a document interactively
    Chat {
        /// Path to the document (PDF or text file)
        document: PathBuf,
    },

    /// Ask a single question about a document
    Ask {
        /// Path to the document (PDF or text file)
        document: PathBuf,

        /// The question
        question: String,

        /// Print the retrieved chunks with their similarity scores
        #[arg(long)]
        show_context: bool,
    },

    /// Show information about the cache files
    Info,

    /// Test the Gemini connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Index { document } => cmd_index(document).await,
        Commands::Chat { document } => cmd_chat(document).await,
        Commands::Ask {
            document,
            question,
            show_context,
        } => cmd_ask(document, question, show_context).await,
        Commands::Info => cmd_info(),
        Commands::Test => cmd_test().await,
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let log_level = match verbose {
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
    Ok(())
}

async fn open_session(document_path: &Path) -> Result<RagSession<GeminiClient, GeminiClient>> {
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let document = Document::load(document_path).context("Failed to load document")?;
    println!(
        "  Document: {} ({} pages, {} characters)",
        document.name,
        document.page_count(),
        document.char_count()
    );

    let client = GeminiClient::new(config.llm.clone());
    let session = RagSession::open(config, &document, client.clone(), client)
        .await
        .context("Failed to prepare document index")?;

    Ok(session)
}

async fn cmd_index(document_path: PathBuf) -> Result<()> {
    println!("Indexing document: {}", document_path.display());
    let start = Instant::now();

    let session = open_session(&document_path).await?;
    let config = session.config();

    println!("\nIndex ready ({:?}):", session.cache_state());
    println!("  Chunks:      {}", session.chunks().len());
    println!(
        "  Chunking:    {} chars, {} overlap",
        config.rag.chunk_size, config.rag.chunk_overlap
    );
    println!("  Model:       {}", config.llm.embedding_model);
    println!("  Time:        {:.2?}", start.elapsed());

    let embeddings_path = config.cache.embeddings_path();
    let size = file_size(&embeddings_path)?;
    println!("\nEmbeddings saved to: {}", embeddings_path.display());
    println!("  File size: {:.1} KB", size as f64 / 1024.0);

    Ok(())
}

async fn cmd_chat(document_path: PathBuf) -> Result<()> {
    println!("Loading document: {}", document_path.display());
    let session = open_session(&document_path).await?;

    println!("{}", "─".repeat(60));
    println!(
        "Ask about '{}'. Type '{}' to quit.",
        session.document_name(),
        chat::QUIT_TOKEN
    );
    println!("{}", "─".repeat(60));

    let input = BufReader::new(tokio::io::stdin());
    let stats = chat::run(&session, input, &mut std::io::stdout())
        .await
        .context("Chat loop failed")?;

    println!(
        "Answered {} question(s), {} failed.",
        stats.answered, stats.failed
    );

    Ok(())
}

async fn cmd_ask(document_path: PathBuf, question: String, show_context: bool) -> Result<()> {
    let session = open_session(&document_path).await?;

    if show_context {
        let hits = session
            .search(&question, session.config().rag.top_k)
            .await
            .context("Retrieval failed")?;

        println!("\nRetrieved context:");
        println!("{}", "─".repeat(60));
        for (i, hit) in hits.iter().enumerate() {
            let score = hit
                .score
                .map(|s| format!("{:.4}", s))
                .unwrap_or_else(|| "n/a".to_string());
            println!("{:>2}. chunk {} (similarity {})", i + 1, hit.index, score);
            let preview: String = hit.text.chars().take(200).collect();
            for line in preview.lines().take(3) {
                println!("      {}", line);
            }
            if hit.text.chars().count() > 200 {
                println!("      ...");
            }
        }
        println!("{}", "─".repeat(60));
    }

    let start = Instant::now();
    let answer = session.ask(&question).await.context("Answering failed")?;

    println!("\n{}", answer);
    println!("\n(answered in {:.2?})", start.elapsed());

    Ok(())
}

fn cmd_info() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let chunks_path = config.cache.chunks_path();
    let embeddings_path = config.cache.embeddings_path();

    if !cache_exists(&embeddings_path) {
        anyhow::bail!(
            "No embedding cache at '{}'. Run 'index' command first.",
            embeddings_path.display()
        );
    }

    let embeddings: Vec<Vec<f32>> = load(&embeddings_path).context("Failed to load embeddings")?;
    let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
    let zero_vectors = embeddings
        .iter()
        .filter(|v| v.iter().all(|x| *x == 0.0))
        .count();

    println!("Cache Information");
    println!("{}", "─".repeat(40));
    if cache_exists(&chunks_path) {
        let chunks: Vec<Chunk> = load(&chunks_path).context("Failed to load chunks")?;
        println!("  Chunks:       {}", chunks.len());
        println!("  Chunks path:  {}", chunks_path.display());
    }
    println!("  Embeddings:   {}", embeddings.len());
    println!("  Dimension:    {}", dimension);
    println!("  Zero vectors: {}", zero_vectors);
    println!(
        "  File size:    {:.1} KB",
        file_size(&embeddings_path)? as f64 / 1024.0
    );
    println!("  Cache path:   {}", embeddings_path.display());

    Ok(())
}

async fn cmd_test() -> Result<()> {
    println!("Testing Gemini connection...\n");

    let config = Config::load().context("Failed to load configuration")?;

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!(
        "  API Key:   {}...",
        config.llm.api_key.chars().take(8).collect::<String>()
    );
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = GeminiClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => println!("Connection successful!"),
        Err(e) => println!("Connection failed: {}", e),
    }

    Ok(())
}
