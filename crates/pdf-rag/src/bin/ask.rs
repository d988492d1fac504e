//! One-shot question from the command line
//!
//! Run with: cargo run -p pdf-rag --features cli --bin pdf-rag-ask -- "What are the store hours?"

use clap::Parser;
use std::path::PathBuf;

use pdf_rag::{config::Credentials, pipeline, RagConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pdf-rag-ask")]
#[command(about = "Answer a question from a PDF document", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document or directory to index (overrides the config)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Print the retrieved chunks after the answer
    #[arg(long)]
    show_sources: bool,

    /// The question to answer
    question: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_rag=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let credentials = Credentials::from_env()?;

    let mut config = match &cli.config {
        Some(path) => RagConfig::from_file(path)?,
        None => RagConfig::default(),
    };
    if let Some(source) = cli.source {
        config.source.path = source;
    }
    config.validate()?;

    let (pipeline, _) = pipeline::from_config(&config, &credentials).await?;
    let result = pipeline.invoke_with_context(&cli.question).await;
    // The process exits right after answering; deliver the run record first
    pipeline.flush_traces().await;
    let output = result?;

    println!("{}", output.answer);

    if cli.show_sources {
        for (i, scored) in output.retrieved.iter().enumerate() {
            let page = scored
                .chunk
                .page
                .map(|p| format!(" p.{}", p + 1))
                .unwrap_or_default();
            println!(
                "\n[{}] {}{} (similarity {:.3})\n{}",
                i + 1,
                scored.chunk.source,
                page,
                scored.similarity,
                scored.chunk.content
            );
        }
    }

    Ok(())
}
