//! RAG Server binary
//!
//! Run with: cargo run -p pdf-rag --bin pdf-rag-server [config.toml]
//!
//! Requires LANGCHAIN_API_KEY, GROQ_API_KEY and JINA_API_KEY in the environment.

use pdf_rag::{config::Credentials, pipeline, RagConfig, RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a TOML config file
const CONFIG_VAR: &str = "PDF_RAG_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Credentials first: a missing key must fail before any work is done
    let credentials = Credentials::from_env()?;

    let config = match std::env::args().nth(1).or_else(|| std::env::var(CONFIG_VAR).ok()) {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            RagConfig::from_file(&path)?
        }
        None => {
            let config = RagConfig::default();
            config.validate()?;
            config
        }
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Source: {}", config.source.path.display());
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Top k: {}", config.retrieval.top_k);

    let (pipeline, report) = pipeline::from_config(&config, &credentials).await?;
    tracing::info!("Indexed {} chunks from {} documents", report.chunks, report.documents);

    let server = RagServer::new(config, pipeline, report);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/ask   - Ask a question");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
