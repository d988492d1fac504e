//! Pipeline wiring: index build at startup, question answering per request

pub mod indexing;
pub mod rag;

pub use indexing::{IndexReport, Indexer};
pub use rag::{RagOutput, RagPipeline};

use std::sync::Arc;

use crate::config::{Credentials, RagConfig};
use crate::error::Result;
use crate::generation::PromptTemplate;
use crate::ingestion::{load_source, RecursiveChunker};
use crate::providers::{EmbeddingProvider, GroqClient, JinaEmbedder, LlmProvider};
use crate::retrieval::{Retriever, VectorIndex};
use crate::telemetry::{LangSmithTracer, NoopTracer, RunTracer};
use crate::types::Document;

/// Index `docs` and wire the answering pipeline around the resulting index
pub async fn assemble(
    config: &RagConfig,
    docs: &[Document],
    prompt: PromptTemplate,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    tracer: Arc<dyn RunTracer>,
) -> Result<(RagPipeline, IndexReport)> {
    let chunker = RecursiveChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
    let indexer = Indexer::new(chunker, embedder.clone(), config.embeddings.batch_size);

    let (index, report) = indexer.build_persistent(docs, &config.vector_db).await?;
    tracing::info!(
        "Index ready: {} documents, {} chunks{}",
        report.documents,
        report.chunks,
        if report.reused_snapshot { " (snapshot)" } else { "" }
    );

    let index: Arc<dyn VectorIndex> = Arc::new(index);
    let retriever = Retriever::new(embedder, index, config.retrieval.top_k);
    let pipeline = RagPipeline::new(retriever, prompt, llm).with_tracer(tracer);

    Ok((pipeline, report))
}

/// Build everything from configuration and credentials: clients, source, index, pipeline
pub async fn from_config(
    config: &RagConfig,
    credentials: &Credentials,
) -> Result<(RagPipeline, IndexReport)> {
    let prompt = match &config.prompt.template_path {
        Some(path) => PromptTemplate::from_file(path)?,
        None => PromptTemplate::default(),
    };

    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(JinaEmbedder::new(&config.embeddings, &credentials.jina_api_key)?);
    let llm: Arc<dyn LlmProvider> = Arc::new(GroqClient::new(&config.llm, &credentials.groq_api_key)?);

    let tracer: Arc<dyn RunTracer> = if config.tracing.enabled {
        Arc::new(LangSmithTracer::new(&config.tracing, &credentials.tracing_api_key)?)
    } else {
        Arc::new(NoopTracer)
    };

    tracing::info!("Loading source {}", config.source.path.display());
    let docs = load_source(&config.source.path)?;
    tracing::info!("Loaded {} documents", docs.len());

    assemble(config, &docs, prompt, embedder, llm, tracer).await
}
