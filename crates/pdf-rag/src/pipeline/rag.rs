//! Retrieval-augmented generation as an explicit sequence of stages

use serde_json::json;
use std::sync::Arc;

use crate::error::Result;
use crate::generation::{format_context, PromptTemplate, StrOutputParser};
use crate::providers::{ChatMessage, Generation, LlmProvider};
use crate::retrieval::{Retriever, ScoredChunk};
use crate::telemetry::{NoopTracer, RunRecord, RunTracer};

/// Answer plus the chunks it was grounded on
#[derive(Debug, Clone)]
pub struct RagOutput {
    pub answer: String,
    pub retrieved: Vec<ScoredChunk>,
}

/// Question answering pipeline:
/// retrieve -> format_context -> fill_prompt -> generate -> parse_output
pub struct RagPipeline {
    retriever: Retriever,
    prompt: PromptTemplate,
    llm: Arc<dyn LlmProvider>,
    parser: StrOutputParser,
    tracer: Arc<dyn RunTracer>,
}

impl RagPipeline {
    pub fn new(retriever: Retriever, prompt: PromptTemplate, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            retriever,
            prompt,
            llm,
            parser: StrOutputParser,
            tracer: Arc::new(NoopTracer),
        }
    }

    /// Report each invocation to `tracer`
    pub fn with_tracer(mut self, tracer: Arc<dyn RunTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Wait for run records still being delivered by the tracer
    pub async fn flush_traces(&self) {
        self.tracer.flush().await;
    }

    /// Answer a question
    pub async fn invoke(&self, question: &str) -> Result<String> {
        Ok(self.invoke_with_context(question).await?.answer)
    }

    /// Answer a question and return the retrieved chunks alongside
    pub async fn invoke_with_context(&self, question: &str) -> Result<RagOutput> {
        let run = RunRecord::chain("RagPipeline", json!({ "question": question }));

        match self.run_stages(question).await {
            Ok(output) => {
                self.tracer.record(run.succeed(json!({ "answer": output.answer })));
                Ok(output)
            }
            Err(e) => {
                self.tracer.record(run.fail(&e));
                Err(e)
            }
        }
    }

    async fn run_stages(&self, question: &str) -> Result<RagOutput> {
        let retrieved = self.retrieve(question).await?;
        let context = self.format_context(&retrieved);
        let messages = self.fill_prompt(&context, question);
        let generation = self.generate(&messages).await?;
        let answer = self.parse_output(generation);

        Ok(RagOutput { answer, retrieved })
    }

    async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>> {
        self.retriever.retrieve(question).await
    }

    fn format_context(&self, retrieved: &[ScoredChunk]) -> String {
        let context = format_context(retrieved.iter().map(|r| &r.chunk));
        if context.is_empty() {
            tracing::warn!("No context retrieved; the answer will not be grounded");
        }
        context
    }

    fn fill_prompt(&self, context: &str, question: &str) -> Vec<ChatMessage> {
        self.prompt.format_messages(context, question)
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation> {
        self.llm.generate(messages).await
    }

    fn parse_output(&self, generation: Generation) -> String {
        self.parser.parse(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::EmbeddingProvider;
    use crate::retrieval::{InMemoryIndex, VectorIndex};
    use crate::types::{Chunk, DocumentMetadata};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Maps text onto two axes: "hours" vs everything else
    struct KeywordEmbedder;

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            if lower.contains("hours") || lower.contains("am") {
                Ok(vec![1.0, 0.1])
            } else {
                Ok(vec![0.1, 1.0])
            }
        }

        fn name(&self) -> &str {
            "keyword"
        }

        fn model(&self) -> &str {
            "keyword-v1"
        }
    }

    /// Echoes the rendered prompt back
    struct EchoLlm;

    #[async_trait]
    impl LlmProvider for EchoLlm {
        async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation> {
            Ok(Generation {
                text: messages.iter().map(|m| m.content.as_str()).collect(),
                model: "echo".to_string(),
                finish_reason: Some("stop".to_string()),
                usage: None,
            })
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmProvider for FailingLlm {
        async fn generate(&self, _messages: &[ChatMessage]) -> Result<Generation> {
            Err(Error::generation("upstream unavailable"))
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    #[derive(Default)]
    struct CollectingTracer {
        runs: Mutex<Vec<RunRecord>>,
        flushes: Mutex<usize>,
    }

    #[async_trait]
    impl RunTracer for CollectingTracer {
        fn record(&self, run: RunRecord) {
            self.runs.lock().push(run);
        }

        async fn flush(&self) {
            *self.flushes.lock() += 1;
        }
    }

    async fn retriever() -> Retriever {
        let meta = DocumentMetadata {
            source: "hours.pdf".to_string(),
            page: Some(0),
        };
        let index = InMemoryIndex::new();
        let embedder = KeywordEmbedder;
        let mut entries = Vec::new();
        for (i, text) in ["Store hours: 8 AM - 8 PM", "Returns within 30 days"].iter().enumerate() {
            let vector = embedder.embed(text).await.unwrap();
            entries.push((Chunk::new(text.to_string(), &meta, i as u32, 0), vector));
        }
        index.add(entries).await.unwrap();

        Retriever::new(Arc::new(KeywordEmbedder), Arc::new(index), 1)
    }

    #[tokio::test]
    async fn test_answer_is_grounded_on_retrieved_context() {
        let pipeline = RagPipeline::new(retriever().await, PromptTemplate::default(), Arc::new(EchoLlm));

        let output = pipeline.invoke_with_context("What are the store hours?").await.unwrap();

        assert_eq!(output.retrieved.len(), 1);
        assert!(output.answer.contains("Question: What are the store hours?"));
        assert!(output.answer.contains("Context: Store hours: 8 AM - 8 PM"));
        assert!(!output.answer.contains("Returns within 30 days"));
    }

    #[tokio::test]
    async fn test_invoke_is_deterministic_with_deterministic_providers() {
        let pipeline = RagPipeline::new(retriever().await, PromptTemplate::default(), Arc::new(EchoLlm));

        let first = pipeline.invoke("What are the store hours?").await.unwrap();
        let second = pipeline.invoke("What are the store hours?").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_index_still_generates() {
        let retriever = Retriever::new(Arc::new(KeywordEmbedder), Arc::new(InMemoryIndex::new()), 4);
        let pipeline = RagPipeline::new(retriever, PromptTemplate::default(), Arc::new(EchoLlm));

        let output = pipeline.invoke_with_context("Anything?").await.unwrap();
        assert!(output.retrieved.is_empty());
        assert!(output.answer.contains("Context:  \n"));
    }

    #[tokio::test]
    async fn test_runs_are_traced_on_success_and_failure() {
        let tracer = Arc::new(CollectingTracer::default());

        let ok = RagPipeline::new(retriever().await, PromptTemplate::default(), Arc::new(EchoLlm))
            .with_tracer(tracer.clone());
        ok.invoke("What are the store hours?").await.unwrap();

        let failing = RagPipeline::new(retriever().await, PromptTemplate::default(), Arc::new(FailingLlm))
            .with_tracer(tracer.clone());
        let err = failing.invoke("What are the store hours?").await.unwrap_err();
        assert!(matches!(err, Error::GenerationService { .. }));

        let runs = tracer.runs.lock();
        assert_eq!(runs.len(), 2);
        assert!(runs[0].outputs.is_some());
        assert!(runs[0].error.is_none());
        assert!(runs[1].error.as_deref().unwrap().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn test_flush_traces_reaches_tracer() {
        let tracer = Arc::new(CollectingTracer::default());
        let pipeline = RagPipeline::new(retriever().await, PromptTemplate::default(), Arc::new(EchoLlm))
            .with_tracer(tracer.clone());

        pipeline.invoke("What are the store hours?").await.unwrap();
        pipeline.flush_traces().await;

        assert_eq!(tracer.runs.lock().len(), 1);
        assert_eq!(*tracer.flushes.lock(), 1);
    }
}
