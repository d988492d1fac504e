//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::pipeline::{IndexReport, RagPipeline};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Question answering pipeline over the built index
    pipeline: RagPipeline,
    /// Outcome of the startup index build
    report: IndexReport,
}

impl AppState {
    /// Wrap a pipeline whose index is already built
    pub fn new(config: RagConfig, pipeline: RagPipeline, report: IndexReport) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                report,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the answering pipeline
    pub fn pipeline(&self) -> &RagPipeline {
        &self.inner.pipeline
    }

    /// Get the index build report
    pub fn report(&self) -> &IndexReport {
        &self.inner.report
    }
}
