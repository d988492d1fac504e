//! Run tracing: one record per pipeline invocation, posted in the background

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::TracingConfig;
use crate::error::{Error, Result};

/// Description of one finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub id: Uuid,
    pub name: String,
    pub run_type: String,
    pub inputs: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl RunRecord {
    /// Start a chain run; finish it with `succeed` or `fail`
    pub fn chain(name: impl Into<String>, inputs: Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            run_type: "chain".to_string(),
            inputs,
            outputs: None,
            error: None,
            start_time: now,
            end_time: now,
        }
    }

    pub fn succeed(mut self, outputs: Value) -> Self {
        self.outputs = Some(outputs);
        self.end_time = Utc::now();
        self
    }

    pub fn fail(mut self, error: &Error) -> Self {
        self.error = Some(error.to_string());
        self.end_time = Utc::now();
        self
    }
}

/// Sink for run records. `record` must not block the caller.
#[async_trait]
pub trait RunTracer: Send + Sync {
    fn record(&self, run: RunRecord);

    /// Wait until every record handed to `record` so far has been delivered
    async fn flush(&self) {}
}

/// Discards every record
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl RunTracer for NoopTracer {
    fn record(&self, _run: RunRecord) {}
}

#[derive(Serialize)]
struct RunPayload<'a> {
    #[serde(flatten)]
    run: &'a RunRecord,
    session_name: &'a str,
}

/// Posts run records to a LangSmith-compatible `/runs` endpoint
pub struct LangSmithTracer {
    client: Client,
    url: String,
    api_key: String,
    project: String,
    /// Posts still in flight
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl LangSmithTracer {
    pub fn new(config: &TracingConfig, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: format!("{}/runs", config.endpoint.trim_end_matches('/')),
            api_key: api_key.to_string(),
            project: config.project.clone(),
            pending: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RunTracer for LangSmithTracer {
    fn record(&self, run: RunRecord) {
        let client = self.client.clone();
        let url = self.url.clone();
        let api_key = self.api_key.clone();
        let project = self.project.clone();

        let handle = tokio::spawn(async move {
            let payload = RunPayload {
                run: &run,
                session_name: &project,
            };

            match client
                .post(&url)
                .header("x-api-key", api_key)
                .json(&payload)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    tracing::debug!("Recorded run {}", run.id);
                }
                Ok(resp) => {
                    tracing::warn!("Run tracing rejected run {}: HTTP {}", run.id, resp.status());
                }
                Err(e) => {
                    tracing::warn!("Run tracing failed for run {}: {}", run.id, e);
                }
            }
        });

        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    async fn flush(&self) {
        let handles = std::mem::take(&mut *self.pending.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Run tracing task failed: {}", e);
            }
        }
    }
}
