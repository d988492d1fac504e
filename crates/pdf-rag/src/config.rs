//! Configuration for the RAG system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main RAG system configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Source document configuration
    #[serde(default)]
    pub source: SourceConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding service configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Generation service configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Vector index configuration
    #[serde(default)]
    pub vector_db: VectorDbConfig,
    /// Prompt configuration
    #[serde(default)]
    pub prompt: PromptConfig,
    /// Run tracing configuration
    #[serde(default)]
    pub tracing: TracingConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file. Missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: RagConfig = toml::from_str(&raw).map_err(|e| {
            Error::Config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".into()));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::Config("embeddings.batch_size must be positive".into()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Longest accepted question, in characters
    pub max_question_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            enable_cors: true,
            max_body_size: 64 * 1024,
            max_question_chars: 4000,
        }
    }
}

/// Source document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// File or directory to index
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/Sentences_of_table.pdf"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Embedding (Jina) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// API base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Texts sent per request during indexing
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for transient failures
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub retry_base_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jina.ai".to_string(),
            model: "jina-embeddings-v2-base-en".to_string(),
            batch_size: 32,
            timeout_secs: 60,
            max_retries: 2,
            retry_base_ms: 1000,
        }
    }
}

/// Generation (Groq) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// Chat model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Optional cap on generated tokens
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for transient failures
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub retry_base_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com".to_string(),
            model: "llama3-8b-8192".to_string(),
            temperature: 0.9,
            max_tokens: None,
            timeout_secs: 120,
            max_retries: 2,
            retry_base_ms: 1000,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the generator
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Save the built index and reuse it on the next start
    pub persist: bool,
    /// Snapshot location
    pub persist_path: PathBuf,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        let persist_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pdf-rag")
            .join("index.json");

        Self {
            persist: false,
            persist_path,
        }
    }
}

/// Prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptConfig {
    /// Replace the built-in template with the contents of this file
    pub template_path: Option<PathBuf>,
}

/// Run tracing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Report pipeline runs to the tracing endpoint
    pub enabled: bool,
    /// Tracing API endpoint
    pub endpoint: String,
    /// Project the runs are filed under
    pub project: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.smith.langchain.com".to_string(),
            project: "default".to_string(),
        }
    }
}

/// Service credentials, read once at startup
#[derive(Clone)]
pub struct Credentials {
    /// Run tracing API key
    pub tracing_api_key: String,
    /// Groq API key
    pub groq_api_key: String,
    /// Jina API key
    pub jina_api_key: String,
}

impl Credentials {
    pub const TRACING_KEY_VAR: &'static str = "LANGCHAIN_API_KEY";
    pub const GROQ_KEY_VAR: &'static str = "GROQ_API_KEY";
    pub const JINA_KEY_VAR: &'static str = "JINA_API_KEY";

    /// Read all credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read all credentials through `lookup`; a missing or blank value is fatal
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| -> Result<String> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::ConfigMissing(name.to_string()))
        };

        Ok(Self {
            tracing_api_key: require(Self::TRACING_KEY_VAR)?,
            groq_api_key: require(Self::GROQ_KEY_VAR)?,
            jina_api_key: require(Self::JINA_KEY_VAR)?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tracing_api_key", &"<redacted>")
            .field("groq_api_key", &"<redacted>")
            .field("jina_api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_credentials_all_present() {
        let creds = Credentials::from_lookup(lookup_from(&[
            ("LANGCHAIN_API_KEY", "ls-key"),
            ("GROQ_API_KEY", "gsk-key"),
            ("JINA_API_KEY", " jina-key "),
        ]))
        .unwrap();

        assert_eq!(creds.groq_api_key, "gsk-key");
        assert_eq!(creds.jina_api_key, "jina-key");
        assert!(!format!("{:?}", creds).contains("gsk-key"));
    }

    #[test]
    fn test_credentials_missing_or_blank() {
        let err = Credentials::from_lookup(lookup_from(&[
            ("LANGCHAIN_API_KEY", "ls-key"),
            ("JINA_API_KEY", "jina-key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::ConfigMissing(ref name) if name == "GROQ_API_KEY"));

        let err = Credentials::from_lookup(lookup_from(&[
            ("LANGCHAIN_API_KEY", "   "),
            ("GROQ_API_KEY", "gsk-key"),
            ("JINA_API_KEY", "jina-key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::ConfigMissing(ref name) if name == "LANGCHAIN_API_KEY"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RagConfig = toml::from_str(
            r#"
            [chunking]
            chunk_size = 500
            chunk_overlap = 50

            [llm]
            base_url = "http://localhost:9000"
            model = "llama3-70b-8192"
            temperature = 0.0
            timeout_secs = 30
            max_retries = 0
            retry_base_ms = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.llm.max_tokens, None);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.server.port, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections_fill_missing_fields() {
        let config: RagConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [llm]
            model = "x"
            "#,
        )
        .unwrap();

        let defaults = RagConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, defaults.server.host);
        assert_eq!(config.server.max_body_size, defaults.server.max_body_size);
        assert_eq!(config.llm.model, "x");
        assert_eq!(config.llm.temperature, 0.9);
        assert_eq!(config.llm.base_url, defaults.llm.base_url);
        assert_eq!(config.llm.max_retries, defaults.llm.max_retries);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overlap_not_below_size() {
        let mut config = RagConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
