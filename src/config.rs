use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const STORE_PATH_ENV: &str = "FAQRAG_STORE_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Collection file holding ids, documents, metadata and embeddings
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./faq_store/faq_collection.json")
}

fn default_collection() -> String {
    "faq_collection".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            collection: default_collection(),
        }
    }
}

/// Which embedder turns documents and questions into vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Offline feature-hashing embedder
    Hashing,
    OpenAI,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_embedding_backend")]
    pub backend: EmbeddingBackend,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
}

const fn default_embedding_backend() -> EmbeddingBackend {
    EmbeddingBackend::Hashing
}

fn default_embedding_model() -> String {
    "feature-hashing-v1".to_string()
}

const fn default_embedding_dimension() -> usize {
    384
}

fn default_embedding_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            backend: default_embedding_backend(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            endpoint: default_embedding_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of FAQ matches handed to the providers as context
    #[serde(default = "default_retrieval_limit")]
    pub limit: usize,
    /// Candidate locations of the FAQ JSON file used by `populate`
    #[serde(default = "default_faq_data_paths")]
    pub faq_data_paths: Vec<PathBuf>,
}

const fn default_retrieval_limit() -> usize {
    3
}

fn default_faq_data_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("data/faq_data.json"),
        PathBuf::from("../data/faq_data.json"),
    ]
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            limit: default_retrieval_limit(),
            faq_data_paths: default_faq_data_paths(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Usually supplied through `OPENAI_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_openai_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo-instruct".to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_openai_max_tokens() -> u32 {
    256
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_openai_endpoint(),
            model: default_openai_model(),
            temperature: default_temperature(),
            max_tokens: default_openai_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Usually supplied through `GOOGLE_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
    /// Probed in order at startup; the first one that answers is kept
    #[serde(default = "default_candidate_models")]
    pub candidate_models: Vec<String>,
    #[serde(default = "default_probe_prompt")]
    pub probe_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_candidate_models() -> Vec<String> {
    [
        "gemini-1.5-flash",
        "gemini-1.5-pro",
        "gemini-pro",
        "models/gemini-pro",
        "models/gemini-1.5-flash",
    ]
    .iter()
    .map(|m| (*m).to_string())
    .collect()
}

fn default_probe_prompt() -> String {
    "Hello".to_string()
}

const fn default_max_output_tokens() -> u32 {
    500
}

const fn default_top_p() -> f32 {
    0.9
}

const fn default_top_k() -> u32 {
    40
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_gemini_endpoint(),
            candidate_models: default_candidate_models(),
            probe_prompt: default_probe_prompt(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default locations and apply environment overrides
    ///
    /// Looks for `config.toml`, then `config.example.toml`; when neither exists the
    /// built-in defaults are used.
    pub fn load() -> crate::Result<Self> {
        let mut config = if Path::new("config.toml").exists() {
            Self::from_file("config.toml")?
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")?
        } else {
            tracing::debug!("No config file found, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load an explicit configuration file and apply environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    ///
    /// Empty values count as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup(OPENAI_API_KEY_ENV) {
            self.openai.api_key = Some(key);
        }
        if let Some(key) = lookup(GOOGLE_API_KEY_ENV) {
            self.gemini.api_key = Some(key);
        }
        if let Some(path) = lookup(STORE_PATH_ENV) {
            self.store.path = PathBuf::from(path);
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.retrieval.limit == 0 {
            return Err(crate::FaqRagError::ConfigError(
                "retrieval.limit must be at least 1".to_string(),
            ));
        }
        if self.embeddings.backend != EmbeddingBackend::Hashing
            && self.embeddings.model == default_embedding_model()
        {
            return Err(crate::FaqRagError::ConfigError(format!(
                "embeddings.model must name a {:?} embedding model, not the local hashing model",
                self.embeddings.backend
            )));
        }
        if self.embeddings.dimension == 0 {
            return Err(crate::FaqRagError::ConfigError(
                "embeddings.dimension must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get store file path
    pub fn store_path(&self) -> &Path {
        &self.store.path
    }

    /// Get retrieval limit
    pub fn retrieval_limit(&self) -> usize {
        self.retrieval.limit
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    pub fn openai_key_set(&self) -> bool {
        self.openai.api_key.is_some()
    }

    pub fn google_key_set(&self) -> bool {
        self.gemini.api_key.is_some()
    }
}
