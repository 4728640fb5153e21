use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaqRagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Vector store error: {0}")]
    StoreError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = std::result::Result<T, FaqRagError>;
