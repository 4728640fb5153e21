//! Text-generation providers
//!
//! Every provider implements [`TextGenerator`]. Availability is decided once,
//! when the provider is constructed, and never changes afterwards. A call that
//! fails for any reason (quota, auth, timeout, malformed response) comes back as
//! an empty [`GenerationResult`] so the caller can move on to the next provider.

pub mod gemini;
pub mod openai;
pub mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use gemini::ModelProbe;
pub use openai::OpenAiProvider;

use crate::errors::FaqRagError;
use crate::models::GenerationRequest;
use crate::models::GenerationResult;
use crate::models::ProviderTag;

/// Uniform generation capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Which provider this is
    fn tag(&self) -> ProviderTag;

    /// Fixed at construction
    fn is_available(&self) -> bool;

    /// Model in use, if one was configured or selected
    fn model(&self) -> Option<&str>;

    /// Generate an answer. Never fails: problems yield an empty result.
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult;

    fn status(&self) -> ProviderStatus {
        ProviderStatus {
            provider: self.tag(),
            available: self.is_available(),
            model: self.model().map(str::to_string),
        }
    }
}

/// Introspection snapshot used by status/debug output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderTag,
    pub available: bool,
    pub model: Option<String>,
}

/// Why a provider call produced no text
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Classify a non-success HTTP response
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let lowered = body.to_lowercase();
        if lowered.contains("quota") || lowered.contains("insufficient") {
            return ProviderError::Quota(body);
        }
        match status {
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(body),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(body),
            _ => ProviderError::Upstream {
                status: status.as_u16(),
                body,
            },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProviderError::Timeout
        } else if error.is_decode() {
            ProviderError::Malformed(error.to_string())
        } else {
            ProviderError::Transport(error.to_string())
        }
    }
}

/// HTTP client with the per-call upstream timeout
pub(crate) fn build_http_client(timeout_secs: u64) -> crate::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .build()
        .map_err(|e| FaqRagError::HttpError(e.to_string()))
}

/// Trimmed text, or `None` when nothing is left
pub(crate) fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_detected_from_body() {
        let error = ProviderError::from_status(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"code":"insufficient_quota"}}"#.to_string(),
        );
        assert!(matches!(error, ProviderError::Quota(_)));
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ProviderError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down".into()),
            ProviderError::RateLimited(_)
        ));
        assert!(matches!(
            ProviderError::from_status(StatusCode::UNAUTHORIZED, "bad key".into()),
            ProviderError::Auth(_)
        ));
        assert!(matches!(
            ProviderError::from_status(StatusCode::BAD_GATEWAY, "oops".into()),
            ProviderError::Upstream { status: 502, .. }
        ));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  answer \n"), Some("answer".to_string()));
        assert_eq!(non_empty(" \n\t"), None);
    }
}
