//! Primary provider: OpenAI text completions

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::build_http_client;
use super::non_empty;
use super::prompts::build_faq_prompt;
use super::ProviderError;
use super::TextGenerator;
use crate::config::OpenAiConfig;
use crate::models::GenerationRequest;
use crate::models::GenerationResult;
use crate::models::ProviderTag;

#[derive(Debug)]
enum State {
    Ready { client: Client, api_key: String },
    Unavailable { reason: String },
}

#[derive(Debug)]
pub struct OpenAiProvider {
    config: OpenAiConfig,
    state: State,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

impl OpenAiProvider {
    /// Build the provider; it is unavailable when no API key is configured or the
    /// HTTP client cannot be created
    pub fn from_config(config: &OpenAiConfig) -> Self {
        let Some(api_key) = config.api_key.clone() else {
            warn!("No OPENAI_API_KEY found, OpenAI provider disabled");
            return Self::unavailable(config, "OPENAI_API_KEY not set");
        };

        match build_http_client(config.timeout_secs) {
            Ok(client) => {
                info!("OpenAI provider initialized with model {}", config.model);
                Self {
                    config: config.clone(),
                    state: State::Ready { client, api_key },
                }
            }
            Err(e) => {
                warn!("OpenAI initialization failed: {}", e);
                Self::unavailable(config, &e.to_string())
            }
        }
    }

    pub fn unavailable(config: &OpenAiConfig, reason: &str) -> Self {
        Self {
            config: config.clone(),
            state: State::Unavailable {
                reason: reason.to_string(),
            },
        }
    }

    /// Why the provider is disabled, if it is
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            State::Ready { .. } => None,
            State::Unavailable { reason } => Some(reason),
        }
    }

    async fn complete(
        &self,
        client: &Client,
        api_key: &str,
        prompt: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/completions", self.config.endpoint.trim_end_matches('/'));
        let request = CompletionRequest {
            model: &self.config.model,
            prompt,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!("Calling OpenAI completions API: {}", url);
        let response = client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::from_status(status, body));
        }

        let body: CompletionResponse = response.json().await?;
        Ok(extract_completion_text(body))
    }
}

fn extract_completion_text(response: CompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| non_empty(&choice.text))
}

#[async_trait]
impl TextGenerator for OpenAiProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::OpenAI
    }

    fn is_available(&self) -> bool {
        matches!(self.state, State::Ready { .. })
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }

    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let State::Ready { client, api_key } = &self.state else {
            return GenerationResult::empty(ProviderTag::OpenAI);
        };

        let prompt = build_faq_prompt(&request.question, &request.context);
        match self.complete(client, api_key, &prompt).await {
            Ok(Some(text)) => GenerationResult::success(ProviderTag::OpenAI, text),
            Ok(None) => {
                warn!("OpenAI returned no text");
                GenerationResult::empty(ProviderTag::OpenAI)
            }
            Err(e) => {
                if matches!(e, ProviderError::Quota(_)) {
                    warn!("OpenAI quota exceeded, falling through to the next provider");
                } else {
                    warn!("OpenAI generation error: {}", e);
                }
                GenerationResult::empty(ProviderTag::OpenAI)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(endpoint: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            endpoint: endpoint.to_string(),
            timeout_secs: 2,
            ..OpenAiConfig::default()
        }
    }

    #[test]
    fn test_missing_key_makes_provider_unavailable() {
        let provider = OpenAiProvider::from_config(&OpenAiConfig::default());

        assert!(!provider.is_available());
        assert_eq!(provider.unavailable_reason(), Some("OPENAI_API_KEY not set"));
        assert_eq!(provider.status().provider, ProviderTag::OpenAI);
    }

    #[test]
    fn test_key_makes_provider_available() {
        let provider = OpenAiProvider::from_config(&config_with_key("https://api.openai.com/v1"));

        assert!(provider.is_available());
        assert_eq!(provider.model(), Some("gpt-3.5-turbo-instruct"));
    }

    #[test]
    fn test_extract_completion_text() {
        let body: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"text":"\n\nReturns are accepted for 30 days. "}]}"#)
                .unwrap();
        assert_eq!(
            extract_completion_text(body),
            Some("Returns are accepted for 30 days.".to_string())
        );

        let empty: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(extract_completion_text(empty), None);
    }

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest {
            model: "gpt-3.5-turbo-instruct",
            prompt: "p",
            temperature: 0.7,
            max_tokens: 256,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-3.5-turbo-instruct");
        assert_eq!(json["max_tokens"], 256);
    }

    #[tokio::test]
    async fn test_unavailable_provider_returns_empty() {
        let provider = OpenAiProvider::from_config(&OpenAiConfig::default());
        let result = provider
            .generate(&GenerationRequest::new("q", "ctx"))
            .await;

        assert_eq!(result, GenerationResult::empty(ProviderTag::OpenAI));
    }

    #[tokio::test]
    async fn test_transport_failure_returns_empty() {
        // Nothing listens on port 9 locally, so the connection is refused
        let provider = OpenAiProvider::from_config(&config_with_key("http://127.0.0.1:9/v1"));
        let result = provider
            .generate(&GenerationRequest::new("q", "ctx"))
            .await;

        assert!(result.text.is_none());
        assert_eq!(result.provider, ProviderTag::OpenAI);
    }
}
