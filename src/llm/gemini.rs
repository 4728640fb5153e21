//! Secondary provider: Google Gemini
//!
//! Region and account setups differ in which Gemini models they expose, so the
//! working model is chosen at startup: each candidate is sent a trivial prompt
//! and the first one that answers with text is kept for the life of the
//! process. If none answers, the provider stays unavailable; the probe is not
//! retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use super::build_http_client;
use super::non_empty;
use super::prompts::build_faq_prompt;
use super::ProviderError;
use super::TextGenerator;
use crate::config::GeminiConfig;
use crate::models::GenerationRequest;
use crate::models::GenerationResult;
use crate::models::ProviderTag;

/// Sampling parameters sent with every generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl From<&GeminiConfig> for GenerationConfig {
    fn from(config: &GeminiConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            top_p: config.top_p,
            top_k: config.top_k,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Thin HTTP wrapper around the `generateContent` endpoint
#[derive(Debug, Clone)]
struct GeminiApi {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiApi {
    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        generation_config: Option<GenerationConfig>,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            normalize_model_name(model)
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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

        let body: GenerateContentResponse = response.json().await?;
        Ok(extract_candidate_text(body))
    }
}

/// `models/gemini-pro` and `gemini-pro` address the same model
fn normalize_model_name(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

fn extract_candidate_text(response: GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let text: String = candidate
        .content?
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    non_empty(&text)
}

/// Startup strategy deciding whether a candidate model works
#[async_trait]
pub trait ModelProbe: Send + Sync {
    /// Issue a trivial generation with `model`; `Ok(Some(_))` means it works
    async fn probe(&self, model: &str) -> Result<Option<String>, ProviderError>;
}

/// Probes candidates against the live API with a short prompt
pub struct HttpModelProbe {
    api: GeminiApi,
    prompt: String,
}

#[async_trait]
impl ModelProbe for HttpModelProbe {
    async fn probe(&self, model: &str) -> Result<Option<String>, ProviderError> {
        self.api.generate_content(model, &self.prompt, None).await
    }
}

/// First candidate whose probe returns non-empty text
pub async fn select_model(probe: &dyn ModelProbe, candidates: &[String]) -> Option<String> {
    for model in candidates {
        debug!("Trying Gemini model: {}", model);
        match probe.probe(model).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                info!("Working Gemini model found: {}", model);
                return Some(model.clone());
            }
            Ok(_) => warn!("Gemini model {} returned no text", model),
            Err(e) => warn!("Gemini model {} failed: {}", model, e),
        }
    }
    None
}

#[derive(Debug)]
enum State {
    Ready { api: GeminiApi, model: String },
    Unavailable { reason: String },
}

#[derive(Debug)]
pub struct GeminiProvider {
    generation_config: GenerationConfig,
    state: State,
}

impl GeminiProvider {
    /// Build the provider, probing the configured candidate models over HTTP
    pub async fn from_config(config: &GeminiConfig) -> Self {
        let api = match Self::connect(config) {
            Ok(api) => api,
            Err(reason) => return Self::unavailable(config, &reason),
        };
        let probe = HttpModelProbe {
            api: api.clone(),
            prompt: config.probe_prompt.clone(),
        };
        Self::select(config, api, &probe).await
    }

    /// Build the provider with an injected probe strategy
    pub async fn with_probe(config: &GeminiConfig, probe: &dyn ModelProbe) -> Self {
        match Self::connect(config) {
            Ok(api) => Self::select(config, api, probe).await,
            Err(reason) => Self::unavailable(config, &reason),
        }
    }

    fn connect(config: &GeminiConfig) -> Result<GeminiApi, String> {
        let Some(api_key) = config.api_key.clone() else {
            warn!("No GOOGLE_API_KEY found, Gemini provider disabled");
            return Err("GOOGLE_API_KEY not set".to_string());
        };

        let client = build_http_client(config.timeout_secs).map_err(|e| {
            warn!("Gemini initialization failed: {}", e);
            e.to_string()
        })?;

        Ok(GeminiApi {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }

    async fn select(config: &GeminiConfig, api: GeminiApi, probe: &dyn ModelProbe) -> Self {
        match select_model(probe, &config.candidate_models).await {
            Some(model) => Self::ready(config, api, model),
            None => {
                warn!("No working Gemini models found");
                Self::unavailable(config, "no candidate model responded")
            }
        }
    }

    fn ready(config: &GeminiConfig, api: GeminiApi, model: String) -> Self {
        info!("Google Gemini initialized with model: {}", model);
        Self {
            generation_config: GenerationConfig::from(config),
            state: State::Ready { api, model },
        }
    }

    pub fn unavailable(config: &GeminiConfig, reason: &str) -> Self {
        Self {
            generation_config: GenerationConfig::from(config),
            state: State::Unavailable {
                reason: reason.to_string(),
            },
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            State::Ready { .. } => None,
            State::Unavailable { reason } => Some(reason),
        }
    }

    /// Failures are recorded as errors on this span before `generate` absorbs them
    #[instrument(name = "gemini_generate_response", skip_all, fields(model = %model), err)]
    async fn traced_generate(
        &self,
        api: &GeminiApi,
        model: &str,
        prompt: &str,
    ) -> Result<Option<String>, ProviderError> {
        debug!("Sending to Gemini ({})", model);
        let text = api
            .generate_content(model, prompt, Some(self.generation_config))
            .await?;
        if let Some(text) = &text {
            debug!("Got Gemini response: {} chars", text.len());
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Gemini
    }

    fn is_available(&self) -> bool {
        matches!(self.state, State::Ready { .. })
    }

    fn model(&self) -> Option<&str> {
        match &self.state {
            State::Ready { model, .. } => Some(model),
            State::Unavailable { .. } => None,
        }
    }

    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let State::Ready { api, model } = &self.state else {
            return GenerationResult::empty(ProviderTag::Gemini);
        };

        let prompt = build_faq_prompt(&request.question, &request.context);
        match self.traced_generate(api, model, &prompt).await {
            Ok(Some(text)) => GenerationResult::success(ProviderTag::Gemini, text),
            Ok(None) => {
                warn!("No text in Gemini response");
                GenerationResult::empty(ProviderTag::Gemini)
            }
            Err(_) => GenerationResult::empty(ProviderTag::Gemini),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use tracing::Level;

    use super::*;
    use crate::tests::trace_capture::TraceCapture;

    /// Scripted probe: answers per model, records the order it was asked in
    struct ScriptedProbe {
        answers: HashMap<String, Option<String>>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedProbe {
        fn new(answers: &[(&str, Option<&str>)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(model, text)| ((*model).to_string(), text.map(str::to_string)))
                    .collect(),
                asked: Mutex::new(Vec::new()),
            }
        }

        fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelProbe for ScriptedProbe {
        async fn probe(&self, model: &str) -> Result<Option<String>, ProviderError> {
            self.asked.lock().unwrap().push(model.to_string());
            match self.answers.get(model) {
                Some(answer) => Ok(answer.clone()),
                None => Err(ProviderError::Upstream {
                    status: 404,
                    body: format!("model {model} not found"),
                }),
            }
        }
    }

    fn config_with_key() -> GeminiConfig {
        GeminiConfig {
            api_key: Some("g-test".to_string()),
            endpoint: "http://127.0.0.1:9/v1beta".to_string(),
            timeout_secs: 2,
            ..GeminiConfig::default()
        }
    }

    #[tokio::test]
    async fn test_probe_picks_first_working_candidate() {
        let probe = ScriptedProbe::new(&[
            ("gemini-1.5-flash", None),
            ("gemini-pro", Some("Hi there")),
            ("models/gemini-pro", Some("Hello")),
        ]);

        let provider = GeminiProvider::with_probe(&config_with_key(), &probe).await;

        assert!(provider.is_available());
        assert_eq!(provider.model(), Some("gemini-pro"));
        assert_eq!(
            probe.asked(),
            vec!["gemini-1.5-flash", "gemini-1.5-pro", "gemini-pro"]
        );
    }

    #[tokio::test]
    async fn test_no_working_candidate_disables_provider() {
        let probe = ScriptedProbe::new(&[("gemini-1.5-flash", Some("   "))]);

        let provider = GeminiProvider::with_probe(&config_with_key(), &probe).await;

        assert!(!provider.is_available());
        assert_eq!(provider.model(), None);
        assert_eq!(probe.asked().len(), 5);
        assert_eq!(
            provider.unavailable_reason(),
            Some("no candidate model responded")
        );
    }

    #[tokio::test]
    async fn test_missing_key_skips_probe() {
        let probe = ScriptedProbe::new(&[("gemini-1.5-flash", Some("Hi"))]);

        let provider = GeminiProvider::with_probe(&GeminiConfig::default(), &probe).await;

        assert!(!provider.is_available());
        assert!(probe.asked().is_empty());
    }

    #[tokio::test]
    async fn test_call_failure_surfaces_as_empty_result() {
        let probe = ScriptedProbe::new(&[("gemini-1.5-flash", Some("Hi"))]);
        let provider = GeminiProvider::with_probe(&config_with_key(), &probe).await;

        let result = provider
            .generate(&GenerationRequest::new("q", "ctx"))
            .await;

        assert_eq!(result, GenerationResult::empty(ProviderTag::Gemini));
    }

    #[tokio::test]
    async fn test_call_failure_recorded_on_generation_span() {
        let capture = TraceCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let probe = ScriptedProbe::new(&[("gemini-1.5-flash", Some("Hi"))]);
        let provider = GeminiProvider::with_probe(&config_with_key(), &probe).await;
        let result = provider
            .generate(&GenerationRequest::new("q", "ctx"))
            .await;
        assert!(result.text.is_none());

        let errors: Vec<_> = capture
            .events()
            .into_iter()
            .filter(|event| event.level == Level::ERROR)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span.as_deref(), Some("gemini_generate_response"));
        assert!(errors[0].field("error").is_some());
        assert_eq!(
            capture.span_field("gemini_generate_response", "model").as_deref(),
            Some("gemini-1.5-flash")
        );
    }

    #[test]
    fn test_generation_config_wire_format() {
        let config = GenerationConfig::from(&GeminiConfig::default());
        let json = serde_json::to_value(config).unwrap();

        assert_eq!(json["maxOutputTokens"], 500);
        assert_eq!(json["topK"], 40);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((json["topP"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_probe_request_omits_generation_config() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "Hello" }],
            }],
            generation_config: None,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_extract_candidate_text_joins_parts() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Returns are "},{"text":"free. "}]}}]}"#,
        )
        .unwrap();
        assert_eq!(
            extract_candidate_text(body),
            Some("Returns are free.".to_string())
        );

        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(extract_candidate_text(blocked), None);
    }

    #[test]
    fn test_normalize_model_name() {
        assert_eq!(normalize_model_name("models/gemini-pro"), "gemini-pro");
        assert_eq!(normalize_model_name("gemini-1.5-flash"), "gemini-1.5-flash");
    }
}
