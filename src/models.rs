//! Core data types shared by the store, the providers and the orchestrator

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A question/answer pair as it appears in the FAQ corpus file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFaqEntry {
    pub question: String,
    pub answer: String,
}

impl NewFaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Text representation that gets embedded
    #[must_use]
    pub fn document_text(&self) -> String {
        format!("Q: {} A: {}", self.question, self.answer)
    }
}

/// An ingested FAQ entry; ids are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
}

/// Read-only projection of a stored entry returned by a similarity query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedMatch {
    pub question: String,
    pub answer: String,
}

impl From<&FaqEntry> for RetrievedMatch {
    fn from(entry: &FaqEntry) -> Self {
        Self {
            question: entry.question.clone(),
            answer: entry.answer.clone(),
        }
    }
}

/// Input to a single provider call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub question: String,
    pub context: String,
}

impl GenerationRequest {
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
        }
    }
}

/// Outcome of a provider call. `text == None` means the provider failed or
/// produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: Option<String>,
    pub provider: ProviderTag,
}

impl GenerationResult {
    pub fn success(provider: ProviderTag, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            provider,
        }
    }

    pub const fn empty(provider: ProviderTag) -> Self {
        Self {
            text: None,
            provider,
        }
    }

    /// Trimmed text, if there is any left after trimming
    pub fn usable_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Source of the answer in an [`AnswerEnvelope`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTag {
    OpenAI,
    Gemini,
    /// No provider produced text; the top match was returned verbatim
    Fallback,
    /// Nothing was retrieved
    None,
}

impl ProviderTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProviderTag::OpenAI => "openai",
            ProviderTag::Gemini => "gemini",
            ProviderTag::Fallback => "fallback",
            ProviderTag::None => "none",
        }
    }
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Confidence for a non-empty match set
    pub const fn for_match_count(count: usize) -> Self {
        if count >= 2 {
            Confidence::High
        } else {
            Confidence::Medium
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        f.write_str(label)
    }
}

/// Final response for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    pub question: String,
    pub answer: String,
    pub relevant_matches: Vec<RetrievedMatch>,
    pub confidence: Confidence,
    pub provider: ProviderTag,
}
