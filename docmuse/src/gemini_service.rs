use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{DocmuseError, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Single-turn completion against a generative language API.
///
/// The credential is supplied by the caller on every request; the service
/// itself holds no key.
pub trait ChatCompleter: Send + Sync {
    fn complete(&self, prompt: &str, api_key: &str) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

/// Builds the single-turn prompt: the full document text followed by the
/// literal question.
pub fn build_prompt(document_text: &str, question: &str) -> String {
    format!("Here is the text from the PDF:\n{document_text}\n\nQuestion: {question}")
}

fn first_candidate_text(response: GeminiResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or(DocmuseError::EmptyAnswer)
}

/// Completion client for the Gemini `generateContent` endpoint.
pub struct GeminiService {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiService {
    pub fn new(client: reqwest::Client, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ChatCompleter for GeminiService {
    async fn complete(&self, prompt: &str, api_key: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        log::debug!("requesting completion from model {}", self.model);
        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocmuseError::Upstream(format!("{status}: {body}")));
        }

        let parsed: GeminiResponse = response.json().await?;
        first_candidate_text(parsed)
    }
}
