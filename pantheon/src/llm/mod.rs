//! Text-generation collaborator.
//!
//! The debate cycle and chat dispatch talk to the LLM through the
//! [`TextGenerator`] trait. The live implementation calls the Anthropic
//! messages API; [`CannedGenerator`] serves headless runs and tests.

use async_trait::async_trait;

use crate::config::Settings;

/// Error from the text-generation collaborator.
///
/// The debate loop treats any variant as fatal to the current cycle;
/// chat dispatch catches it and degrades to "no reply".
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    ParseError(String),

    #[error("no API key configured")]
    MissingApiKey,
}

/// Result type for generation calls.
pub type LlmResult<T> = Result<T, LlmError>;

/// The LLM collaborator seam.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the given persona and prompt. A
    /// `max_tokens` of 0 means the implementation's default.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> LlmResult<String>;
}

/// Anthropic messages API client.
pub struct ClaudeClient {
    api_key: String,
    model: String,
    default_max_tokens: u32,
    client: reqwest::Client,
}

impl ClaudeClient {
    /// Build a client from settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            api_key: settings.claude_api_key.clone(),
            model: settings.claude_model.clone(),
            default_max_tokens: settings.claude_max_tokens,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

#[async_trait]
impl TextGenerator for ClaudeClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> LlmResult<String> {
        if self.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let max_tokens = if max_tokens == 0 {
            self.default_max_tokens
        } else {
            max_tokens
        };

        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "system": system_prompt,
            "messages": [{
                "role": "user",
                "content": user_prompt
            }]
        });

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider { status, body });
        }

        let resp_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let content = resp_json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing content[0].text".to_string()))?
            .to_string();

        Ok(content)
    }
}

/// Deterministic generator for headless runs and tests.
///
/// Echoes a short templated line derived from the prompt so downstream
/// keyword scoring still has something to chew on.
#[derive(Debug, Clone, Default)]
pub struct CannedGenerator {
    /// Fixed response returned for every call. Empty uses the template.
    pub fixed: Option<String>,
    /// When true, every call fails — exercises the error paths.
    pub fail: bool,
}

impl CannedGenerator {
    /// Generator that always returns `text`.
    pub fn fixed(text: &str) -> Self {
        Self {
            fixed: Some(text.to_string()),
            fail: false,
        }
    }

    /// Generator that always fails.
    pub fn failing() -> Self {
        Self {
            fixed: None,
            fail: true,
        }
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        _max_tokens: u32,
    ) -> LlmResult<String> {
        if self.fail {
            return Err(LlmError::RequestFailed("canned failure".to_string()));
        }
        if let Some(text) = &self.fixed {
            return Ok(text.clone());
        }
        let preview: String = user_prompt.chars().take(60).collect();
        Ok(format!("In response to \"{}\": so it is spoken.", preview))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_fixed() {
        let gen = CannedGenerator::fixed("order and truth");
        let out = gen.generate("sys", "prompt", 100).await.unwrap();
        assert_eq!(out, "order and truth");
    }

    #[tokio::test]
    async fn test_canned_failing() {
        let gen = CannedGenerator::failing();
        let err = gen.generate("sys", "prompt", 100).await.unwrap_err();
        assert!(matches!(err, LlmError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_canned_template_includes_prompt() {
        let gen = CannedGenerator::default();
        let out = gen.generate("sys", "speak of rituals", 100).await.unwrap();
        assert!(out.contains("speak of rituals"));
    }

    #[tokio::test]
    async fn test_claude_client_requires_key() {
        let settings = Settings::default();
        let client = ClaudeClient::new(&settings);
        let err = client.generate("sys", "prompt", 10).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
