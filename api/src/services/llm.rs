//! Language-model backend.
//!
//! The tutor only needs one capability, "complete this conversation", so it
//! depends on the `LanguageModel` trait rather than a concrete client. The
//! production implementation talks to any OpenAI-compatible
//! `/chat/completions` endpoint (Ollama exposes one under `/v1`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::errors::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single non-streaming completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Return the assistant's reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Build a client from config. Returns `None` when no base URL is configured.
    pub fn from_config(
        config: &LlmConfig,
        timeout: Duration,
    ) -> Result<Option<Self>, reqwest::Error> {
        match &config.base_url {
            Some(url) => Ok(Some(Self::new(url, &config.api_key, &config.model, timeout)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        const OPERATION: &str = "chat completion";
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(OPERATION, &self.model, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Rejected {
                operation: OPERATION,
                subject: self.model.clone(),
                status: status.as_u16(),
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(OPERATION, &self.model, e))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ProviderError::malformed(OPERATION, &self.model, "no reply content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![
                ChatMessage::system("You are a tutor."),
                ChatMessage::user("What is the greenhouse effect?"),
            ],
            temperature: 0.7,
            max_tokens: 500,
        }
    }

    fn client_for(server: &MockServer) -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(
            &format!("{}/v1", server.uri()),
            "ollama",
            "llama3.1:latest",
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_sends_messages_and_reads_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer ollama"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.1:latest",
                "max_tokens": 500,
                "stream": false,
                "messages": [
                    { "role": "system", "content": "You are a tutor." },
                    { "role": "user", "content": "What is the greenhouse effect?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "index": 0, "message": { "role": "assistant", "content": "Like a blanket." } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).complete(&request()).await.unwrap();
        assert_eq!(reply, "Like a blanket.");
    }

    #[tokio::test]
    async fn test_complete_rejected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_complete_empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedPayload { .. }));
    }

    #[test]
    fn test_from_config_without_base_url() {
        let config = LlmConfig {
            base_url: None,
            api_key: "ollama".to_string(),
            model: "llama3.1:latest".to_string(),
            temperature: 0.7,
            chat_max_tokens: 500,
            explain_max_tokens: 600,
        };
        let client = OpenAiCompatibleClient::from_config(&config, Duration::from_secs(1)).unwrap();
        assert!(client.is_none());
    }
}
