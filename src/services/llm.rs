//! Chat completion client backing the parts assistant
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint in JSON mode.
//! Failures are reduced to what the parts lookup needs to tell the user:
//! missing or rejected credentials, an unreachable provider, or an answer
//! that is not a JSON object.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::LlmConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmError {
    #[error("no API key configured for the parts assistant")]
    NotConfigured,

    #[error("the parts assistant rejected its API key")]
    Rejected,

    #[error("parts assistant unavailable: {0}")]
    Unavailable(String),

    #[error("unusable answer: {0}")]
    BadAnswer(String),
}

impl LlmError {
    /// Whether an administrator has to fix the credentials
    pub fn is_credentials(&self) -> bool {
        matches!(self, Self::NotConfigured | Self::Rejected)
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("optifield/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system instruction and one question, returning the JSON object
    /// found in the answer
    pub async fn ask(&self, instructions: &str, question: &str) -> Result<Value, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let request = CompletionRequest {
            model: &self.model,
            messages: [
                Message { role: "system", content: instructions },
                Message { role: "user", content: question },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        };

        let res = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Unavailable("request timed out".to_string())
                } else {
                    LlmError::Unavailable(e.to_string())
                }
            })?;

        match res.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(LlmError::Rejected),
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(LlmError::Unavailable("rate limited".to_string()))
            }
            s => return Err(LlmError::Unavailable(format!("provider answered {}", s.as_u16()))),
        }

        let response: CompletionResponse = res
            .json()
            .await
            .map_err(|e| LlmError::BadAnswer(e.to_string()))?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::BadAnswer("empty answer".to_string()))?;

        let object = answer_object(&content)
            .ok_or_else(|| LlmError::BadAnswer("no JSON object in answer".to_string()))?;
        serde_json::from_str(object).map_err(|e| {
            tracing::warn!(
                error = %e,
                preview = %object.chars().take(200).collect::<String>(),
                "Parts assistant answer is not valid JSON"
            );
            LlmError::BadAnswer(e.to_string())
        })
    }
}

/// Outermost `{...}` of an answer, ignoring any prose or code fence around it
fn answer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(base_url: String, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: api_key.map(String::from),
            base_url,
            model: "gpt-4o".to_string(),
            timeout_seconds: 5,
            cache_ttl_seconds: 60,
        }
    }

    fn completion(content: &str) -> String {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
    }

    #[test]
    fn test_answer_object() {
        assert_eq!(answer_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
        assert_eq!(answer_object("```json\n{\"a\": {\"b\": 2}}\n```"), Some(r#"{"a": {"b": 2}}"#));
        assert_eq!(answer_object("Here is the part: {\"a\": 1}. Hope it helps"), Some(r#"{"a": 1}"#));
        assert_eq!(answer_object("no idea"), None);
        assert_eq!(answer_object("} {"), None);
    }

    #[tokio::test]
    async fn test_ask_sends_both_messages_in_json_mode() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "You know tractors"},
                    {"role": "user", "content": "RE504836"}
                ],
                "response_format": {"type": "json_object"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(r#"{"function": "Filters engine oil"}"#))
            .create_async()
            .await;

        let client = LlmClient::new(&config(server.url(), Some("sk-test"))).unwrap();
        let value = client.ask("You know tractors", "RE504836").await.unwrap();

        assert_eq!(value["function"], "Filters engine oil");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "Incorrect API key"}}"#)
            .create_async()
            .await;

        let client = LlmClient::new(&config(server.url(), Some("sk-bad"))).unwrap();
        let err = client.ask("s", "x").await.unwrap_err();
        assert_eq!(err, LlmError::Rejected);
        assert!(err.is_credentials());
    }

    #[tokio::test]
    async fn test_provider_outage_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = LlmClient::new(&config(server.url(), Some("sk-test"))).unwrap();
        let err = client.ask("s", "x").await.unwrap_err();
        assert_eq!(err, LlmError::Unavailable("provider answered 503".to_string()));
        assert!(!err.is_credentials());
    }

    #[tokio::test]
    async fn test_prose_answer_is_bad_answer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("I do not know this reference"))
            .create_async()
            .await;

        let client = LlmClient::new(&config(server.url(), Some("sk-test"))).unwrap();
        let err = client.ask("s", "x").await.unwrap_err();
        assert!(matches!(err, LlmError::BadAnswer(_)));
    }

    #[tokio::test]
    async fn test_blank_key_is_not_configured() {
        let client = LlmClient::new(&config("http://127.0.0.1:9".to_string(), Some("  "))).unwrap();
        assert_eq!(client.ask("s", "x").await.unwrap_err(), LlmError::NotConfigured);
    }
}
