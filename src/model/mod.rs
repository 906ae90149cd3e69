use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::web::models::Message;

pub mod error;

pub use error::CompletionError;

pub const MODEL: &str = "llama-3.3-70b-versatile";
pub const MAX_TOKENS: u32 = 1000;
pub const TEMPERATURE: f64 = 0.7;
pub const TOP_P: f64 = 0.9;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError>;
}

// A wrapper for an OpenAI-compatible chat completion endpoint
pub struct CompletionClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl CompletionClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, CompletionError> {
        Self::with_timeout(endpoint, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let endpoint = endpoint.into();
        info!("Using completion endpoint {} (model: {}, timeout: {:?})", endpoint, MODEL, timeout);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CompletionError::from_reqwest)?;

        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            client,
        })
    }

    fn payload(messages: &[Message]) -> Value {
        json!({
            "model": MODEL,
            "messages": messages,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "top_p": TOP_P,
            "stream": false
        })
    }
}

#[async_trait]
impl ChatCompletion for CompletionClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError> {
        let payload = Self::payload(messages);
        info!("Sending {} messages to completion endpoint", messages.len());
        debug!("Payload: {}", payload);

        // Single attempt: failures are reported to the caller, never retried.
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(CompletionError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(CompletionError::from_reqwest)?;

        if status.as_u16() != 200 {
            return Err(CompletionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Parse(format!("invalid JSON body: {}", e)))?;
        debug!("Response JSON: {}", response_json);

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| {
                CompletionError::Parse("missing choices[0].message.content".to_string())
            })?;

        info!("Response length: {} characters", content.len());
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn messages() -> Vec<Message> {
        vec![
            Message::system("You are a construction assistant."),
            Message::user("What is a footing?"),
        ]
    }

    fn endpoint(server: &MockServer) -> String {
        format!("{}/openai/v1/chat/completions", server.uri())
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({
                "model": "llama-3.3-70b-versatile",
                "max_tokens": 1000,
                "temperature": 0.7,
                "top_p": 0.9,
                "stream": false,
                "messages": [
                    { "role": "system", "content": "You are a construction assistant." },
                    { "role": "user", "content": "What is a footing?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "A footing spreads the load." } },
                    { "message": { "role": "assistant", "content": "ignored" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CompletionClient::new(endpoint(&server), "test-key").unwrap();
        let reply = client.complete(&messages()).await.unwrap();
        assert_eq!(reply, "A footing spreads the load.");
    }

    #[tokio::test]
    async fn non_200_carries_status_and_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .expect(1)
            .mount(&server)
            .await;

        let client = CompletionClient::new(endpoint(&server), "test-key").unwrap();
        let err = client.complete(&messages()).await.unwrap_err();
        match err {
            CompletionError::Http { status, ref body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn only_200_counts_as_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "choices": [{ "message": { "content": "created" } }]
            })))
            .mount(&server)
            .await;

        let client = CompletionClient::new(endpoint(&server), "test-key").unwrap();
        let err = client.complete(&messages()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Http { status: 201, .. }));
    }

    #[tokio::test]
    async fn missing_choices_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = CompletionClient::new(endpoint(&server), "test-key").unwrap();
        let err = client.complete(&messages()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Parse(_)));
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = CompletionClient::new(endpoint(&server), "test-key").unwrap();
        let err = client.complete(&messages()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Parse(_)));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = CompletionClient::with_timeout(
            endpoint(&server),
            "test-key",
            Duration::from_millis(100),
        )
        .unwrap();
        let err = client.complete(&messages()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Timeout));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let client = CompletionClient::new("http://127.0.0.1:1/v1/chat/completions", "k").unwrap();
        let err = client.complete(&messages()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Transport(_)));
        assert!(err.reply().starts_with("Sorry, I encountered a network error: "));
    }
}
