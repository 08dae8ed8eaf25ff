use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::instrument;

use super::stream::{deferred, response_stream, SseParser};
use super::{build_http_client, ensure_success, require_api_key};
use crate::agent::Message;
use crate::config::EnvConfig;
use crate::error::{Result, SwarmError};
use crate::llm::client::{DynLlmClient, LlmClient};
use crate::llm::types::{LlmConfig, LlmProviderKind, LlmStream};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Self {
        let model = if config.model.trim().is_empty() {
            LlmProviderKind::OpenAi.default_model().to_string()
        } else {
            config.model.clone()
        };
        Self {
            client: build_http_client(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: EnvConfig::resolve_api_key(config.api_key.as_deref(), Some(API_KEY_ENV)),
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn build_request_body(&self, messages: &[Message], stream: bool) -> Value {
        let messages: Vec<Value> = messages
            .iter()
            .map(|m| {
                let mut entry = json!({
                    "role": m.role.as_str(),
                    "content": m.content,
                });
                if let Some(name) = &m.name {
                    entry["name"] = json!(name);
                }
                entry
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if stream {
            body["stream"] = json!(true);
        }
        body
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response> {
        let api_key = require_api_key("openai", &self.api_key, API_KEY_ENV)?;
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;
        ensure_success("openai", response).await
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    #[instrument(skip(self, messages), fields(model = %self.model))]
    async fn chat(&self, messages: &[Message]) -> Result<String> {
        let body = self.build_request_body(messages, false);
        let payload: Value = self.send(&body).await?.json().await?;

        let message = payload["choices"]
            .get(0)
            .map(|choice| &choice["message"])
            .ok_or_else(|| {
                SwarmError::Provider("missing choices in openai response".to_string())
            })?;

        Ok(message["content"].as_str().unwrap_or_default().to_string())
    }

    fn stream(&self, messages: &[Message]) -> LlmStream {
        let client = self.clone();
        let body = self.build_request_body(messages, true);
        deferred(async move {
            let response = client.send(&body).await?;
            Ok(response_stream(response, SseParser::new()))
        })
    }

    fn clone_dyn(&self) -> DynLlmClient {
        Arc::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::LlmProviderKind;

    #[test]
    fn request_body_forwards_names_and_sampling_options() {
        let config = LlmConfig::new(LlmProviderKind::OpenAi, "gpt-4o")
            .with_api_key("sk-test")
            .with_temperature(0.3)
            .with_max_tokens(256);
        let client = OpenAiClient::new(&config);

        let body = client.build_request_body(
            &[Message::user("hi"), Message::assistant("hello", "Coder")],
            true,
        );
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["messages"][1]["name"], "Coder");
        assert!(body["messages"][0].get("name").is_none());
        assert_eq!(body["stream"], true);
    }
}
