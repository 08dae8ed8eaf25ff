use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::instrument;

use super::stream::{deferred, response_stream, SseParser};
use super::{build_http_client, ensure_success, require_api_key};
use crate::agent::{Message, MessageRole};
use crate::config::EnvConfig;
use crate::error::{Result, SwarmError};
use crate::llm::client::{DynLlmClient, LlmClient};
use crate::llm::types::{LlmConfig, LlmProviderKind, LlmStream};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Anthropic Messages API 客户端
#[derive(Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl AnthropicClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: build_http_client(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: EnvConfig::resolve_api_key(config.api_key.as_deref(), Some(API_KEY_ENV)),
            model: non_empty(&config.model)
                .unwrap_or(LlmProviderKind::Anthropic.default_model())
                .to_string(),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: config.temperature,
        }
    }

    /// system 消息单独放入 `system` 字段，其余消息合并相邻同角色后发送
    pub fn build_request_body(&self, messages: &[Message], stream: bool) -> Value {
        let system = messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.clone());

        let mut body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": coalesce_turns(messages),
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }
        if stream {
            body["stream"] = json!(true);
        }
        body
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response> {
        let api_key = require_api_key("anthropic", &self.api_key, API_KEY_ENV)?;
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await?;
        ensure_success("anthropic", response).await
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    #[instrument(skip(self, messages), fields(model = %self.model))]
    async fn chat(&self, messages: &[Message]) -> Result<String> {
        let body = self.build_request_body(messages, false);
        let payload: Value = self.send(&body).await?.json().await?;

        let content = payload["content"].as_array().ok_or_else(|| {
            SwarmError::Provider("missing content array in anthropic response".to_string())
        })?;

        Ok(content
            .iter()
            .find(|block| block["type"] == "text")
            .and_then(|block| block["text"].as_str())
            .unwrap_or_default()
            .to_string())
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

fn coalesce_turns(messages: &[Message]) -> Vec<Value> {
    let mut turns: Vec<(&'static str, String)> = Vec::new();
    for message in messages.iter().filter(|m| m.role != MessageRole::System) {
        let role = message.role.as_str();
        match turns.last_mut() {
            Some((last_role, content)) if *last_role == role => {
                content.push_str("\n\n");
                content.push_str(&message.content);
            }
            _ => turns.push((role, message.content.clone())),
        }
    }
    turns
        .into_iter()
        .map(|(role, content)| json!({ "role": role, "content": content }))
        .collect()
}

fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
