use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::instrument;

use super::stream::{deferred, response_stream, NdjsonParser};
use super::{build_http_client, ensure_success};
use crate::agent::Message;
use crate::error::{Result, SwarmError};
use crate::llm::client::{DynLlmClient, LlmClient};
use crate::llm::types::{LlmConfig, LlmProviderKind, LlmStream};

const DEFAULT_HOST: &str = "http://localhost:11434";

/// 本地 Ollama 服务，无需 API Key
#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    host: String,
    model: String,
    temperature: Option<f32>,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Self {
        let model = if config.model.trim().is_empty() {
            LlmProviderKind::Ollama.default_model().to_string()
        } else {
            config.model.clone()
        };
        Self {
            client: build_http_client(),
            host: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            model,
            temperature: config.temperature,
        }
    }

    pub fn build_request_body(&self, messages: &[Message], stream: bool) -> Value {
        let messages: Vec<Value> = messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "stream": stream,
        });
        if let Some(temperature) = self.temperature {
            body["options"] = json!({ "temperature": temperature });
        }
        body
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response> {
        let url = format!("{}/api/chat", self.host.trim_end_matches('/'));
        let response = self.client.post(url).json(body).send().await?;
        ensure_success("ollama", response).await
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    #[instrument(skip(self, messages), fields(model = %self.model))]
    async fn chat(&self, messages: &[Message]) -> Result<String> {
        let body = self.build_request_body(messages, false);
        let payload: Value = self.send(&body).await?.json().await?;

        payload["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SwarmError::Provider("missing message in ollama response".to_string()))
    }

    fn stream(&self, messages: &[Message]) -> LlmStream {
        let client = self.clone();
        let body = self.build_request_body(messages, true);
        deferred(async move {
            let response = client.send(&body).await?;
            Ok(response_stream(response, NdjsonParser::new()))
        })
    }

    fn clone_dyn(&self) -> DynLlmClient {
        Arc::new(self.clone())
    }
}
