//! HTTP 客户端实现模块
//!
//! 每个网络后端包装一家厂商的请求/响应格式：
//! - `AnthropicClient`: Messages API，SSE 流式
//! - `OpenAiClient`: Chat Completions API，SSE 流式
//! - `OllamaClient`: 本地 `/api/chat`，逐行 JSON 流式
//!
//! 构造时不发起任何网络请求，缺失的 API Key 在首次调用时报错。

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod stream;

use std::time::Duration;

use serde_json::Value;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use stream::{ChunkParser, LlmStreamChunk, NdjsonParser, SseParser};

use crate::error::{Result, SwarmError};

/// 复用连接、设置超时的 HTTP 客户端
pub(crate) fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(300))
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// 非 2xx 响应转换为 `SwarmError::Provider`，尽量保留厂商返回的错误信息
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|payload| {
            payload["error"]["message"]
                .as_str()
                .or_else(|| payload["error"].as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| truncate(&body, 500));

    Err(SwarmError::Provider(format!(
        "{} request failed with status {}: {}",
        provider, status, message
    )))
}

pub(crate) fn require_api_key<'a>(
    provider: &str,
    api_key: &'a Option<String>,
    env_hint: &str,
) -> Result<&'a str> {
    api_key.as_deref().ok_or_else(|| {
        SwarmError::Provider(format!(
            "missing API key for {}; set `apiKey` or the {} environment variable",
            provider, env_hint
        ))
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...(truncated)", head)
}
