use std::fmt;
use std::pin::Pin;
use std::str::FromStr;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwarmError};

/// 流式输出：有限、不可重启的文本分片序列
pub type LlmStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// LLM 后端类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LlmProviderKind {
    Anthropic,
    OpenAi,
    Ollama,
    Mock,
    Custom,
}

impl LlmProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProviderKind::Anthropic => "anthropic",
            LlmProviderKind::OpenAi => "openai",
            LlmProviderKind::Ollama => "ollama",
            LlmProviderKind::Mock => "mock",
            LlmProviderKind::Custom => "custom",
        }
    }

    /// 未指定模型时各后端使用的默认模型
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProviderKind::Anthropic => "claude-sonnet-4-20250514",
            LlmProviderKind::OpenAi => "gpt-4-turbo",
            LlmProviderKind::Ollama => "llama3.2",
            LlmProviderKind::Mock => "mock-v1",
            LlmProviderKind::Custom => "custom",
        }
    }
}

impl fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProviderKind {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "anthropic" => Ok(LlmProviderKind::Anthropic),
            "openai" => Ok(LlmProviderKind::OpenAi),
            "ollama" => Ok(LlmProviderKind::Ollama),
            "mock" => Ok(LlmProviderKind::Mock),
            "custom" => Ok(LlmProviderKind::Custom),
            other => Err(SwarmError::unknown_provider(other)),
        }
    }
}

impl TryFrom<String> for LlmProviderKind {
    type Error = SwarmError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LlmProviderKind> for String {
    fn from(kind: LlmProviderKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Provider 工厂消费的 LLM 配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// 仅 mock 使用：模拟网络延迟（毫秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

impl LlmConfig {
    pub fn new<M: Into<String>>(provider: LlmProviderKind, model: M) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: None,
            base_url: None,
            temperature: None,
            max_tokens: None,
            delay_ms: None,
        }
    }

    pub fn mock() -> Self {
        Self::new(LlmProviderKind::Mock, "mock-v1")
    }

    pub fn with_api_key<T: Into<String>>(mut self, api_key: T) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url<T: Into<String>>(mut self, base_url: T) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}
