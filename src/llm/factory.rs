use std::sync::Arc;

use super::client::DynLlmClient;
use super::mock::MockLlmClient;
use super::types::{LlmConfig, LlmProviderKind};
use crate::error::{Result, SwarmError};

#[cfg(feature = "http-client")]
use super::http::{AnthropicClient, OllamaClient, OpenAiClient};

/// LLM 客户端工厂
///
/// 根据 `LlmConfig.provider` 选择后端；构造过程不发起网络请求。
pub struct LlmClientFactory;

impl LlmClientFactory {
    pub fn create_client(config: &LlmConfig) -> Result<DynLlmClient> {
        match config.provider {
            LlmProviderKind::Mock => Ok(Arc::new(MockLlmClient::new(config))),
            LlmProviderKind::Custom => Err(SwarmError::Configuration(
                "the `custom` provider has no built-in client; construct the agent with `Agent::with_client`"
                    .to_string(),
            )),
            #[cfg(feature = "http-client")]
            LlmProviderKind::Anthropic => Ok(Arc::new(AnthropicClient::new(config))),
            #[cfg(feature = "http-client")]
            LlmProviderKind::OpenAi => Ok(Arc::new(OpenAiClient::new(config))),
            #[cfg(feature = "http-client")]
            LlmProviderKind::Ollama => Ok(Arc::new(OllamaClient::new(config))),
            #[cfg(not(feature = "http-client"))]
            other => Err(SwarmError::Configuration(format!(
                "provider `{}` requires the `http-client` feature",
                other
            ))),
        }
    }

    /// 从字符串标签创建，未知标签返回 `Unknown LLM provider`
    pub fn create_from_tag(tag: &str, model: &str) -> Result<DynLlmClient> {
        let provider: LlmProviderKind = tag.parse()?;
        Self::create_client(&LlmConfig::new(provider, model))
    }
}

pub fn create_llm_client(config: &LlmConfig) -> Result<DynLlmClient> {
    LlmClientFactory::create_client(config)
}
