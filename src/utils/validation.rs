use std::collections::HashSet;

use crate::agent::{AgentRole, AgentSpec};
use crate::error::{Result, SwarmError};
use crate::llm::{LlmConfig, LlmProviderKind};
use crate::swarm::SwarmConfig;

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证 URL 格式
    pub fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(SwarmError::Configuration("URL must not be empty".into()));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SwarmError::Configuration(format!(
                "URL must start with http:// or https://, got '{}'",
                url
            )));
        }

        Ok(())
    }

    /// 验证模型名称
    pub fn validate_model_name(model: &str) -> Result<()> {
        if model.trim().is_empty() {
            return Err(SwarmError::Configuration("model name must not be empty".into()));
        }

        let lower = model.to_lowercase();
        if lower.contains("gpt") && !lower.contains("gpt-") {
            tracing::warn!(
                model = %model,
                "model name looks unusual, GPT models are usually named like 'gpt-4-turbo'"
            );
        }

        Ok(())
    }

    /// 验证温度参数
    pub fn validate_temperature(temperature: f32) -> Result<()> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(SwarmError::Configuration(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }
        Ok(())
    }

    /// 验证 agent id：非空，只含字母、数字、下划线和短横线
    pub fn validate_agent_id(id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(SwarmError::Configuration("agent id must not be empty".into()));
        }

        if !id.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(SwarmError::Configuration(format!(
                "agent id '{}' may only contain letters, digits, '_' and '-'",
                id
            )));
        }

        Ok(())
    }

    pub fn validate_llm(config: &LlmConfig) -> Result<()> {
        Self::validate_model_name(&config.model)?;
        if let Some(url) = &config.base_url {
            Self::validate_url(url)?;
        }
        if let Some(temperature) = config.temperature {
            Self::validate_temperature(temperature)?;
        }
        if config.max_tokens == Some(0) {
            return Err(SwarmError::Configuration("maxTokens must be positive".into()));
        }
        if config.provider != LlmProviderKind::Mock && config.delay_ms.is_some() {
            tracing::warn!(provider = %config.provider, "delayMs is only used by the mock provider");
        }
        Ok(())
    }

    /// 校验 LLM 配置和 agent 声明；角色本身留给工厂判定
    pub fn validate_swarm(config: &SwarmConfig) -> Result<()> {
        Self::validate_llm(&config.default_llm)?;

        let mut seen = HashSet::new();
        for spec in &config.agents {
            if let Some(llm) = &spec.llm {
                Self::validate_llm(llm)?;
            }
            let Some(id) = Self::effective_id(spec) else {
                continue;
            };
            Self::validate_agent_id(&id)?;
            if !seen.insert(id.clone()) {
                return Err(SwarmError::Configuration(format!(
                    "duplicate agent id '{}'",
                    id
                )));
            }
        }
        Ok(())
    }

    fn effective_id(spec: &AgentSpec) -> Option<String> {
        match &spec.id {
            Some(id) if !id.is_empty() => Some(id.clone()),
            _ => spec
                .role
                .parse::<AgentRole>()
                .ok()
                .map(|role| role.default_id()),
        }
    }
}
