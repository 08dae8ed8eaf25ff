use std::path::Path;

use serde::Deserialize;

use crate::agent::AgentSpec;
use crate::error::Result;
use crate::llm::LlmConfig;
use crate::swarm::SwarmConfig;
use crate::tools::ToolRegistry;

/// JSON 格式的 swarm 描述文件
///
/// ```json
/// {
///   "llm": { "provider": "mock", "model": "mock-v1" },
///   "maxIterations": 8,
///   "agents": [
///     { "role": "planner" },
///     { "role": "coder", "tools": ["read_file", "write_file"] }
///   ]
/// }
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmFile {
    pub llm: LlmConfig,
    #[serde(default)]
    pub max_iterations: Option<usize>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub agents: Vec<AgentEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEntry {
    pub role: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    /// 内置工具名
    #[serde(default)]
    pub tools: Vec<String>,
}

impl SwarmFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    /// 按名称解析工具，生成编排器配置
    pub fn into_config(self, tools: &ToolRegistry) -> Result<SwarmConfig> {
        let agents = self
            .agents
            .into_iter()
            .map(|entry| {
                let mut spec = AgentSpec::new(entry.role).with_tools(tools.resolve(&entry.tools)?);
                spec.id = entry.id;
                spec.llm = entry.llm;
                Ok(spec)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut config = SwarmConfig::new(self.llm).with_agents(agents).with_debug(self.debug);
        if let Some(max_iterations) = self.max_iterations {
            config = config.with_max_iterations(max_iterations);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProviderKind;

    const SAMPLE: &str = r#"{
        "llm": { "provider": "mock", "model": "mock-v1", "delayMs": 0 },
        "maxIterations": 4,
        "agents": [
            { "role": "planner" },
            { "role": "coder", "id": "coder-fast", "tools": ["read_file"] }
        ]
    }"#;

    #[test]
    fn parses_sample_file() {
        let file = SwarmFile::from_json(SAMPLE).unwrap();
        assert_eq!(file.llm.provider, LlmProviderKind::Mock);
        assert_eq!(file.max_iterations, Some(4));
        assert_eq!(file.agents.len(), 2);
        assert_eq!(file.agents[1].tools, vec!["read_file".to_string()]);
    }

    #[test]
    fn resolves_tools_into_specs() {
        let file = SwarmFile::from_json(SAMPLE).unwrap();
        let config = file.into_config(&ToolRegistry::with_builtin()).unwrap();
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.agents[1].id.as_deref(), Some("coder-fast"));
        assert_eq!(config.agents[1].tools.len(), 1);
    }

    #[test]
    fn unknown_tool_name_fails() {
        let file = SwarmFile::from_json(
            r#"{ "llm": { "provider": "mock", "model": "m" },
                 "agents": [{ "role": "coder", "tools": ["teleport"] }] }"#,
        )
        .unwrap();
        assert!(file.into_config(&ToolRegistry::with_builtin()).is_err());
    }

    #[test]
    fn unknown_provider_fails_to_parse() {
        let err = SwarmFile::from_json(r#"{ "llm": { "provider": "skynet", "model": "m" } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("Unknown LLM provider"));
    }
}
