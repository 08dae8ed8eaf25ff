use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use super::agent::Agent;
use super::builtin::RolePreset;
use super::config::AgentRole;
use crate::error::{Result, SwarmError};
use crate::llm::LlmConfig;
use crate::tools::DynTool;

/// 编排器配置中的一条 agent 声明
///
/// 角色保留原始字符串，未知角色在编排器构造时才报错。
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    pub role: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(skip)]
    pub tools: Vec<DynTool>,
}

impl AgentSpec {
    pub fn new<R: Into<String>>(role: R) -> Self {
        Self {
            role: role.into(),
            ..Self::default()
        }
    }

    pub fn with_id<I: Into<String>>(mut self, id: I) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_tools(mut self, tools: Vec<DynTool>) -> Self {
        self.tools = tools;
        self
    }
}

impl fmt::Debug for AgentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSpec")
            .field("role", &self.role)
            .field("id", &self.id)
            .field("llm", &self.llm)
            .field("tools", &self.tools.len())
            .finish()
    }
}

/// `(声明, 默认 LLM) -> Agent`
pub type AgentFactory = Arc<dyn Fn(&AgentSpec, &LlmConfig) -> Result<Agent> + Send + Sync>;

/// 角色到构造器的映射，默认注册五个内置角色
pub struct AgentFactoryRegistry {
    factories: HashMap<AgentRole, AgentFactory>,
}

impl Default for AgentFactoryRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for role in AgentRole::BUILTIN {
            registry.register_factory(role, preset_factory(role));
        }
        registry
    }
}

impl AgentFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register_factory(&mut self, role: AgentRole, factory: AgentFactory) {
        self.factories.insert(role, factory);
    }

    pub fn has_factory(&self, role: AgentRole) -> bool {
        self.factories.contains_key(&role)
    }

    pub fn build(&self, spec: &AgentSpec, default_llm: &LlmConfig) -> Result<Agent> {
        let role: AgentRole = spec.role.parse()?;
        let builder = self
            .factories
            .get(&role)
            .ok_or_else(|| SwarmError::unknown_role(&spec.role))?;
        builder(spec, default_llm)
    }
}

fn preset_factory(role: AgentRole) -> AgentFactory {
    Arc::new(move |spec: &AgentSpec, default_llm: &LlmConfig| {
        let preset = RolePreset::for_role(role).ok_or_else(|| SwarmError::unknown_role(role))?;
        let llm = spec.llm.clone().unwrap_or_else(|| default_llm.clone());
        if !preset.accepts_tools() && !spec.tools.is_empty() {
            warn!(role = %role, count = spec.tools.len(), "role does not use tools; ignoring them");
        }
        Agent::new(preset.config(llm, spec.id.as_deref(), spec.tools.clone()))
    })
}
