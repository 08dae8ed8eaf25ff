use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwarmError};
use crate::llm::LlmConfig;
use crate::tools::DynTool;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AgentRole {
    Planner,
    Coder,
    Reviewer,
    Tester,
    Debugger,
    Researcher,
    Custom,
}

impl AgentRole {
    pub const BUILTIN: [AgentRole; 5] = [
        AgentRole::Planner,
        AgentRole::Coder,
        AgentRole::Reviewer,
        AgentRole::Tester,
        AgentRole::Debugger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Planner => "planner",
            AgentRole::Coder => "coder",
            AgentRole::Reviewer => "reviewer",
            AgentRole::Tester => "tester",
            AgentRole::Debugger => "debugger",
            AgentRole::Researcher => "researcher",
            AgentRole::Custom => "custom",
        }
    }

    /// 内置角色的默认 agent id，如 `planner-1`
    pub fn default_id(&self) -> String {
        format!("{}-1", self.as_str())
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "planner" => Ok(AgentRole::Planner),
            "coder" => Ok(AgentRole::Coder),
            "reviewer" => Ok(AgentRole::Reviewer),
            "tester" => Ok(AgentRole::Tester),
            "debugger" => Ok(AgentRole::Debugger),
            "researcher" => Ok(AgentRole::Researcher),
            "custom" => Ok(AgentRole::Custom),
            other => Err(SwarmError::unknown_role(other)),
        }
    }
}

impl TryFrom<String> for AgentRole {
    type Error = SwarmError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AgentRole> for String {
    fn from(role: AgentRole) -> Self {
        role.as_str().to_string()
    }
}

/// 构造 Agent 的不可变配置
#[derive(Clone)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    pub role: AgentRole,
    pub llm: LlmConfig,
    pub system_prompt: String,
    pub tools: Vec<DynTool>,
}

impl AgentConfig {
    pub fn new<I, N, P>(id: I, name: N, role: AgentRole, llm: LlmConfig, system_prompt: P) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        P: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            llm,
            system_prompt: system_prompt.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<DynTool>) -> Self {
        self.tools = tools;
        self
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("llm", &self.llm)
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
