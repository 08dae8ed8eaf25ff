//! 五个内置角色预设：固定名称、默认 id 和系统提示词

mod prompts;

pub use prompts::{
    CODER_SYSTEM_PROMPT, DEBUGGER_SYSTEM_PROMPT, PLANNER_SYSTEM_PROMPT, REVIEWER_SYSTEM_PROMPT,
    TESTER_SYSTEM_PROMPT,
};

use crate::agent::config::{AgentConfig, AgentRole};
use crate::llm::LlmConfig;
use crate::tools::DynTool;

/// 内置角色的预设，`Researcher`/`Custom` 没有预设
#[derive(Clone, Copy, Debug)]
pub struct RolePreset {
    pub role: AgentRole,
    pub name: &'static str,
    pub system_prompt: &'static str,
}

impl RolePreset {
    pub fn for_role(role: AgentRole) -> Option<Self> {
        let (name, system_prompt) = match role {
            AgentRole::Planner => ("Planner", PLANNER_SYSTEM_PROMPT),
            AgentRole::Coder => ("Coder", CODER_SYSTEM_PROMPT),
            AgentRole::Reviewer => ("Reviewer", REVIEWER_SYSTEM_PROMPT),
            AgentRole::Tester => ("Tester", TESTER_SYSTEM_PROMPT),
            AgentRole::Debugger => ("Debugger", DEBUGGER_SYSTEM_PROMPT),
            AgentRole::Researcher | AgentRole::Custom => return None,
        };
        Some(Self {
            role,
            name,
            system_prompt,
        })
    }

    /// Planner 和 Reviewer 只做分析，不挂载工具
    pub fn accepts_tools(&self) -> bool {
        !matches!(self.role, AgentRole::Planner | AgentRole::Reviewer)
    }

    /// 生成配置；`id` 为空时使用 `<role>-1`，不接受工具的角色忽略 `tools`
    pub fn config(&self, llm: LlmConfig, id: Option<&str>, tools: Vec<DynTool>) -> AgentConfig {
        let id = id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.role.default_id());
        let tools = if self.accepts_tools() { tools } else { Vec::new() };
        AgentConfig::new(id, self.name, self.role, llm, self.system_prompt).with_tools(tools)
    }
}

pub fn planner_config(llm: LlmConfig) -> AgentConfig {
    preset_config(AgentRole::Planner, llm)
}

pub fn coder_config(llm: LlmConfig) -> AgentConfig {
    preset_config(AgentRole::Coder, llm)
}

pub fn reviewer_config(llm: LlmConfig) -> AgentConfig {
    preset_config(AgentRole::Reviewer, llm)
}

pub fn tester_config(llm: LlmConfig) -> AgentConfig {
    preset_config(AgentRole::Tester, llm)
}

pub fn debugger_config(llm: LlmConfig) -> AgentConfig {
    preset_config(AgentRole::Debugger, llm)
}

fn preset_config(role: AgentRole, llm: LlmConfig) -> AgentConfig {
    match RolePreset::for_role(role) {
        Some(preset) => preset.config(llm, None, Vec::new()),
        None => AgentConfig::new(role.default_id(), role.as_str(), role, llm, ""),
    }
}
