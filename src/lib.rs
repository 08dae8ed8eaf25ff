pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod state;
pub mod swarm;
pub mod tools;
pub mod utils;

pub use agent::{
    Agent, AgentConfig, AgentEvent, AgentFactory, AgentFactoryRegistry, AgentResponse, AgentRole,
    AgentSpec, DirectiveSet, Message, MessageRole, ResponseStatus, RolePreset,
};
pub use config::{EnvConfig, SwarmFile};
pub use error::{Result, SwarmError};
pub use llm::{
    create_llm_client, DynLlmClient, LlmClient, LlmClientFactory, LlmConfig, LlmProviderKind,
    LlmStream, MockLlmClient,
};
pub use state::{FileContext, TaskContext};
pub use swarm::{
    create_swarm, resolve_agent_id, RunOptions, RunOutcome, StopReason, SwarmConfig, SwarmEvent,
    SwarmEventKind, SwarmEventPayload, SwarmOptions, SwarmOrchestrator,
};
pub use tools::{
    default_tools, DynTool, FnTool, Tool, ToolCall, ToolParameter, ToolParams, ToolRegistry,
    ToolResult,
};
pub use utils::{logging, validation};
