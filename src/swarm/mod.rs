// 多 agent 编排：事件旁路和轮转执行循环

mod event;
mod orchestrator;

pub use event::{EventBus, EventHandler, SwarmEvent, SwarmEventKind, SwarmEventPayload};
pub use orchestrator::{
    create_swarm, resolve_agent_id, RunOptions, RunOutcome, StopReason, SwarmConfig,
    SwarmOptions, SwarmOrchestrator, DEFAULT_MAX_ITERATIONS, DEFAULT_START_AGENT,
};
