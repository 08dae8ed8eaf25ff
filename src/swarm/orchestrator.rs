use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::event::{EventBus, SwarmEvent, SwarmEventKind, SwarmEventPayload};
use crate::agent::{
    Agent, AgentEvent, AgentFactoryRegistry, AgentResponse, AgentRole, AgentSpec, Message,
    ResponseStatus,
};
use crate::config::EnvConfig;
use crate::error::{Result, SwarmError};
use crate::llm::LlmConfig;
use crate::state::{FileContext, TaskContext};
use crate::utils::ConfigValidator;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_START_AGENT: &str = "planner-1";

/// 编排器的静态配置
#[derive(Clone, Debug)]
pub struct SwarmConfig {
    /// 为空时创建五个内置角色
    pub agents: Vec<AgentSpec>,
    pub default_llm: LlmConfig,
    /// 0 视为默认值 10
    pub max_iterations: usize,
    pub debug: bool,
}

impl SwarmConfig {
    pub fn new(default_llm: LlmConfig) -> Self {
        Self {
            agents: Vec::new(),
            default_llm,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            debug: false,
        }
    }

    pub fn with_agents(mut self, agents: Vec<AgentSpec>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn effective_max_iterations(&self) -> usize {
        if self.max_iterations == 0 {
            DEFAULT_MAX_ITERATIONS
        } else {
            self.max_iterations
        }
    }
}

/// `create_swarm` 的可选覆盖项
#[derive(Clone, Debug, Default)]
pub struct SwarmOptions {
    pub default_llm: Option<LlmConfig>,
    pub max_iterations: Option<usize>,
    pub debug: Option<bool>,
    pub agents: Vec<AgentSpec>,
}

/// 单次 `run` 的参数
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub start_agent: Option<String>,
    pub files: Vec<FileContext>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_at<S: Into<String>>(mut self, agent_id: S) -> Self {
        self.start_agent = Some(agent_id.into());
        self
    }

    pub fn with_files(mut self, files: Vec<FileContext>) -> Self {
        self.files = files;
        self
    }
}

/// 运行结束的原因
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    AgentError,
    AgentNotFound(String),
    MaxIterations,
}

#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub responses: Vec<AgentResponse>,
    pub stop: StopReason,
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        self.stop == StopReason::Completed
    }

    pub fn last(&self) -> Option<&AgentResponse> {
        self.responses.last()
    }
}

/// 把 handoff 目标映射到 agent id：内置角色名映射为 `<role>-1`，其余原样作为 id
pub fn resolve_agent_id(target: &str) -> String {
    match target.parse::<AgentRole>() {
        Ok(role) if AgentRole::BUILTIN.contains(&role) => role.default_id(),
        _ => target.to_string(),
    }
}

/// 多 agent 轮转执行器
///
/// 同一时间只有一个 agent 在处理；`TaskContext` 由编排器独占并只追加消息。
pub struct SwarmOrchestrator {
    agents: HashMap<String, Arc<Agent>>,
    config: SwarmConfig,
    context: Option<TaskContext>,
    events: Arc<EventBus>,
}

impl SwarmOrchestrator {
    pub fn new(config: SwarmConfig) -> Result<Self> {
        Self::with_factories(config, &AgentFactoryRegistry::default())
    }

    /// 使用自定义角色工厂构造，可为 `researcher`/`custom` 注册构造器
    pub fn with_factories(config: SwarmConfig, factories: &AgentFactoryRegistry) -> Result<Self> {
        ConfigValidator::validate_swarm(&config)?;

        let debug = config.debug || EnvConfig::is_debug_mode();
        let mut orchestrator = Self {
            agents: HashMap::new(),
            events: Arc::new(EventBus::new(debug)),
            context: None,
            config,
        };

        let specs = if orchestrator.config.agents.is_empty() {
            AgentRole::BUILTIN
                .iter()
                .map(|role| AgentSpec::new(role.as_str()))
                .collect()
        } else {
            orchestrator.config.agents.clone()
        };

        for spec in &specs {
            let agent = factories.build(spec, &orchestrator.config.default_llm)?;
            orchestrator.add_agent(agent);
        }

        info!(agents = orchestrator.agents.len(), "swarm initialised");
        Ok(orchestrator)
    }

    /// 注册 agent，并把它的通知转发为编排器事件；同 id 的旧 agent 被替换
    pub fn add_agent(&mut self, agent: Agent) -> Arc<Agent> {
        let agent_id = agent.id().to_string();
        let bus = Arc::clone(&self.events);
        let source = agent_id.clone();
        agent.subscribe(Arc::new(move |event: &AgentEvent| bus.forward(&source, event)));

        let agent = Arc::new(agent);
        if self.agents.insert(agent_id.clone(), Arc::clone(&agent)).is_some() {
            warn!(agent = %agent_id, "replacing existing agent");
        }
        agent
    }

    pub fn get_agent(&self, id: &str) -> Option<Arc<Agent>> {
        self.agents.get(id).cloned()
    }

    pub fn agent_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.agents.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// 当前存活的任务上下文
    pub fn context(&self) -> Option<&TaskContext> {
        self.context.as_ref()
    }

    pub fn on<F>(&self, kind: SwarmEventKind, handler: F)
    where
        F: Fn(&SwarmEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, Arc::new(handler));
    }

    pub fn subscribe(&self) -> tokio::sync::mpsc::UnboundedReceiver<SwarmEvent> {
        self.events.subscribe()
    }

    /// 从一个新的 `TaskContext` 开始执行，直到完成、出错、找不到 agent 或用完轮数
    ///
    /// Provider 错误直接返回 `Err`，此前累积的上下文保留在编排器中。
    #[instrument(skip_all, fields(max_iterations = self.config.effective_max_iterations()))]
    pub async fn run(&mut self, task: &str, options: RunOptions) -> Result<RunOutcome> {
        let max_iterations = self.config.effective_max_iterations();
        let context = self.context.insert(TaskContext::new(task, options.files));
        let mut current = options
            .start_agent
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_START_AGENT.to_string());

        info!(task_id = %context.task_id, start = %current, "swarm run started");

        let mut responses: Vec<AgentResponse> = Vec::new();
        let mut iterations = 0;
        let mut stop = None;

        while iterations < max_iterations {
            let Some(agent) = self.agents.get(&current).cloned() else {
                self.events.emit(
                    SwarmEventKind::Error,
                    &current,
                    SwarmEventPayload::error(format!("Agent not found: {}", current)),
                );
                stop = Some(StopReason::AgentNotFound(current.clone()));
                break;
            };

            let response = agent.process(context).await?;
            debug!(
                iteration = iterations,
                agent = %current,
                status = ?response.status,
                "agent turn finished"
            );
            context.push_message(Message::assistant(response.content.clone(), agent.name()));
            responses.push(response.clone());

            match response.status {
                ResponseStatus::Complete => {
                    self.events.emit(
                        SwarmEventKind::Complete,
                        &current,
                        SwarmEventPayload::Complete {
                            responses: responses.clone(),
                        },
                    );
                    stop = Some(StopReason::Completed);
                    break;
                }
                ResponseStatus::Handoff => {
                    if let Some(next) = response.next_agent.as_deref() {
                        self.events.emit(
                            SwarmEventKind::Handoff,
                            &current,
                            SwarmEventPayload::Handoff {
                                next_agent: next.to_string(),
                            },
                        );
                        current = resolve_agent_id(next);
                    }
                }
                ResponseStatus::Error => {
                    self.events.emit(
                        SwarmEventKind::Error,
                        &current,
                        SwarmEventPayload::error_response(response),
                    );
                    stop = Some(StopReason::AgentError);
                    break;
                }
                // 不切换 agent，下一轮由同一个 agent 继续
                ResponseStatus::Continue => {}
            }

            iterations += 1;
        }

        let stop = match stop {
            Some(stop) => stop,
            None => {
                self.events.emit(
                    SwarmEventKind::Error,
                    &current,
                    SwarmEventPayload::error("Max iterations reached"),
                );
                StopReason::MaxIterations
            }
        };

        info!(turns = responses.len(), stop = ?stop, "swarm run finished");
        Ok(RunOutcome { responses, stop })
    }

    /// 在当前上下文上追加一轮对话
    ///
    /// 没有存活上下文时等价于 `run`，返回最后一条回复；
    /// 否则由最近一次回复的 agent 处理一轮，不做 handoff/完成判定。
    pub async fn chat(&mut self, message: &str) -> Result<AgentResponse> {
        match self.context.as_mut() {
            Some(context) => {
                context.push_message(Message::user(message));
                let agent_id = context
                    .last_assistant_name()
                    .map(|name| resolve_agent_id(&name.to_lowercase()))
                    .unwrap_or_else(|| DEFAULT_START_AGENT.to_string());

                let agent = self
                    .agents
                    .get(&agent_id)
                    .cloned()
                    .ok_or_else(|| SwarmError::AgentNotFound(agent_id.clone()))?;

                let response = agent.process(context).await?;
                context.push_message(Message::assistant(response.content.clone(), agent.name()));
                Ok(response)
            }
            None => {
                let outcome = self.run(message, RunOptions::default()).await?;
                outcome.responses.into_iter().last().ok_or(SwarmError::NoResponse)
            }
        }
    }

    /// 丢弃当前上下文并清空每个 agent 的私有历史
    pub fn reset(&mut self) {
        self.context = None;
        for agent in self.agents.values() {
            agent.reset();
        }
    }
}

impl fmt::Debug for SwarmOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwarmOrchestrator")
            .field("agents", &self.agent_ids())
            .field("config", &self.config)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

/// 以默认 LLM 创建编排器；未声明 agent 时使用五个内置角色
pub fn create_swarm(llm: LlmConfig, options: SwarmOptions) -> Result<SwarmOrchestrator> {
    let mut config = SwarmConfig::new(options.default_llm.unwrap_or(llm))
        .with_agents(options.agents)
        .with_debug(options.debug.unwrap_or(false));
    if let Some(max_iterations) = options.max_iterations {
        config = config.with_max_iterations(max_iterations);
    }
    SwarmOrchestrator::new(config)
}
