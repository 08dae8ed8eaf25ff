use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use super::config::{AgentConfig, AgentRole};
use super::directive::DirectiveSet;
use super::message::Message;
use super::response::AgentResponse;
use crate::error::{Result, SwarmError};
use crate::llm::{create_llm_client, DynLlmClient};
use crate::state::TaskContext;
use crate::tools::{validate_params, DynTool, ToolParams, ToolResult};

/// Agent 向观察者发布的通知
#[derive(Clone, Debug)]
pub enum AgentEvent {
    Start {
        agent_id: String,
        context: TaskContext,
    },
    ToolCall {
        agent_id: String,
        tool_call: crate::tools::ToolCall,
    },
    Response(AgentResponse),
}

pub type AgentObserver = Arc<dyn Fn(&AgentEvent) + Send + Sync>;

/// 绑定一个角色、一个系统提示词和一个 LLM 后端的执行者
///
/// 所有角色共用同一套处理流程，角色差异只体现在配置上。
pub struct Agent {
    id: String,
    name: String,
    role: AgentRole,
    client: DynLlmClient,
    system_prompt: String,
    tools: Vec<DynTool>,
    history: Mutex<Vec<Message>>,
    observers: RwLock<Vec<AgentObserver>>,
}

impl Agent {
    /// 通过 provider 工厂创建 LLM 客户端
    pub fn new(config: AgentConfig) -> Result<Self> {
        let client = create_llm_client(&config.llm)?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: AgentConfig, client: DynLlmClient) -> Self {
        Self {
            id: config.id,
            name: config.name,
            role: config.role,
            client,
            system_prompt: config.system_prompt,
            tools: config.tools,
            history: Mutex::new(Vec::new()),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &[DynTool] {
        &self.tools
    }

    pub fn client(&self) -> DynLlmClient {
        Arc::clone(&self.client)
    }

    /// 该 agent 自己产生过的回复；只记录，不参与请求构造
    pub fn history(&self) -> Vec<Message> {
        self.history.lock().clone()
    }

    pub fn subscribe(&self, observer: AgentObserver) {
        self.observers.write().push(observer);
    }

    fn emit(&self, event: AgentEvent) {
        let observers = self.observers.read().clone();
        for observer in observers {
            observer(&event);
        }
    }

    pub fn build_system_prompt(&self, context: &TaskContext) -> String {
        let mut prompt = self.system_prompt.clone();

        if !context.files.is_empty() {
            prompt.push_str("\n\n## Available Files:\n");
            for file in &context.files {
                prompt.push_str(&format!(
                    "\n### {}\n```{}\n{}\n```\n",
                    file.path,
                    file.language.as_deref().unwrap_or_default(),
                    file.content
                ));
            }
        }

        if !self.tools.is_empty() {
            prompt.push_str("\n\n## Available Tools:\n");
            for tool in &self.tools {
                prompt.push_str(&format!("\n- **{}**: {}\n", tool.name(), tool.description()));
            }
        }

        prompt
    }

    pub fn build_messages(&self, context: &TaskContext) -> Vec<Message> {
        let mut messages = Vec::with_capacity(context.messages.len() + 1);
        messages.push(Message::system(self.build_system_prompt(context)));
        messages.extend(context.messages.iter().cloned());
        messages
    }

    /// 执行一轮：调用 LLM、解析指令、执行工具、判定状态
    ///
    /// Provider 错误直接向上传播；工具错误转换为失败的 `ToolResult`。
    pub async fn process(&self, context: &TaskContext) -> Result<AgentResponse> {
        self.emit(AgentEvent::Start {
            agent_id: self.id.clone(),
            context: context.clone(),
        });

        let messages = self.build_messages(context);
        let content = self.client.chat(&messages).await?;
        debug!(agent = %self.id, chars = content.len(), "agent received reply");

        let directives = DirectiveSet::parse(&content);
        let mut tool_calls = directives.tool_calls.clone();
        for tool_call in tool_calls.iter_mut() {
            let Some(tool) = self.tools.iter().find(|t| t.name() == tool_call.tool_name) else {
                warn!(agent = %self.id, tool = %tool_call.tool_name, "tool not configured, skipping");
                continue;
            };
            tool_call.result = Some(Self::execute_tool(tool, &tool_call.parameters).await);
            self.emit(AgentEvent::ToolCall {
                agent_id: self.id.clone(),
                tool_call: tool_call.clone(),
            });
        }

        let response = AgentResponse {
            agent_id: self.id.clone(),
            content,
            tool_calls,
            next_agent: directives.handoff().map(str::to_string),
            status: directives.status(),
        };

        self.history
            .lock()
            .push(Message::assistant(response.content.clone(), self.name.clone()));
        self.emit(AgentEvent::Response(response.clone()));
        Ok(response)
    }

    async fn execute_tool(tool: &DynTool, params: &ToolParams) -> ToolResult {
        let outcome = match validate_params(tool.as_ref(), params) {
            Ok(()) => tool.execute(params).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(result) => result,
            Err(SwarmError::Tool { message, .. }) => ToolResult::failure(message),
            Err(err) => ToolResult::failure(err.to_string()),
        }
    }

    /// 清空私有历史，不影响配置和观察者
    pub fn reset(&self) {
        self.history.lock().clear();
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("tools", &self.tools.len())
            .finish()
    }
}
