use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;

use crate::agent::{AgentEvent, AgentResponse};
use crate::state::TaskContext;
use crate::tools::ToolCall;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwarmEventKind {
    AgentStart,
    AgentResponse,
    ToolCall,
    Handoff,
    Complete,
    Error,
}

impl SwarmEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwarmEventKind::AgentStart => "agent_start",
            SwarmEventKind::AgentResponse => "agent_response",
            SwarmEventKind::ToolCall => "tool_call",
            SwarmEventKind::Handoff => "handoff",
            SwarmEventKind::Complete => "complete",
            SwarmEventKind::Error => "error",
        }
    }
}

impl fmt::Display for SwarmEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum SwarmEventPayload {
    AgentStart {
        context: TaskContext,
    },
    AgentResponse(AgentResponse),
    ToolCall(ToolCall),
    #[serde(rename_all = "camelCase")]
    Handoff {
        next_agent: String,
    },
    Complete {
        responses: Vec<AgentResponse>,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<AgentResponse>,
    },
}

impl SwarmEventPayload {
    pub fn error<T: Into<String>>(message: T) -> Self {
        SwarmEventPayload::Error {
            error: Some(message.into()),
            response: None,
        }
    }

    pub fn error_response(response: AgentResponse) -> Self {
        SwarmEventPayload::Error {
            error: None,
            response: Some(response),
        }
    }
}

/// 编排器对外发布的事件，带 agent id 和服务端时间戳
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmEvent {
    #[serde(rename = "type")]
    pub kind: SwarmEventKind,
    pub agent_id: String,
    #[serde(rename = "data")]
    pub payload: SwarmEventPayload,
    pub timestamp: DateTime<Utc>,
}

impl SwarmEvent {
    /// `error` 事件的错误文本
    pub fn error_message(&self) -> Option<&str> {
        match &self.payload {
            SwarmEventPayload::Error { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

pub type EventHandler = Arc<dyn Fn(&SwarmEvent) + Send + Sync>;

/// 事件旁路：按类型注册的回调和 channel 订阅者
///
/// 核心流程只写不读。
pub struct EventBus {
    handlers: RwLock<HashMap<SwarmEventKind, Vec<EventHandler>>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SwarmEvent>>>,
    debug: bool,
}

impl EventBus {
    pub fn new(debug: bool) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            subscribers: Mutex::new(Vec::new()),
            debug,
        }
    }

    pub fn on(&self, kind: SwarmEventKind, handler: EventHandler) {
        self.handlers.write().entry(kind).or_default().push(handler);
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SwarmEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn emit(&self, kind: SwarmEventKind, agent_id: &str, payload: SwarmEventPayload) {
        let event = SwarmEvent {
            kind,
            agent_id: agent_id.to_string(),
            payload,
            timestamp: Utc::now(),
        };

        if self.debug {
            info!(kind = %event.kind, agent = %event.agent_id, payload = ?event.payload, "swarm event");
        }

        let handlers = self.handlers.read().get(&kind).cloned().unwrap_or_default();
        for handler in handlers {
            handler(&event);
        }

        // 接收端已关闭的订阅者直接移除
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// 把 agent 级通知转发为编排器事件
    pub fn forward(&self, agent_id: &str, event: &AgentEvent) {
        match event {
            AgentEvent::Start { context, .. } => self.emit(
                SwarmEventKind::AgentStart,
                agent_id,
                SwarmEventPayload::AgentStart {
                    context: context.clone(),
                },
            ),
            AgentEvent::ToolCall { tool_call, .. } => self.emit(
                SwarmEventKind::ToolCall,
                agent_id,
                SwarmEventPayload::ToolCall(tool_call.clone()),
            ),
            AgentEvent::Response(response) => self.emit(
                SwarmEventKind::AgentResponse,
                agent_id,
                SwarmEventPayload::AgentResponse(response.clone()),
            ),
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("kinds", &self.handlers.read().len())
            .field("subscribers", &self.subscribers.lock().len())
            .field("debug", &self.debug)
            .finish()
    }
}
