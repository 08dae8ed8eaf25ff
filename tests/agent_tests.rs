use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use agentswarm::llm::LlmClient;
use agentswarm::tools::ParameterType;
use agentswarm::{
    Agent, AgentConfig, AgentEvent, AgentRole, DynLlmClient, DynTool, FileContext, FnTool,
    LlmConfig, Message, MessageRole, ResponseStatus, SwarmError, TaskContext, ToolParameter,
    ToolResult,
};

/// 总是返回同一段文本，并记录收到的消息
#[derive(Clone)]
struct FixedClient {
    reply: String,
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl FixedClient {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl LlmClient for FixedClient {
    async fn chat(&self, messages: &[Message]) -> agentswarm::Result<String> {
        self.seen.lock().push(messages.to_vec());
        Ok(self.reply.clone())
    }

    fn clone_dyn(&self) -> DynLlmClient {
        Arc::new(self.clone())
    }
}

fn read_file_stub(output: &'static str) -> DynTool {
    Arc::new(
        FnTool::new("read_file", "Read a file", move |_params| async move {
            Ok(ToolResult::ok(output))
        })
        .with_parameter("path", ToolParameter::string("File path").required()),
    )
}

fn agent_with(reply: &str, tools: Vec<DynTool>) -> (Agent, FixedClient) {
    let client = FixedClient::new(reply);
    let config = AgentConfig::new(
        "coder-1",
        "Coder",
        AgentRole::Coder,
        LlmConfig::mock(),
        "You are a Coding Agent.",
    )
    .with_tools(tools);
    (Agent::with_client(config, Arc::new(client.clone())), client)
}

fn record_events(agent: &Agent) -> Arc<Mutex<Vec<AgentEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    agent.subscribe(Arc::new(move |event: &AgentEvent| sink.lock().push(event.clone())));
    log
}

fn tool_call_count(events: &[AgentEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, AgentEvent::ToolCall { .. }))
        .count()
}

#[tokio::test]
async fn configured_tool_is_executed_and_reported() -> anyhow::Result<()> {
    let (agent, _) = agent_with(
        r#"<tool_call>{"name": "read_file", "parameters": {"path": "/x.ts"}}</tool_call>"#,
        vec![read_file_stub("abc")],
    );
    let events = record_events(&agent);

    let response = agent.process(&TaskContext::new("read it", Vec::new())).await?;

    assert_eq!(response.tool_calls.len(), 1);
    let call = &response.tool_calls[0];
    assert_eq!(call.tool_name, "read_file");
    assert_eq!(call.parameters["path"], json!("/x.ts"));
    assert_eq!(call.result, Some(ToolResult::ok("abc")));
    assert_eq!(response.status, ResponseStatus::Continue);
    assert_eq!(tool_call_count(&events.lock()), 1);
    Ok(())
}

#[tokio::test]
async fn unconfigured_tool_gets_no_result_and_no_event() -> anyhow::Result<()> {
    let (agent, _) = agent_with(
        r#"<tool_call>{"name": "deploy", "parameters": {}}</tool_call> <task_complete/>"#,
        vec![read_file_stub("abc")],
    );
    let events = record_events(&agent);

    let response = agent.process(&TaskContext::new("ship it", Vec::new())).await?;

    assert_eq!(response.tool_calls.len(), 1);
    assert!(response.tool_calls[0].result.is_none());
    assert_eq!(response.status, ResponseStatus::Complete);
    assert_eq!(tool_call_count(&events.lock()), 0);
    Ok(())
}

#[tokio::test]
async fn failing_tool_becomes_unsuccessful_result() -> anyhow::Result<()> {
    let failing: DynTool = Arc::new(FnTool::new("run_command", "Run", |_params| async {
        Err(SwarmError::tool("run_command", "exit status 1"))
    }));
    let (agent, _) = agent_with(
        r#"<tool_call>{"name": "run_command", "parameters": {"command": "false"}}</tool_call>
<handoff agent="debugger"/>"#,
        vec![failing],
    );

    let response = agent.process(&TaskContext::new("run", Vec::new())).await?;

    let result = response.tool_calls[0].result.clone().unwrap();
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("exit status 1"));
    assert_eq!(response.status, ResponseStatus::Handoff);
    assert_eq!(response.next_agent.as_deref(), Some("debugger"));
    Ok(())
}

#[tokio::test]
async fn missing_required_parameter_fails_without_executing() -> anyhow::Result<()> {
    let calls = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&calls);
    let tool: DynTool = Arc::new(
        FnTool::new("write_file", "Write", move |_params| {
            *counter.lock() += 1;
            async { Ok(ToolResult::ok("written")) }
        })
        .with_parameter("path", ToolParameter::string("Path").required())
        .with_parameter(
            "content",
            ToolParameter::new(ParameterType::String, "Body").required(),
        ),
    );
    let (agent, _) = agent_with(
        r#"<tool_call>{"name": "write_file", "parameters": {"path": "a.txt"}}</tool_call>"#,
        vec![tool],
    );

    let response = agent.process(&TaskContext::new("write", Vec::new())).await?;

    let result = response.tool_calls[0].result.clone().unwrap();
    assert!(!result.success);
    assert!(result.error.unwrap().contains("content"));
    assert_eq!(*calls.lock(), 0);
    Ok(())
}

#[tokio::test]
async fn request_starts_with_augmented_system_prompt() -> anyhow::Result<()> {
    let (agent, client) = agent_with("ok", vec![read_file_stub("abc")]);
    let mut context = TaskContext::new(
        "review",
        vec![FileContext::new("lib.rs", "pub fn a() {}").with_language("rust")],
    );
    context.push_message(Message::assistant("earlier reply", "Planner"));

    agent.process(&context).await?;

    let seen = client.seen.lock();
    let messages = &seen[0];
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].role, MessageRole::System);
    assert!(messages[0].content.starts_with("You are a Coding Agent."));
    assert!(messages[0]
        .content
        .contains("## Available Files:\n\n### lib.rs\n```rust\npub fn a() {}\n```\n"));
    assert!(messages[0]
        .content
        .contains("## Available Tools:\n\n- **read_file**: Read a file\n"));
    assert_eq!(messages[1].content, "review");
    assert_eq!(messages[2].name.as_deref(), Some("Planner"));
    Ok(())
}

#[tokio::test]
async fn plain_prompt_has_no_extra_sections() -> anyhow::Result<()> {
    let (agent, _) = agent_with("ok", Vec::new());
    let prompt = agent.build_system_prompt(&TaskContext::new("x", Vec::new()));
    assert_eq!(prompt, "You are a Coding Agent.");
    Ok(())
}

#[tokio::test]
async fn events_are_emitted_in_order() -> anyhow::Result<()> {
    let (agent, _) = agent_with(
        r#"<tool_call>{"name": "read_file", "parameters": {"path": "a"}}</tool_call>"#,
        vec![read_file_stub("abc")],
    );
    let events = record_events(&agent);

    agent.process(&TaskContext::new("go", Vec::new())).await?;

    let events = events.lock();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], AgentEvent::Start { ref agent_id, .. } if agent_id == "coder-1"));
    assert!(matches!(events[1], AgentEvent::ToolCall { .. }));
    assert!(matches!(events[2], AgentEvent::Response(_)));
    Ok(())
}

#[tokio::test]
async fn history_records_replies_and_reset_clears_it() -> anyhow::Result<()> {
    let (agent, client) = agent_with("first answer", Vec::new());
    let context = TaskContext::new("q", Vec::new());

    agent.process(&context).await?;
    agent.process(&context).await?;

    let history = agent.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "first answer");
    assert_eq!(history[0].name.as_deref(), Some("Coder"));

    // 私有历史不参与请求构造
    assert_eq!(client.seen.lock()[1].len(), 2);

    agent.reset();
    assert!(agent.history().is_empty());
    assert_eq!(agent.id(), "coder-1");
    Ok(())
}

#[test]
fn custom_provider_requires_explicit_client() {
    let config = AgentConfig::new(
        "custom-1",
        "Custom",
        AgentRole::Custom,
        LlmConfig::new(agentswarm::LlmProviderKind::Custom, "in-house"),
        "",
    );
    let err = Agent::new(config).unwrap_err();
    assert!(matches!(err, SwarmError::Configuration(_)));
}
