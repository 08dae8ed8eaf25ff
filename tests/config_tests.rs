use std::io::Write;

use agentswarm::llm::LlmProviderKind;
use agentswarm::{
    AgentRole, LlmConfig, RunOptions, StopReason, SwarmError, SwarmFile, SwarmOrchestrator,
    ToolRegistry,
};

#[test]
fn provider_and_role_tags_parse() {
    assert_eq!("ollama".parse::<LlmProviderKind>().unwrap(), LlmProviderKind::Ollama);
    assert_eq!("debugger".parse::<AgentRole>().unwrap(), AgentRole::Debugger);

    let err = "gemini".parse::<LlmProviderKind>().unwrap_err();
    assert!(matches!(err, SwarmError::Configuration(ref m) if m == "Unknown LLM provider: gemini"));

    let err = "wizard".parse::<AgentRole>().unwrap_err();
    assert!(matches!(err, SwarmError::Configuration(ref m) if m == "Unknown agent role: wizard"));
}

#[test]
fn llm_config_serializes_camel_case() {
    let config = LlmConfig::new(LlmProviderKind::Anthropic, "claude-sonnet-4-20250514")
        .with_api_key("${ANTHROPIC_API_KEY}")
        .with_max_tokens(1024);
    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value["provider"], "anthropic");
    assert_eq!(value["apiKey"], "${ANTHROPIC_API_KEY}");
    assert_eq!(value["maxTokens"], 1024);
    assert!(value.get("baseUrl").is_none());
}

#[tokio::test]
async fn swarm_file_drives_a_full_run() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"{{
            "llm": {{ "provider": "mock", "model": "mock-v1", "delayMs": 0 }},
            "maxIterations": 6,
            "agents": [
                {{ "role": "planner" }},
                {{ "role": "coder", "tools": ["read_file", "write_file"] }},
                {{ "role": "reviewer" }},
                {{ "role": "tester", "tools": ["run_command"] }}
            ]
        }}"#
    )?;

    let config = SwarmFile::load(file.path())
        .await?
        .into_config(&ToolRegistry::with_builtin())?;
    assert_eq!(config.max_iterations, 6);

    let mut swarm = SwarmOrchestrator::new(config)?;
    assert_eq!(swarm.get_agent("coder-1").unwrap().tools().len(), 2);
    assert!(swarm.get_agent("debugger-1").is_none());

    let outcome = swarm
        .run("Create a function that reverses a string", RunOptions::new())
        .await?;
    assert_eq!(outcome.stop, StopReason::Completed);
    assert_eq!(outcome.responses.len(), 4);
    Ok(())
}

#[test]
fn swarm_file_with_unknown_role_fails_at_construction() {
    let config = SwarmFile::from_json(
        r#"{ "llm": { "provider": "mock", "model": "mock-v1" },
             "agents": [{ "role": "architect" }] }"#,
    )
    .unwrap()
    .into_config(&ToolRegistry::with_builtin())
    .unwrap();

    let err = SwarmOrchestrator::new(config).unwrap_err();
    assert!(err.to_string().contains("Unknown agent role: architect"));
}

#[test]
fn invalid_temperature_is_rejected() {
    let config = agentswarm::SwarmConfig::new(LlmConfig::mock().with_temperature(3.5));
    let err = SwarmOrchestrator::new(config).unwrap_err();
    assert!(matches!(err, SwarmError::Configuration(_)));
}
