use futures::StreamExt;

use agentswarm::agent::builtin::{
    CODER_SYSTEM_PROMPT, DEBUGGER_SYSTEM_PROMPT, PLANNER_SYSTEM_PROMPT, REVIEWER_SYSTEM_PROMPT,
    TESTER_SYSTEM_PROMPT,
};
use agentswarm::{create_llm_client, LlmConfig, Message, MockLlmClient, SwarmError};
use agentswarm::llm::{LlmClientFactory, LlmClient};

fn conversation(system: &str, user: &str) -> Vec<Message> {
    vec![Message::system(system), Message::user(user)]
}

#[test]
fn role_markers_select_buckets() {
    let cases = [
        (PLANNER_SYSTEM_PROMPT, "planner"),
        (CODER_SYSTEM_PROMPT, "coder"),
        (REVIEWER_SYSTEM_PROMPT, "reviewer"),
        (TESTER_SYSTEM_PROMPT, "tester"),
        (DEBUGGER_SYSTEM_PROMPT, "debugger"),
        ("You are a helpful assistant.", "planner"),
    ];
    for (prompt, bucket) in cases {
        assert_eq!(
            MockLlmClient::detect_bucket(&conversation(prompt, "hi")),
            bucket
        );
    }
}

#[test]
fn latest_system_message_decides_bucket() {
    let messages = vec![
        Message::system(PLANNER_SYSTEM_PROMPT),
        Message::user("task"),
        Message::system(TESTER_SYSTEM_PROMPT),
    ];
    assert_eq!(MockLlmClient::detect_bucket(&messages), "tester");
}

#[test]
fn coder_patterns_match_latest_user_message() {
    let reverse = MockLlmClient::scripted_reply(&conversation(
        CODER_SYSTEM_PROMPT,
        "Create a function that reverses a string",
    ));
    assert!(reverse.contains("reverse_string"));

    let sum = MockLlmClient::scripted_reply(&conversation(
        CODER_SYSTEM_PROMPT,
        "Sum the even numbers",
    ));
    assert!(sum.contains("sum_even_numbers"));

    let fallback = MockLlmClient::scripted_reply(&conversation(CODER_SYSTEM_PROMPT, "hello"));
    assert!(fallback.contains("pub fn execute()"));
}

#[test]
fn korean_tasks_hit_scripted_replies() {
    let plan = MockLlmClient::scripted_reply(&conversation(
        PLANNER_SYSTEM_PROMPT,
        "문자열을 뒤집는 함수를 만들어줘",
    ));
    assert!(plan.contains("asked for a new function"));

    let refactor = MockLlmClient::scripted_reply(&conversation(
        PLANNER_SYSTEM_PROMPT,
        "이 모듈을 리팩토링해줘",
    ));
    assert!(refactor.contains("refactoring request"));

    let reverse = MockLlmClient::scripted_reply(&conversation(
        CODER_SYSTEM_PROMPT,
        "문자열을 뒤집는 함수",
    ));
    assert!(reverse.contains("reverse_string"));

    let sum = MockLlmClient::scripted_reply(&conversation(CODER_SYSTEM_PROMPT, "짝수의 합계"));
    assert!(sum.contains("sum_even_numbers"));
}

#[tokio::test]
async fn same_input_always_yields_same_reply() -> anyhow::Result<()> {
    let client = MockLlmClient::new(&LlmConfig::mock().with_delay_ms(0));
    let messages = conversation(REVIEWER_SYSTEM_PROMPT, "please review");

    let first = client.chat(&messages).await?;
    for _ in 0..5 {
        assert_eq!(client.chat(&messages).await?, first);
    }
    assert!(first.contains(r#"<handoff agent="tester"/>"#));
    Ok(())
}

#[tokio::test]
async fn stream_reassembles_to_chat_output() -> anyhow::Result<()> {
    let client = MockLlmClient::without_delay();
    let messages = conversation(TESTER_SYSTEM_PROMPT, "run the tests");

    let expected = client.chat(&messages).await?;
    let chunks: Vec<String> = client
        .stream(&messages)
        .map(|chunk| chunk.expect("mock stream never fails"))
        .collect()
        .await;

    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 20));
    assert_eq!(chunks.concat(), expected);
    Ok(())
}

#[tokio::test]
async fn consumer_can_stop_streaming_early() -> anyhow::Result<()> {
    let client = MockLlmClient::without_delay();
    let messages = conversation(PLANNER_SYSTEM_PROMPT, "refactor the parser");

    let first_two: Vec<String> = client
        .stream(&messages)
        .take(2)
        .map(|chunk| chunk.expect("mock stream never fails"))
        .collect()
        .await;

    assert_eq!(first_two.len(), 2);
    let full = client.chat(&messages).await?;
    assert!(full.starts_with(&first_two.concat()));
    Ok(())
}

#[test]
fn unknown_provider_tag_fails_before_any_io() {
    let err = match LlmClientFactory::create_from_tag("unknown", "model") {
        Ok(_) => panic!("unknown provider must be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SwarmError::Configuration(_)));
    assert!(err.to_string().contains("Unknown LLM provider: unknown"));
}

#[test]
fn factory_builds_mock_client() {
    assert!(create_llm_client(&LlmConfig::mock()).is_ok());
}

#[cfg(feature = "http-client")]
#[test]
fn http_providers_construct_without_network() {
    use agentswarm::LlmProviderKind;

    for provider in [
        LlmProviderKind::Anthropic,
        LlmProviderKind::OpenAi,
        LlmProviderKind::Ollama,
    ] {
        let config = LlmConfig::new(provider, provider.default_model());
        assert!(create_llm_client(&config).is_ok(), "provider {provider}");
    }
}
