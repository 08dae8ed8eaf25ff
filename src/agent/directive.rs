//! 回复文本中的指令解析
//!
//! 指令以文本标记嵌入在模型输出中：
//! - 工具调用：`<tool_call>{"name": "...", "parameters": {...}}</tool_call>`
//! - 移交：`<handoff agent="coder"/>`
//! - 完成：`<task_complete/>` 或 `TASK_COMPLETE`
//!
//! 解析是纯函数，不执行工具、不产生事件。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use super::response::ResponseStatus;
use crate::tools::{ToolCall, ToolParams};

pub const COMPLETION_TAG: &str = "<task_complete/>";
pub const COMPLETION_KEYWORD: &str = "TASK_COMPLETE";

static TOOL_CALL_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<tool_call>\s*(.*?)\s*</tool_call>").expect("tool call pattern is valid")
});

static HANDOFF_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<handoff\s+agent\s*=\s*"([^"]+)"\s*/>"#).expect("handoff pattern is valid")
});

#[derive(Deserialize)]
struct ToolCallPayload {
    name: String,
    parameters: ToolParams,
}

/// 控制类指令：一次回复最多一个，移交优先于完成
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlDirective {
    None,
    Handoff(String),
    Complete,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    ToolCall(ToolCall),
    Handoff(String),
    Complete,
}

/// 一次回复中解析出的全部指令
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveSet {
    pub tool_calls: Vec<ToolCall>,
    pub control: ControlDirective,
}

impl DirectiveSet {
    pub fn parse(text: &str) -> Self {
        let control = match parse_handoff(text) {
            Some(target) => ControlDirective::Handoff(target),
            None if is_complete(text) => ControlDirective::Complete,
            None => ControlDirective::None,
        };
        Self {
            tool_calls: parse_tool_calls(text),
            control,
        }
    }

    pub fn status(&self) -> ResponseStatus {
        match self.control {
            ControlDirective::Handoff(_) => ResponseStatus::Handoff,
            ControlDirective::Complete => ResponseStatus::Complete,
            ControlDirective::None => ResponseStatus::Continue,
        }
    }

    pub fn handoff(&self) -> Option<&str> {
        match &self.control {
            ControlDirective::Handoff(target) => Some(target),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty() && self.control == ControlDirective::None
    }

    pub fn into_directives(self) -> Vec<Directive> {
        let mut directives: Vec<Directive> =
            self.tool_calls.into_iter().map(Directive::ToolCall).collect();
        match self.control {
            ControlDirective::Handoff(target) => directives.push(Directive::Handoff(target)),
            ControlDirective::Complete => directives.push(Directive::Complete),
            ControlDirective::None => {}
        }
        directives
    }
}

/// 提取所有格式正确的工具调用块；JSON 无效的块被丢弃
pub fn parse_tool_calls(text: &str) -> Vec<ToolCall> {
    TOOL_CALL_BLOCK
        .captures_iter(text)
        .filter_map(|captures| {
            let body = captures.get(1)?.as_str();
            match serde_json::from_str::<ToolCallPayload>(body) {
                Ok(payload) => Some(ToolCall::new(payload.name, payload.parameters)),
                Err(err) => {
                    warn!(%err, "dropping malformed tool_call block");
                    None
                }
            }
        })
        .collect()
}

/// 第一个移交标记的目标
pub fn parse_handoff(text: &str) -> Option<String> {
    HANDOFF_TAG
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|target| target.as_str().to_string())
}

pub fn is_complete(text: &str) -> bool {
    text.contains(COMPLETION_TAG) || text.contains(COMPLETION_KEYWORD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handoff_wins_over_completion() {
        let set = DirectiveSet::parse("done <task_complete/> <handoff agent=\"tester\"/>");
        assert_eq!(set.status(), ResponseStatus::Handoff);
        assert_eq!(set.handoff(), Some("tester"));
    }

    #[test]
    fn keyword_marks_completion() {
        assert!(is_complete("all good, TASK_COMPLETE"));
        assert!(!is_complete("still working..."));
    }

    #[test]
    fn nested_parameters_are_kept() {
        let calls = parse_tool_calls(
            r#"<tool_call>{"name": "write_file", "parameters": {"path": "a", "meta": {"mode": 1}}}</tool_call>"#,
        );
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].parameters["meta"]["mode"], 1);
    }

    #[test]
    fn directives_list_tool_calls_before_control() {
        let directives = DirectiveSet::parse(
            r#"<tool_call>{"name": "a", "parameters": {}}</tool_call> TASK_COMPLETE"#,
        )
        .into_directives();
        assert_eq!(directives.len(), 2);
        assert!(matches!(directives[0], Directive::ToolCall(_)));
        assert_eq!(directives[1], Directive::Complete);
    }
}
