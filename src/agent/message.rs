use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 会话中的一条消息
///
/// 在 `TaskContext` 中只追加、不修改。
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn user<T: Into<String>>(content: T) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            name: None,
            timestamp: None,
        }
    }

    pub fn system<T: Into<String>>(content: T) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            name: None,
            timestamp: None,
        }
    }

    /// 由某个 agent 产生的回复，带显示名和时间戳
    pub fn assistant<T: Into<String>, N: Into<String>>(content: T, name: N) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            name: Some(name.into()),
            timestamp: Some(Utc::now()),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}
