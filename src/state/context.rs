use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::agent::{Message, MessageRole};
use crate::error::Result;

/// 作为参考材料提供给 agent 的文件
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileContext {
    pub path: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl FileContext {
    pub fn new<P: Into<String>, C: Into<String>>(path: P, content: C) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            language: None,
        }
    }

    pub fn with_language<L: Into<String>>(mut self, language: L) -> Self {
        self.language = Some(language.into());
        self
    }

    /// 读取磁盘文件，按扩展名推断语言标签
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let file = Self::new(path.display().to_string(), content);
        Ok(match language_for(path) {
            Some(language) => file.with_language(language),
            None => file,
        })
    }
}

fn language_for(path: &Path) -> Option<&'static str> {
    let language = match path.extension()?.to_str()? {
        "rs" => "rust",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" => "javascript",
        "py" => "python",
        "go" => "go",
        "java" => "java",
        "md" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "sh" => "bash",
        _ => return None,
    };
    Some(language)
}

/// 一次任务运行的共享上下文
///
/// 由编排器独占，只追加消息。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskContext {
    pub task_id: String,
    pub description: String,
    #[serde(default)]
    pub files: Vec<FileContext>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl TaskContext {
    /// 新任务：随机 id，并以任务描述作为第一条 user 消息
    pub fn new<D: Into<String>>(description: D, files: Vec<FileContext>) -> Self {
        let description = description.into();
        Self {
            task_id: Uuid::new_v4().to_string(),
            messages: vec![Message::user(description.clone())],
            description,
            files,
            metadata: Map::new(),
        }
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// 最近一条 assistant 消息的显示名
    pub fn last_assistant_name(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .and_then(|m| m.name.as_deref())
    }
}
