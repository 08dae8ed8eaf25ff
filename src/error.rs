use thiserror::Error;

pub type Result<T> = std::result::Result<T, SwarmError>;

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("tool `{tool}` failed: {message}")]
    Tool { tool: String, message: String },
    #[error("Agent not found: {0}")]
    AgentNotFound(String),
    #[error("swarm run finished without producing a response")]
    NoResponse,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SwarmError {
    pub fn unknown_provider(tag: impl std::fmt::Display) -> Self {
        SwarmError::Configuration(format!("Unknown LLM provider: {}", tag))
    }

    pub fn unknown_role(tag: impl std::fmt::Display) -> Self {
        SwarmError::Configuration(format!("Unknown agent role: {}", tag))
    }

    pub fn tool<T: Into<String>, M: std::fmt::Display>(tool: T, message: M) -> Self {
        SwarmError::Tool {
            tool: tool.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(feature = "http-client")]
impl From<reqwest::Error> for SwarmError {
    fn from(err: reqwest::Error) -> Self {
        SwarmError::Provider(err.to_string())
    }
}
