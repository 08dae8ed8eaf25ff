pub mod client;
pub mod factory;
#[cfg(feature = "http-client")]
pub mod http;
pub mod mock;
pub mod types;

pub use client::{DynLlmClient, LlmClient};
pub use factory::{create_llm_client, LlmClientFactory};
#[cfg(feature = "http-client")]
pub use http::{AnthropicClient, OllamaClient, OpenAiClient};
pub use mock::MockLlmClient;
pub use types::{LlmConfig, LlmProviderKind, LlmStream};
