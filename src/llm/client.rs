use std::sync::Arc;

use async_trait::async_trait;

use super::types::LlmStream;
use crate::agent::Message;
use crate::error::Result;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, messages: &[Message]) -> Result<String>;

    /// 默认实现：一次性调用 `chat`，把完整结果作为唯一分片输出
    fn stream(&self, messages: &[Message]) -> LlmStream {
        let messages = messages.to_vec();
        let client = self.clone_dyn();

        Box::pin(futures::stream::once(async move {
            client.chat(&messages).await
        }))
    }

    fn clone_dyn(&self) -> DynLlmClient;
}

pub type DynLlmClient = Arc<dyn LlmClient>;
