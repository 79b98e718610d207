use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChatMessage;

/// Chat-completion backend that turns a conversation into the assistant's next message.
#[async_trait]
pub trait ChatCompletionPort: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
