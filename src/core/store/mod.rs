//! 存储接口定义
//!
//! 对话历史的存储抽象，按会话ID分区，只追加

use async_trait::async_trait;

use crate::domain::{ConversationSummary, Message};
use crate::errors::Result;

pub mod memory;

pub use memory::MemoryStore;

/// 历史存储接口
///
/// 后端故障以 `RelayError::StorageError` 报告，内存实现不会失败
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 向会话追加一条消息
    async fn append(&self, conversation: &str, message: Message) -> Result<()>;

    /// 读取会话历史快照（按追加顺序）
    ///
    /// 会话不存在时返回空列表
    async fn messages(&self, conversation: &str) -> Result<Vec<Message>>;

    /// 清空会话历史
    async fn clear(&self, conversation: &str) -> Result<()>;

    /// 列出所有非空会话
    async fn conversations(&self) -> Result<Vec<ConversationSummary>>;

    /// 会话中的消息数量
    async fn len(&self, conversation: &str) -> Result<usize> {
        Ok(self.messages(conversation).await?.len())
    }
}
