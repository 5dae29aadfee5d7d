//! 内存存储实现
//!
//! 默认的存储实现，数据仅在内存中，重启后丢失

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{ConversationId, ConversationSummary, Message};
use crate::errors::Result;

use super::HistoryStore;

/// 内存存储
#[derive(Default)]
pub struct MemoryStore {
    conversations: DashMap<ConversationId, Vec<Message>>,
}

impl MemoryStore {
    /// 创建新的内存存储
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn append(&self, conversation: &str, message: Message) -> Result<()> {
        self.conversations
            .entry(conversation.to_string())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn messages(&self, conversation: &str) -> Result<Vec<Message>> {
        Ok(self
            .conversations
            .get(conversation)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn clear(&self, conversation: &str) -> Result<()> {
        self.conversations.remove(conversation);
        Ok(())
    }

    async fn conversations(&self) -> Result<Vec<ConversationSummary>> {
        let mut result: Vec<ConversationSummary> = self
            .conversations
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| ConversationSummary {
                id: entry.key().clone(),
                message_count: entry.value().len(),
            })
            .collect();

        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    async fn len(&self, conversation: &str) -> Result<usize> {
        Ok(self
            .conversations
            .get(conversation)
            .map(|entry| entry.value().len())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_keeps_order() {
        let store = MemoryStore::new();
        store.append("c1", Message::user("first")).await.unwrap();
        store.append("c1", Message::assistant("second")).await.unwrap();

        let messages = store.messages("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
    }

    #[tokio::test]
    async fn test_conversations_are_isolated() {
        let store = MemoryStore::new();
        store.append("a", Message::user("to a")).await.unwrap();
        store.append("b", Message::user("to b")).await.unwrap();
        store.append("b", Message::assistant("from b")).await.unwrap();

        assert_eq!(store.len("a").await.unwrap(), 1);
        assert_eq!(store.len("b").await.unwrap(), 2);
        assert!(store.messages("missing").await.unwrap().is_empty());

        let summaries = store.conversations().await.unwrap();
        assert_eq!(
            summaries,
            vec![
                ConversationSummary { id: "a".to_string(), message_count: 1 },
                ConversationSummary { id: "b".to_string(), message_count: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_clear_only_affects_one_conversation() {
        let store = MemoryStore::new();
        store.append("a", Message::user("x")).await.unwrap();
        store.append("b", Message::user("y")).await.unwrap();

        store.clear("a").await.unwrap();
        store.clear("never-used").await.unwrap();

        assert!(store.messages("a").await.unwrap().is_empty());
        assert_eq!(store.len("b").await.unwrap(), 1);
    }
}
