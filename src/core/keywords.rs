//! 关键词匹配
//!
//! 回退链的第一环：输入转小写后按声明顺序做子串匹配，命中即返回预设回复

use async_trait::async_trait;

use crate::core::provider::{ProviderResult, ReplyProvider};
use crate::domain::Message;
use crate::errors::ProviderError;

/// 触发词 → 预设回复，顺序决定优先级
pub const CANNED_REPLIES: &[(&str, &str)] = &[
    ("hello", "Hello! 👋 How can I help you today?"),
    (
        "how are you",
        "I'm doing great! Thanks for asking. How can I assist you?",
    ),
    (
        "what is ai",
        "AI (Artificial Intelligence) is the simulation of human intelligence processes by machines.",
    ),
    (
        "help",
        "I'm here to help! Ask me anything and I'll do my best to assist you.",
    ),
    ("thank you", "You're welcome! Happy to help! 😊"),
    ("bye", "Goodbye! See you next time! 👋"),
];

/// 查找第一个命中的预设回复
pub fn match_keyword(input: &str) -> Option<&'static str> {
    let lower = input.to_lowercase();
    CANNED_REPLIES
        .iter()
        .find(|(trigger, _)| lower.contains(trigger))
        .map(|(_, reply)| *reply)
}

/// 关键词提供方
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatcher;

#[async_trait]
impl ReplyProvider for KeywordMatcher {
    fn name(&self) -> &str {
        "keywords"
    }

    async fn reply(&self, input: &str, _history: &[Message]) -> ProviderResult {
        match_keyword(input)
            .map(str::to_string)
            .ok_or(ProviderError::Declined)
    }
}
