//! 回复提供方与回退链
//!
//! 每个提供方返回 `Result<String, ProviderError>`，回退链按顺序尝试，
//! 第一个成功的回复胜出；全部失败时使用静态回复。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::Message;
use crate::errors::ProviderError;

/// 提供方调用结果
pub type ProviderResult = std::result::Result<String, ProviderError>;

/// 回复提供方
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    /// 提供方名称，用于日志
    fn name(&self) -> &str;

    /// 为输入生成回复
    ///
    /// `history` 已包含本次用户消息
    async fn reply(&self, input: &str, history: &[Message]) -> ProviderResult;
}

/// 静态回复
pub fn static_reply(input: &str) -> String {
    format!(
        "I received: \"{}\". Connected to Demo AI - connect to your AI service for intelligent responses.",
        input
    )
}

/// 回退链
#[derive(Clone, Default)]
pub struct FallbackChain {
    stages: Vec<Arc<dyn ReplyProvider>>,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在链尾追加一个提供方
    pub fn with_stage(mut self, stage: Arc<dyn ReplyProvider>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// 依次尝试各提供方，提供方的失败不会传播给调用方
    pub async fn resolve(&self, input: &str, history: &[Message]) -> String {
        for stage in &self.stages {
            match stage.reply(input, history).await {
                Ok(reply) => {
                    debug!(provider = stage.name(), "reply resolved");
                    return reply;
                }
                Err(e) if e.is_upstream_failure() => {
                    warn!(provider = stage.name(), error = %e, "provider failed, falling through");
                }
                Err(e) => {
                    debug!(provider = stage.name(), error = %e, "provider skipped");
                }
            }
        }

        info!("no provider produced a reply, using static fallback");
        static_reply(input)
    }
}
