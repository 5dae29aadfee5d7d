//! 消息中继服务
//!
//! 接收用户消息，写入会话历史，通过回退链得到回复，再把回复写入历史。
//!
//! 同一会话内的整次交换（追加用户消息 → 解析回复 → 追加助手消息）持有该会话的锁，
//! 保证历史始终按调用顺序 user/assistant 交替；不同会话互不阻塞。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::config::ProviderConfig;
use crate::core::keywords::KeywordMatcher;
use crate::core::provider::FallbackChain;
use crate::core::store::{HistoryStore, MemoryStore};
use crate::domain::{ConversationId, ConversationSummary, Message, ProviderStatus};
use crate::errors::{RelayError, Result};
use crate::infrastructure::llm::{build_http_client, ChatCompletionProvider};

/// 消息中继
pub struct MessageRelay {
    store: Arc<dyn HistoryStore>,
    chain: FallbackChain,
    config: ProviderConfig,
    locks: DashMap<ConversationId, Arc<Mutex<()>>>,
}

impl MessageRelay {
    pub fn new(store: Arc<dyn HistoryStore>, chain: FallbackChain, config: ProviderConfig) -> Self {
        Self {
            store,
            chain,
            config,
            locks: DashMap::new(),
        }
    }

    /// 按配置组装回退链：关键词 → OpenRouter → OpenAI
    pub fn from_config(config: ProviderConfig) -> anyhow::Result<Self> {
        let client = build_http_client(&config)?;

        let mut chain = FallbackChain::new().with_stage(Arc::new(KeywordMatcher));
        if let Some(provider) = ChatCompletionProvider::openrouter(&config, client.clone()) {
            info!(provider = %provider.kind(), endpoint = provider.endpoint(), model = provider.model(), "remote provider enabled");
            chain = chain.with_stage(Arc::new(provider));
        }
        if let Some(provider) = ChatCompletionProvider::openai(&config, client) {
            info!(provider = %provider.kind(), endpoint = provider.endpoint(), model = provider.model(), "remote provider enabled");
            chain = chain.with_stage(Arc::new(provider));
        }

        Ok(Self::new(Arc::new(MemoryStore::new()), chain, config))
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    fn conversation_lock(&self, conversation: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(conversation.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// 处理一条用户消息并返回回复
    ///
    /// 交换在独立任务中执行：调用方放弃等待时，回复仍会被解析并写入历史
    pub async fn handle(self: &Arc<Self>, conversation: &str, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            return Err(RelayError::empty_message());
        }

        let relay = Arc::clone(self);
        let conversation = conversation.to_string();
        let message = message.to_string();

        tokio::spawn(async move { relay.exchange(&conversation, &message).await })
            .await
            .map_err(|e| RelayError::Unknown(format!("exchange task failed: {e}")))?
    }

    /// 追加用户消息 → 解析回复 → 追加助手消息，全程持有会话锁
    async fn exchange(&self, conversation: &str, message: &str) -> Result<String> {
        let lock = self.conversation_lock(conversation);
        let _guard = lock.lock().await;

        self.store.append(conversation, Message::user(message)).await?;
        let history = self.store.messages(conversation).await?;

        let reply = self.chain.resolve(message, &history).await;

        self.store
            .append(conversation, Message::assistant(reply.clone()))
            .await?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            let history_len = self.store.len(conversation).await?;
            debug!(conversation, history_len, "message relayed");
        }
        Ok(reply)
    }

    /// 会话历史快照
    pub async fn history(&self, conversation: &str) -> Result<Vec<Message>> {
        self.store.messages(conversation).await
    }

    /// 清空会话历史，会等待进行中的交换完成
    ///
    /// 清空后若没有其他交换持有会话锁，锁也一并释放
    pub async fn clear_history(&self, conversation: &str) -> Result<()> {
        let lock = self.conversation_lock(conversation);
        let cleared = {
            let _guard = lock.lock().await;
            self.store.clear(conversation).await
        };
        drop(lock);

        self.locks
            .remove_if(conversation, |_, lock| Arc::strong_count(lock) == 1);
        cleared?;
        info!(conversation, "history cleared");
        Ok(())
    }

    pub async fn conversations(&self) -> Result<Vec<ConversationSummary>> {
        self.store.conversations().await.inspect_err(|e| {
            warn!(error = %e, "failed to list conversations");
        })
    }

    /// 当前配置下会首先尝试的提供方
    pub fn provider_status(&self) -> ProviderStatus {
        self.config.status()
    }
}
