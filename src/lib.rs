//! 聊天消息中继
//!
//! 接收用户消息，按固定顺序的回退链解析回复：
//! - 关键词匹配（预设回复）
//! - 远程提供方 A（OpenRouter）
//! - 远程提供方 B（OpenAI）
//! - 静态回复
//!
//! # 架构分层
//!
//! - `domain`: 领域实体（消息、提供方状态）
//! - `core`: 核心层，配置、历史存储、回退链与中继服务
//! - `infrastructure`: 基础设施层，远程 LLM 客户端、日志与 Web 服务

pub mod core;
pub mod domain;
pub mod errors;
pub mod infrastructure;

pub use crate::core::config::{AppConfig, ProviderConfig};
pub use crate::core::keywords::KeywordMatcher;
pub use crate::core::provider::{static_reply, FallbackChain, ReplyProvider};
pub use crate::core::relay::MessageRelay;
pub use crate::core::store::{HistoryStore, MemoryStore};
pub use domain::{Message, ProviderKind, ProviderStatus, Role};
pub use errors::{ProviderError, RelayError, Result};
pub use infrastructure::llm::ChatCompletionProvider;
pub use infrastructure::logger;
pub use infrastructure::web::{create_router, start_web_server, AppState};

/// 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
