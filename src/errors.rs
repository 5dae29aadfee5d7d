//! 标准化错误处理
//!
//! 定义中继服务的错误类型：
//! - [`RelayError`]：会暴露给调用方的错误
//! - [`ProviderError`]：回复提供方内部的失败，只在回退链内部消化

use thiserror::Error;

/// 中继服务主要错误类型
#[derive(Error, Debug)]
pub enum RelayError {
    /// 输入验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 历史存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 未知错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl RelayError {
    /// 空消息
    pub fn empty_message() -> Self {
        RelayError::ValidationError("Message cannot be empty".to_string())
    }
}

impl From<anyhow::Error> for RelayError {
    fn from(err: anyhow::Error) -> Self {
        RelayError::Unknown(err.to_string())
    }
}

/// 回复提供方错误
///
/// 除 `Declined` 外都代表上游失败，回退链记录日志后继续尝试下一环
#[derive(Error, Debug)]
pub enum ProviderError {
    /// 提供方不处理这条输入（例如关键词未命中）
    #[error("declined")]
    Declined,

    /// 网络传输失败（连接、超时等）
    #[error("transport error: {0}")]
    Transport(String),

    /// 上游返回非 2xx 状态码
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// 响应体无法解析
    #[error("malformed response: {0}")]
    Decode(String),

    /// 响应中没有可用的回复内容
    #[error("empty completion")]
    EmptyCompletion,
}

impl ProviderError {
    /// 是否为上游失败（需要告警）
    pub fn is_upstream_failure(&self) -> bool {
        !matches!(self, ProviderError::Declined)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// 项目结果类型别名
pub type Result<T> = std::result::Result<T, RelayError>;
