//! LLM 客户端
//!
//! 通过 chat completions 接口与 OpenAI 兼容的远程提供方交互。
//! 单次请求，不重试；失败以 [`ProviderError`] 返回给回退链。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::ProviderConfig;
use crate::core::provider::{ProviderResult, ReplyProvider};
use crate::domain::{Message, ProviderKind};
use crate::errors::ProviderError;

/// 单次回复的 token 上限
pub const MAX_REPLY_TOKENS: u32 = 500;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI 兼容的 chat completions 提供方
#[derive(Clone)]
pub struct ChatCompletionProvider {
    kind: ProviderKind,
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCompletionProvider {
    /// 创建新的提供方
    pub fn new(
        kind: ProviderKind,
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// 提供方 A，未配置密钥时返回 None
    pub fn openrouter(config: &ProviderConfig, client: reqwest::Client) -> Option<Self> {
        let key = config.openrouter_key()?;
        Some(Self::new(
            ProviderKind::OpenRouter,
            client,
            config.openrouter_endpoint(),
            key,
            config.openrouter_model(),
        ))
    }

    /// 提供方 B，未配置密钥时返回 None
    pub fn openai(config: &ProviderConfig, client: reqwest::Client) -> Option<Self> {
        let key = config.openai_key()?;
        Some(Self::new(
            ProviderKind::OpenAi,
            client,
            config.openai_endpoint(),
            key,
            config.openai_model(),
        ))
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 调用聊天 API
    pub async fn chat(&self, history: &[Message]) -> ProviderResult {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: history
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: MAX_REPLY_TOKENS,
        };

        debug!(
            provider = %self.kind,
            model = %self.model,
            messages = request.messages.len(),
            "calling chat completions"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyCompletion)
    }
}

#[async_trait]
impl ReplyProvider for ChatCompletionProvider {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn reply(&self, _input: &str, history: &[Message]) -> ProviderResult {
        self.chat(history).await
    }
}

/// 构建带超时的 HTTP 客户端
pub fn build_http_client(config: &ProviderConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(config.timeout()).build()
}
