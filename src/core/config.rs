//! 配置管理
//!
//! 所有配置都可以通过命令行参数或同名环境变量提供，进程生命周期内不变

use std::time::Duration;

use clap::{Args, Parser};

use crate::domain::{ProviderDetails, ProviderKind, ProviderStatus};

pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_OPENROUTER_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Chat message relay with provider fallback")]
pub struct AppConfig {
    /// 监听地址
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// 监听端口
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    #[command(flatten)]
    pub providers: ProviderConfig,
}

impl AppConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 远程提供方配置
#[derive(Args, Debug, Clone)]
pub struct ProviderConfig {
    // 提供方 A
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,

    /// 完整的 chat completions 地址，或以 /v1 结尾的基础地址
    #[arg(long, env = "OPENROUTER_API_URL")]
    pub openrouter_api_url: Option<String>,

    #[arg(long, env = "OPENROUTER_MODEL")]
    pub openrouter_model: Option<String>,

    // 提供方 B
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL")]
    pub openai_model: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// 单次上游调用的超时时间（秒）
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value_t = DEFAULT_PROVIDER_TIMEOUT_SECS)]
    pub provider_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            openrouter_api_url: None,
            openrouter_model: None,
            openai_api_key: None,
            openai_model: None,
            openai_base_url: None,
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

/// 空字符串视为未设置
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ProviderConfig {
    pub fn openrouter_key(&self) -> Option<&str> {
        non_empty(&self.openrouter_api_key)
    }

    pub fn openai_key(&self) -> Option<&str> {
        non_empty(&self.openai_api_key)
    }

    pub fn openrouter_endpoint(&self) -> String {
        let base = non_empty(&self.openrouter_api_url).unwrap_or(DEFAULT_OPENROUTER_URL);
        completions_endpoint(base)
    }

    /// OpenRouter 模型：OPENROUTER_MODEL > OPENAI_MODEL > 默认值
    pub fn openrouter_model(&self) -> String {
        non_empty(&self.openrouter_model)
            .or_else(|| non_empty(&self.openai_model))
            .unwrap_or(DEFAULT_OPENROUTER_MODEL)
            .to_string()
    }

    pub fn openai_endpoint(&self) -> String {
        let base = non_empty(&self.openai_base_url).unwrap_or(DEFAULT_OPENAI_BASE_URL);
        completions_endpoint(base)
    }

    pub fn openai_model(&self) -> String {
        non_empty(&self.openai_model)
            .unwrap_or(DEFAULT_OPENAI_MODEL)
            .to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// 按当前配置计算会首先尝试的提供方，每次调用都重新计算
    pub fn status(&self) -> ProviderStatus {
        let provider = if self.openrouter_key().is_some() {
            ProviderKind::OpenRouter
        } else if self.openai_key().is_some() {
            ProviderKind::OpenAi
        } else {
            ProviderKind::Demo
        };

        ProviderStatus {
            provider,
            details: ProviderDetails {
                openrouter_url: non_empty(&self.openrouter_api_url).map(str::to_string),
                openai_model: non_empty(&self.openai_model).map(str::to_string),
            },
        }
    }
}

fn completions_endpoint(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{}/chat/completions", base)
    }
}
