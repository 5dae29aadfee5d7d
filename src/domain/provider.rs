//! 提供方领域定义

use serde::{Deserialize, Serialize};

/// 回复提供方类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// 只有关键词匹配和静态回复
    Demo,
    /// 远程提供方 A
    OpenRouter,
    /// 远程提供方 B
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Demo => "demo",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::OpenAi => "openai",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 提供方状态（配置探测结果，不是存活检查）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub provider: ProviderKind,
    pub details: ProviderDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDetails {
    pub openrouter_url: Option<String>,
    pub openai_model: Option<String>,
}
