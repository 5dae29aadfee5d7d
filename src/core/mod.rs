//! 核心层：配置、历史存储与回复解析
//!
//! 包含中继服务本身以及它依赖的通用能力

pub mod config;
pub mod keywords;
pub mod provider;
pub mod relay;
pub mod store;
