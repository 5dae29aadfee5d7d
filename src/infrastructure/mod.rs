//! 基础设施层：外部系统交互
//!
//! 提供与外部系统（远程 LLM、HTTP 客户端、日志）的交互能力

pub mod llm;
pub mod logger;
pub mod web;
