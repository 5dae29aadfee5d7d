//! 日志模块
//!
//! 提供基础日志功能

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 默认日志过滤规则，`RUST_LOG` 优先
pub const DEFAULT_FILTER: &str = "info,tower_http=debug";

/// 初始化日志系统，重复调用时忽略
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}
