//! 测试通用工具
//!
//! 启动中继服务与模拟上游的辅助函数

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Once};

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use chat_relay::{create_router, AppState, MessageRelay, ProviderConfig};
use tokio::time::Duration;

static INIT: Once = Once::new();

/// 初始化测试环境
pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// 在随机端口上启动路由，返回监听地址
pub async fn spawn_router(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // 等待服务器启动
    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

/// 按给定配置启动中继服务
pub async fn spawn_relay(config: ProviderConfig) -> String {
    setup();
    let relay = MessageRelay::from_config(config).unwrap();
    let app = create_router(Arc::new(AppState::new(Arc::new(relay))));
    let addr = spawn_router(app).await;
    format!("http://{}", addr)
}

/// 一次被记录的上游请求
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

/// 模拟的 chat completions 上游
pub struct MockUpstream {
    delay: Duration,
    status: StatusCode,
    response: serde_json::Value,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockUpstream {
    /// 返回一条固定回复
    pub fn replying(content: &str) -> Arc<Self> {
        Self::with_response(
            StatusCode::OK,
            serde_json::json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": content },
                    "finish_reason": "stop"
                }]
            }),
        )
    }

    /// 返回错误状态码
    pub fn failing(status: StatusCode) -> Arc<Self> {
        Self::with_response(status, serde_json::json!({ "error": { "message": "upstream exploded" } }))
    }

    pub fn with_response(status: StatusCode, response: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::ZERO,
            status,
            response,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// 延迟 `delay` 后才返回固定回复
    pub fn replying_after(content: &str, delay: Duration) -> Arc<Self> {
        let upstream = Self::replying(content);
        Arc::new(Self {
            delay,
            status: upstream.status,
            response: upstream.response.clone(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// 启动上游，返回 /v1 基础地址
    pub async fn spawn(self: &Arc<Self>) -> String {
        let app = Router::new()
            .route("/v1/chat/completions", post(mock_completions))
            .with_state(self.clone());
        let addr = spawn_router(app).await;
        format!("http://{}/v1", addr)
    }
}

async fn mock_completions(
    State(upstream): State<Arc<MockUpstream>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    upstream
        .calls
        .lock()
        .unwrap()
        .push(RecordedCall { authorization, body });

    if !upstream.delay.is_zero() {
        tokio::time::sleep(upstream.delay).await;
    }

    (upstream.status, Json(upstream.response.clone()))
}

/// 读取会话历史
pub async fn get_history(base: &str) -> Vec<serde_json::Value> {
    let json: serde_json::Value = reqwest::get(format!("{}/chat/history", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    json["history"].as_array().unwrap().clone()
}

/// 发送一条聊天消息，返回状态码和响应体
pub async fn post_chat(base: &str, body: serde_json::Value) -> (u16, serde_json::Value) {
    let response = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&body)
        .send()
        .await
        .unwrap();

    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}
