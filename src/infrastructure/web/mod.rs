//! Web 服务器模块
//!
//! 提供中继服务的 HTTP API

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::core::relay::MessageRelay;
use crate::domain::{ConversationSummary, Message, ProviderStatus, DEFAULT_CONVERSATION};
use crate::errors::RelayError;

// ==================== 错误响应 ====================

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: msg,
                    message: None,
                }),
            )
                .into_response(),
            other => {
                error!(error = %other, "failed to process request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to process message".to_string(),
                        message: Some(other.to_string()),
                    }),
                )
                    .into_response()
            }
        }
    }
}

// ==================== 状态 ====================

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<MessageRelay>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(relay: Arc<MessageRelay>) -> Self {
        Self {
            relay,
            started_at: Instant::now(),
        }
    }
}

// ==================== 请求/响应类型 ====================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConversationQuery {
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<ConversationSummary>,
}

/// 未指定或为空时落到默认会话
fn conversation_or_default(id: Option<&str>) -> &str {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_CONVERSATION)
}

// ==================== 处理器 ====================

/// 发送消息
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, RelayError> {
    let Json(req) = payload.map_err(|e| RelayError::ValidationError(e.body_text()))?;

    let conversation = conversation_or_default(req.conversation_id.as_deref());
    let message = req.message.unwrap_or_default();

    let reply = state.relay.handle(conversation, &message).await?;
    Ok(Json(ChatReply { reply }))
}

/// 获取会话历史
async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<HistoryResponse>, RelayError> {
    let conversation = conversation_or_default(query.conversation_id.as_deref());
    let history = state.relay.history(conversation).await?;
    Ok(Json(HistoryResponse { history }))
}

/// 清空会话历史
async fn clear_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConversationQuery>,
) -> Result<impl IntoResponse, RelayError> {
    let conversation = conversation_or_default(query.conversation_id.as_deref());
    state.relay.clear_history(conversation).await?;
    Ok(Json(serde_json::json!({ "message": "History cleared" })))
}

/// 列出会话
async fn list_conversations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConversationsResponse>, RelayError> {
    let conversations = state.relay.conversations().await?;
    Ok(Json(ConversationsResponse { conversations }))
}

/// 健康检查
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}

/// 当前首选的提供方
async fn ai_status(State(state): State<Arc<AppState>>) -> Json<ProviderStatus> {
    Json(state.relay.provider_status())
}

// ==================== 路由 ====================

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/history", get(get_history).delete(clear_history))
        .route("/chat/conversations", get(list_conversations))
        .route("/health", get(health_check))
        .route("/ai/status", get(ai_status))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

// ==================== 服务器启动 ====================

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down server...");
}

pub async fn start_web_server(bind_addr: &str, relay: Arc<MessageRelay>) -> anyhow::Result<()> {
    let status = relay.provider_status();
    let app = create_router(Arc::new(AppState::new(relay)));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Chat relay started on http://{}", listener.local_addr()?);
    info!(provider = %status.provider, "active provider");
    info!("Endpoints: POST /chat, GET /chat/history, DELETE /chat/history, GET /chat/conversations, GET /health, GET /ai/status");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
