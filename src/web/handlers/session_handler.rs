use axum::{
    extract::Query,
    http::HeaderMap,
    response::Json,
};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::dao::chat::{
    ChatMessage, ChatSession, create_chat_session, delete_chat_session, get_chat_history,
    get_chat_session_by_id, list_chat_sessions_by_user, rename_chat_session,
};
use crate::web::dto::session_dto::{
    CreateSessionRequest, CreateSessionResponse, DeleteSessionRequest, HistoryQuery,
    RenameSessionRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::{current_user, db_pool};

/// 历史记录单次返回的消息条数上限
const HISTORY_LIMIT: i64 = 50;

/// 校验会话归属；不属于调用方的会话与不存在的会话不做区分
async fn owned_session(
    pool: &sqlx::SqlitePool,
    user: &AuthUser,
    session_id: i64,
) -> Result<ChatSession, ApiError> {
    match get_chat_session_by_id(pool, session_id).await? {
        Some(session) if session.user_id == user.id => Ok(session),
        _ => Err(ApiError::not_found("Chat session not found")),
    }
}

/// 列出当前用户的所有会话
pub async fn list_sessions(headers: HeaderMap) -> Result<Json<Vec<ChatSession>>, ApiError> {
    let pool = db_pool()?;
    let user = current_user(&headers).await?;
    let sessions = list_chat_sessions_by_user(pool, user.id).await?;
    Ok(Json(sessions))
}

/// 新建会话
pub async fn create_session(
    headers: HeaderMap,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let pool = db_pool()?;
    let user = current_user(&headers).await?;

    let session_name = request
        .session_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("New Chat");

    let session_id = create_chat_session(pool, user.id, session_name).await?;
    Ok(Json(CreateSessionResponse {
        message: "Chat session created successfully".to_string(),
        session_id,
    }))
}

/// 重命名会话
pub async fn rename_session(
    headers: HeaderMap,
    Json(request): Json<RenameSessionRequest>,
) -> Result<Json<Value>, ApiError> {
    let pool = db_pool()?;
    let user = current_user(&headers).await?;

    let session_id = request
        .session_id
        .ok_or_else(|| ApiError::validation("Session ID required"))?;
    let session_name = request
        .session_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Session name required"))?;

    owned_session(pool, &user, session_id).await?;
    rename_chat_session(pool, session_id, session_name).await?;

    Ok(Json(json!({ "message": "Chat session updated successfully" })))
}

/// 删除会话及其消息
pub async fn delete_session(
    headers: HeaderMap,
    Json(request): Json<DeleteSessionRequest>,
) -> Result<Json<Value>, ApiError> {
    let pool = db_pool()?;
    let user = current_user(&headers).await?;

    let session_id = request
        .session_id
        .ok_or_else(|| ApiError::validation("Session ID required"))?;

    owned_session(pool, &user, session_id).await?;
    delete_chat_session(pool, session_id).await?;

    Ok(Json(json!({ "message": "Chat session deleted successfully" })))
}

/// 读取会话历史（时间升序，最多50条）
pub async fn get_history(
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let pool = db_pool()?;
    let user = current_user(&headers).await?;

    let session_id = query
        .session_id
        .ok_or_else(|| ApiError::validation("Session ID required"))?;

    owned_session(pool, &user, session_id).await?;
    let history = get_chat_history(pool, session_id, HISTORY_LIMIT).await?;
    Ok(Json(history))
}
