use axum::{http::HeaderMap, response::Json};
use chrono::Utc;
use tracing::info;

use crate::dao::chat::{create_chat_session, get_chat_session_by_id, save_chat_message};
use crate::llm_api::blackbox::get_blackbox_client;
use crate::llm_api::sanitize::sanitize_response;
use crate::web::dto::chat_dto::{ChatRequest, ChatResponse};
use crate::web::error::ApiError;
use crate::web::handlers::{db_pool, maybe_current_user};

/// 浏览器聊天端点
///
/// 未登录也可以聊天，只是不保存任何记录；登录用户按需创建会话，
/// 提问和清洗后的回答都落库。
pub async fn chat(
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let pool = db_pool()?;

    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Message is required"))?;

    let user = maybe_current_user(&headers).await?;

    let mut session_id = None;
    if let Some(user) = &user {
        let sid = match request.session_id {
            Some(sid) => match get_chat_session_by_id(pool, sid).await? {
                Some(session) if session.user_id == user.id => sid,
                _ => return Err(ApiError::not_found("Chat session not found")),
            },
            None => create_chat_session(pool, user.id, "New Chat").await?,
        };
        session_id = Some(sid);

        let message_id = request
            .message_id
            .clone()
            .unwrap_or_else(|| Utc::now().timestamp_millis().to_string());
        save_chat_message(pool, user.id, sid, &message_id, message, "user").await?;
    }

    let client = get_blackbox_client()
        .ok_or_else(|| ApiError::internal("upstream client not initialized"))?;
    let raw = client.chat(message).await?;
    let clean = sanitize_response(&raw);

    if let (Some(user), Some(sid)) = (&user, session_id) {
        let assistant_message_id = Utc::now().timestamp_millis().to_string();
        save_chat_message(pool, user.id, sid, &assistant_message_id, &clean, "assistant").await?;
        info!(user_id = user.id, session_id = sid, "Chat exchange persisted");
    }

    Ok(Json(ChatResponse {
        response: clean,
        session_id,
    }))
}
