use axum::{
    http::{header, HeaderMap},
    response::Json,
};
use tracing::info;

use crate::dao::api_key::ledger;
use crate::llm_api::blackbox::get_blackbox_client;
use crate::llm_api::sanitize::sanitize_response;
use crate::web::dto::chat_dto::{ProxyChatRequest, ProxyChatResponse};
use crate::web::error::ApiError;
use crate::web::handlers::db_pool;

/// 从Authorization头取出Bearer密钥
fn bearer_secret(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|s| !s.is_empty())
}

/// API Key调用方的聊天端点 (POST /api/v1/chat)
///
/// 授权与扣费拆开包住上游调用：上游失败的请求不消耗额度。
pub async fn proxy_chat(
    headers: HeaderMap,
    Json(request): Json<ProxyChatRequest>,
) -> Result<Json<ProxyChatResponse>, ApiError> {
    let pool = db_pool()?;

    let secret = bearer_secret(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing or invalid API key"))?;
    let key = ledger::authorize(pool, secret).await?;

    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Message is required"))?;

    let client = get_blackbox_client()
        .ok_or_else(|| ApiError::internal("upstream client not initialized"))?;
    let raw = client.chat(message).await?;
    let clean = sanitize_response(&raw);

    let outcome = ledger::charge(pool, &key.id).await?;

    info!(
        key_id = %key.id,
        credits_used = outcome.credits_used,
        credits_remaining = outcome.credits_remaining,
        "Proxied chat request charged"
    );

    Ok(Json(ProxyChatResponse {
        response: clean,
        credits_used: outcome.credits_used,
        credits_remaining: outcome.credits_remaining,
    }))
}
