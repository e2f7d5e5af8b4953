use axum::{
    extract::Path,
    http::HeaderMap,
    response::Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dao::api_key::{
    DEFAULT_CREDITS_LIMIT, MAX_KEYS_PER_USER, count_api_keys_by_user,
    create_api_key_from_secret, list_active_api_keys_by_user, toggle_api_key_active,
};
use crate::dao::api_key::crypto::{decrypt_api_secret, generate_api_secret};
use crate::web::dto::api_key_dto::{ApiKeyResponse, CreateApiKeyRequest, CreateApiKeyResponse};
use crate::web::error::ApiError;
use crate::web::handlers::{current_user, db_pool};

/// 列出当前用户的API Key，密钥解密回显
pub async fn list_user_api_keys(headers: HeaderMap) -> Result<Json<Vec<ApiKeyResponse>>, ApiError> {
    let pool = db_pool()?;
    let user = current_user(&headers).await?;

    let keys = list_active_api_keys_by_user(pool, user.id).await?;
    let responses = keys
        .into_iter()
        .map(|key| {
            // 解密失败不应拖垮整个列表
            let api_key = decrypt_api_secret(&key.encrypted_key_value).unwrap_or_else(|e| {
                warn!(key_id = %key.id, error = %e, "Failed to decrypt stored API key");
                "<unavailable>".to_string()
            });
            ApiKeyResponse {
                id: key.id,
                name: key.name,
                api_key,
                credits_used: key.credits_used,
                credits_limit: key.credits_limit,
                last_reset: key.last_reset,
                is_active: key.is_active,
                created_at: key.created_at,
            }
        })
        .collect();

    Ok(Json(responses))
}

/// 签发新的API Key；密钥明文只在这个响应里出现一次
pub async fn create_user_api_key(
    headers: HeaderMap,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<Json<CreateApiKeyResponse>, ApiError> {
    let pool = db_pool()?;
    let user = current_user(&headers).await?;

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Name cannot be empty"))?;

    let existing = count_api_keys_by_user(pool, user.id).await?;
    if existing >= MAX_KEYS_PER_USER {
        return Err(ApiError::validation(format!(
            "API key limit reached ({} per account)",
            MAX_KEYS_PER_USER
        )));
    }

    let secret = generate_api_secret();
    let key_id = Uuid::new_v4().to_string();
    create_api_key_from_secret(
        pool,
        key_id.clone(),
        user.id,
        name.to_string(),
        &secret,
        DEFAULT_CREDITS_LIMIT,
    )
    .await?;

    info!(user_id = user.id, key_id = %key_id, "API key created");

    Ok(Json(CreateApiKeyResponse {
        message: "API key created successfully".to_string(),
        id: key_id,
        api_key: secret,
    }))
}

/// 启用/停用自己的API Key
pub async fn toggle_user_api_key(
    headers: HeaderMap,
    Path((key_id, status)): Path<(String, bool)>,
) -> Result<Json<Value>, ApiError> {
    let pool = db_pool()?;
    let user = current_user(&headers).await?;

    let rows = toggle_api_key_active(pool, &key_id, user.id, status).await?;
    if rows == 0 {
        return Err(ApiError::not_found("API key not found"));
    }

    Ok(Json(json!({
        "message": format!("API key {} successfully", if status { "activated" } else { "deactivated" })
    })))
}
