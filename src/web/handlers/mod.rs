pub mod health_handler;
pub mod auth_handler;
pub mod session_handler;
pub mod chat_handler;
pub mod api_key_handler;
pub mod proxy_handler;

use axum::http::{header, HeaderMap};
use sqlx::SqlitePool;

use crate::auth::{self, AuthUser};
use crate::dao::SQLITE_POOL;
use crate::web::error::ApiError;

/// 获取全局连接池
pub(crate) fn db_pool() -> Result<&'static SqlitePool, ApiError> {
    SQLITE_POOL
        .get()
        .map(|pool| pool.as_ref())
        .ok_or_else(|| ApiError::internal("database pool not initialized"))
}

/// 从Cookie中的会话令牌解析当前用户，未登录返回None
pub(crate) async fn maybe_current_user(headers: &HeaderMap) -> Result<Option<AuthUser>, ApiError> {
    let pool = db_pool()?;
    let Some(cookie_header) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };
    let Some(token) = auth::token_from_cookie_header(cookie_header) else {
        return Ok(None);
    };
    Ok(auth::authenticate_token(pool, token).await?)
}

/// 必须登录的端点用这个取当前用户
pub(crate) async fn current_user(headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    maybe_current_user(headers)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
}
