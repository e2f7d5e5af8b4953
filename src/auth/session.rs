use moka::future::Cache;
use once_cell::sync::OnceCell;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use rand::Rng;
use sha2::{Sha256, Digest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 浏览器会话Cookie名称
pub const SESSION_COOKIE: &str = "auth-token";

/// 会话有效期（秒），7天
pub const SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// 已认证用户的最小视图，供处理器使用
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// 会话令牌 -> 用户 的全局读缓存，减少每个请求的数据库往返
static SESSION_CACHE: OnceCell<Arc<Cache<String, AuthUser>>> = OnceCell::new();

/// 初始化全局会话缓存
pub fn init_session_cache(ttl_seconds: u64, max_capacity: u64) {
    let cache = Cache::builder()
        .time_to_live(Duration::from_secs(ttl_seconds))
        .max_capacity(max_capacity)
        .build();
    SESSION_CACHE.set(Arc::new(cache)).ok();
}

/// 生成一个新的会话令牌，格式为 `st_` + 64位十六进制
fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!("st_{}", hex)
}

/// 数据库中只存令牌哈希，令牌明文只出现在Cookie里
fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::default();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 为用户签发一个新会话，返回令牌明文 (async)
pub async fn issue_session(pool: &SqlitePool, user_id: i64) -> Result<String, sqlx::Error> {
    let token = generate_session_token();
    sqlx::query(r#"
        INSERT INTO auth_sessions (token_hash, user_id, expires_at, created_at)
        VALUES (?, ?, datetime('now', '+7 days'), datetime('now'))
    "#)
        .bind(hash_session_token(&token))
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(token)
}

/// 按令牌查找已认证用户；过期会话视为不存在 (async)
pub async fn authenticate_token(pool: &SqlitePool, token: &str) -> Result<Option<AuthUser>, sqlx::Error> {
    let token_hash = hash_session_token(token);

    if let Some(cache) = SESSION_CACHE.get() {
        if let Some(user) = cache.get(&token_hash).await {
            debug!(user_id = user.id, "Session cache hit");
            return Ok(Some(user));
        }
    }

    let user = sqlx::query_as::<_, AuthUser>(r#"
        SELECT u.id, u.username, u.email
        FROM auth_sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = ? AND s.expires_at > datetime('now')
    "#)
        .bind(&token_hash)
        .fetch_optional(pool)
        .await?;

    if let (Some(cache), Some(user)) = (SESSION_CACHE.get(), user.as_ref()) {
        cache.insert(token_hash, user.clone()).await;
    }

    Ok(user)
}

/// 从Cookie请求头中取出会话令牌
pub fn token_from_cookie_header(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("auth-token="))
        .filter(|token| !token.is_empty())
}

/// 构造Set-Cookie值
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        SESSION_COOKIE, token, SESSION_MAX_AGE_SECS
    )
}
