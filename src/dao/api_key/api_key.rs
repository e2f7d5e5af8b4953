use sqlx::{SqlitePool, Result};
use serde::{Deserialize, Serialize};
use crate::dao::api_key::crypto::process_api_secret;

/// 每个账户最多允许持有的API Key数量
pub const MAX_KEYS_PER_USER: i64 = 10;

/// 新建Key的默认月度额度
pub const DEFAULT_CREDITS_LIMIT: i64 = 200;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: String,
    pub user_id: i64,
    pub key_hash: String,
    pub encrypted_key_value: String,
    pub name: String,
    pub credits_used: i64,
    pub credits_limit: i64,
    pub last_reset: String,
    pub is_active: bool,
    pub created_at: Option<String>,
}

/// Create a new api key row (async)
pub async fn create_api_key(pool: &SqlitePool, key: &ApiKey) -> Result<u64> {
    let res = sqlx::query(r#"
        INSERT INTO api_keys (
            id, user_id, key_hash, encrypted_key_value, name,
            credits_used, credits_limit, last_reset, is_active, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'), ?, datetime('now'))
    "#)
        .bind(&key.id)
        .bind(key.user_id)
        .bind(&key.key_hash)
        .bind(&key.encrypted_key_value)
        .bind(&key.name)
        .bind(key.credits_used)
        .bind(key.credits_limit)
        .bind(key.is_active)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Create an api key row from a freshly generated secret (async)
///
/// Hashes the secret for lookup and encrypts it for later redisplay; the
/// plaintext never touches the database.
pub async fn create_api_key_from_secret(
    pool: &SqlitePool,
    id: String,
    user_id: i64,
    name: String,
    secret: &str,
    credits_limit: i64,
) -> Result<u64> {
    let (key_hash, encrypted_key_value) = process_api_secret(secret)
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to process API key secret: {}", e)))?;

    let key = ApiKey {
        id,
        user_id,
        key_hash,
        encrypted_key_value,
        name,
        credits_used: 0,
        credits_limit,
        last_reset: String::new(), // 数据库侧填充 datetime('now')
        is_active: true,
        created_at: None,
    };

    create_api_key(pool, &key).await
}

/// Read an api key row by id (async)
pub async fn get_api_key_by_id(pool: &SqlitePool, id: &str) -> Result<Option<ApiKey>> {
    let key = sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(key)
}

/// Read an active api key row by the SHA-256 hash of its secret (async)
pub async fn get_active_api_key_by_hash(pool: &SqlitePool, key_hash: &str) -> Result<Option<ApiKey>> {
    let key = sqlx::query_as::<_, ApiKey>(
        "SELECT * FROM api_keys WHERE key_hash = ? AND is_active = 1"
    )
        .bind(key_hash)
        .fetch_optional(pool)
        .await?;
    Ok(key)
}

/// List a user's active api keys, newest first (async)
pub async fn list_active_api_keys_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<ApiKey>> {
    let keys = sqlx::query_as::<_, ApiKey>(
        "SELECT * FROM api_keys WHERE user_id = ? AND is_active = 1 ORDER BY created_at DESC"
    )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(keys)
}

/// Count all api keys of a user, active or not (async)
///
/// Deactivated keys still count against MAX_KEYS_PER_USER since rows are
/// never physically deleted.
pub async fn count_api_keys_by_user(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_keys WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Toggle active status of an api key owned by the given user (async)
pub async fn toggle_api_key_active(pool: &SqlitePool, id: &str, user_id: i64, is_active: bool) -> Result<u64> {
    let res = sqlx::query("UPDATE api_keys SET is_active = ? WHERE id = ? AND user_id = ?")
        .bind(is_active)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Consume one credit with a single conditional update (async)
///
/// The `credits_used < credits_limit` guard makes the check-and-increment
/// atomic at the storage layer, so two concurrent requests cannot spend the
/// same last credit. Returns 0 when the key is missing, inactive, or already
/// at its limit.
pub async fn charge_api_key(pool: &SqlitePool, id: &str) -> Result<u64> {
    let res = sqlx::query(r#"
        UPDATE api_keys SET credits_used = credits_used + 1
        WHERE id = ? AND is_active = 1 AND credits_used < credits_limit
    "#)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Zero the usage counter and restart the 30-day window (async)
pub async fn reset_api_key_credits(pool: &SqlitePool, id: &str) -> Result<u64> {
    let res = sqlx::query(r#"
        UPDATE api_keys SET credits_used = 0, last_reset = datetime('now') WHERE id = ?
    "#)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
