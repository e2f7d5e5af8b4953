use sqlx::{SqlitePool, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub user_id: i64,
    pub session_id: i64,
    pub message_id: String,
    pub content: String,
    pub role: String,
    pub timestamp: Option<String>,
}

/// Append a message to a session's history (async)
///
/// `role` must be "user" or "assistant"; anything else is rejected by the
/// table CHECK constraint.
pub async fn save_chat_message(
    pool: &SqlitePool,
    user_id: i64,
    session_id: i64,
    message_id: &str,
    content: &str,
    role: &str,
) -> Result<u64> {
    let res = sqlx::query(r#"
        INSERT INTO chat_history (user_id, session_id, message_id, content, role, timestamp)
        VALUES (?, ?, ?, ?, ?, datetime('now'))
    "#)
        .bind(user_id)
        .bind(session_id)
        .bind(message_id)
        .bind(content)
        .bind(role)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Read a session's history in chronological order (async)
///
/// The secondary id ordering keeps messages saved within the same second in
/// insertion order.
pub async fn get_chat_history(pool: &SqlitePool, session_id: i64, limit: i64) -> Result<Vec<ChatMessage>> {
    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_history WHERE session_id = ? ORDER BY timestamp ASC, id ASC LIMIT ?"
    )
        .bind(session_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(messages)
}

/// Count messages stored for a session (async)
pub async fn count_chat_messages_by_session(pool: &SqlitePool, session_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_history WHERE session_id = ?")
        .bind(session_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
