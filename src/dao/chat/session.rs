use sqlx::{SqlitePool, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: i64,
    pub user_id: i64,
    pub session_name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Create a new chat session and return its row id (async)
pub async fn create_chat_session(pool: &SqlitePool, user_id: i64, session_name: &str) -> Result<i64> {
    let res = sqlx::query(r#"
        INSERT INTO chat_sessions (user_id, session_name, created_at, updated_at)
        VALUES (?, ?, datetime('now'), datetime('now'))
    "#)
        .bind(user_id)
        .bind(session_name)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}

/// Read a chat session by id (async)
pub async fn get_chat_session_by_id(pool: &SqlitePool, id: i64) -> Result<Option<ChatSession>> {
    let session = sqlx::query_as::<_, ChatSession>("SELECT * FROM chat_sessions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(session)
}

/// List chat sessions of a user, most recently updated first (async)
pub async fn list_chat_sessions_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<ChatSession>> {
    let sessions = sqlx::query_as::<_, ChatSession>(
        "SELECT * FROM chat_sessions WHERE user_id = ? ORDER BY updated_at DESC"
    )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(sessions)
}

/// Rename a chat session and bump its updated_at (async)
pub async fn rename_chat_session(pool: &SqlitePool, id: i64, session_name: &str) -> Result<u64> {
    let res = sqlx::query(r#"
        UPDATE chat_sessions SET session_name = ?, updated_at = datetime('now') WHERE id = ?
    "#)
        .bind(session_name)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Delete a chat session; its messages go with it via ON DELETE CASCADE (async)
pub async fn delete_chat_session(pool: &SqlitePool, id: i64) -> Result<u64> {
    let res = sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
