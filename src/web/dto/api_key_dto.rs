use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: Option<String>,
}

/// Key列表条目；api_key字段是解密回显的完整密钥
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: String,
    pub name: String,
    pub api_key: String,
    pub credits_used: i64,
    pub credits_limit: i64,
    pub last_reset: String,
    pub is_active: bool,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateApiKeyResponse {
    pub message: String,
    pub id: String,
    pub api_key: String,
}
