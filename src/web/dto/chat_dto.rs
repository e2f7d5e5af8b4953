use serde::{Deserialize, Serialize};

/// 登录用户的聊天请求
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<i64>,
    #[serde(rename = "messageId")]
    pub message_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(rename = "sessionId")]
    pub session_id: Option<i64>,
}

/// API Key调用方的聊天请求 (POST /api/v1/chat)
#[derive(Debug, Deserialize)]
pub struct ProxyChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProxyChatResponse {
    pub response: String,
    pub credits_used: i64,
    pub credits_remaining: i64,
}
