use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(rename = "sessionName")]
    pub session_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameSessionRequest {
    #[serde(rename = "sessionId")]
    pub session_id: Option<i64>,
    #[serde(rename = "sessionName")]
    pub session_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSessionRequest {
    #[serde(rename = "sessionId")]
    pub session_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub message: String,
    #[serde(rename = "sessionId")]
    pub session_id: i64,
}
