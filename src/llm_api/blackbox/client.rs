use once_cell::sync::OnceCell;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tracing::{debug, warn};

use crate::llm_api::blackbox::template::BlackboxChatRequest;

/// 上游聊天服务的默认地址
pub const DEFAULT_BASE_URL: &str = "https://www.blackbox.ai";

/// 上游要求的浏览器User-Agent
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:140.0) Gecko/20100101 Firefox/140.0";

/// 超时配置
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// 总请求超时时间
    pub request_timeout: Duration,
    /// 连接超时时间
    pub connect_timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(180),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl TimeoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// 上游调用错误类型
#[derive(Debug)]
pub enum UpstreamError {
    /// 上游限流 (429)
    RateLimited,
    /// 上游服务端错误 (5xx)
    ServerError { status: u16 },
    /// 其他非2xx响应
    Unexpected { status: u16, body: String },
    /// 网络错误（含超时）
    Network { source: reqwest::Error },
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::RateLimited => write!(f, "Upstream rate limit exceeded"),
            UpstreamError::ServerError { status } => {
                write!(f, "Upstream server error (status: {})", status)
            }
            UpstreamError::Unexpected { status, body } => {
                write!(f, "Upstream returned an error: {} {}", status, body)
            }
            UpstreamError::Network { source } => write!(f, "Network error: {}", source),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<reqwest::Error> for UpstreamError {
    fn from(error: reqwest::Error) -> Self {
        UpstreamError::Network { source: error }
    }
}

/// Blackbox聊天接口客户端
///
/// 每条入站聊天消息对应一次上游调用，不做重试；响应按原始文本读取，
/// 清洗交给 `sanitize_response`。
pub struct BlackboxClient {
    http: HttpClient,
    base_url: String,
}

impl BlackboxClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, UpstreamError> {
        Self::with_config(base_url, TimeoutConfig::default())
    }

    pub fn with_config(
        base_url: impl Into<String>,
        timeout: TimeoutConfig,
    ) -> Result<Self, UpstreamError> {
        let http = HttpClient::builder()
            .timeout(timeout.request_timeout)
            .connect_timeout(timeout.connect_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// 发送一条用户消息，返回上游的原始文本响应
    pub async fn chat(&self, message: &str) -> Result<String, UpstreamError> {
        let message_id = Utc::now().timestamp_millis().to_string();
        let request = BlackboxChatRequest::new(&message_id, message);
        let url = format!("{}/api/chat", self.base_url);

        debug!(url = %url, message_id = %message_id, "Sending chat request upstream");

        let response = self
            .http
            .post(&url)
            .header("Accept", "*/*")
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Origin", DEFAULT_BASE_URL)
            .header("Referer", format!("{}/", DEFAULT_BASE_URL))
            .header("Sec-Fetch-Dest", "empty")
            .header("Sec-Fetch-Mode", "cors")
            .header("Sec-Fetch-Site", "same-origin")
            .header("Priority", "u=0")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!(message_id = %message_id, "Upstream rate limited the request");
            return Err(UpstreamError::RateLimited);
        }
        if status.is_server_error() {
            warn!(message_id = %message_id, status = status.as_u16(), "Upstream server error");
            return Err(UpstreamError::ServerError { status: status.as_u16() });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Unexpected { status: status.as_u16(), body });
        }

        Ok(response.text().await?)
    }
}

/// 全局上游客户端实例
static BLACKBOX_CLIENT: OnceCell<Arc<BlackboxClient>> = OnceCell::new();

/// 初始化全局上游客户端
pub fn init_blackbox_client(base_url: &str) -> Result<(), UpstreamError> {
    let client = BlackboxClient::new(base_url)?;
    BLACKBOX_CLIENT.set(Arc::new(client)).ok();
    Ok(())
}

/// 获取全局上游客户端，未初始化时返回None
pub fn get_blackbox_client() -> Option<Arc<BlackboxClient>> {
    BLACKBOX_CLIENT.get().cloned()
}
