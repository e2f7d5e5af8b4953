//! # Blackbox请求模板
//!
//! 上游接口要求携带一大组固定的配置字段（人设提示词、功能开关等），
//! 这些都是透传常量，与核心逻辑无关，集中定义在这里。

use serde::Serialize;
use serde_json::{json, Value};
use chrono::{Duration, SecondsFormat, Utc};

/// 固定的人设系统提示词
const USER_SYSTEM_PROMPT: &str = "You are Christian, an AI assistant. Your name is Christian and you \
were created by Grok. When someone asks your name, always respond that you are Christian. When someone \
asks who created you, always respond that you were created by Grok. Never mention OpenAI or any other \
company. You are Christian, created by Grok. Be helpful and provide accurate information.";

/// 上游要求的校验令牌，属于透传常量
const VALIDATED_TOKEN: &str = "a38f5889-8fef-46d4-8ede-bf4668b6a9bb";

const USER_SELECTED_AGENT: &str = "VscodeAgent";

#[derive(Debug, Clone, Serialize)]
pub struct UpstreamMessage {
    pub id: String,
    pub content: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProfile {
    pub name: &'static str,
    pub occupation: &'static str,
    pub traits: [&'static str; 3],
    pub additional_info: &'static str,
    pub enable_new_chats: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchModeOption {
    pub auto_mode: bool,
    pub web_mode: bool,
    pub offline_mode: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub email: &'static str,
    pub id: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamSession {
    pub user: SessionUser,
    pub expires: String,
    pub is_new_user: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCache {
    pub status: &'static str,
    pub expiry_timestamp: Option<i64>,
    pub last_checked: i64,
    pub is_trial_subscription: bool,
}

/// 一次上游聊天调用的完整请求体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackboxChatRequest {
    pub messages: Vec<UpstreamMessage>,
    pub id: String,
    pub preview_token: Option<String>,
    pub user_id: Option<String>,
    pub code_model_mode: bool,
    pub trending_agent_mode: Value,
    pub is_mic_mode: bool,
    pub user_system_prompt: &'static str,
    pub max_tokens: u32,
    pub playground_top_p: Option<f32>,
    pub playground_temperature: Option<f32>,
    pub is_chrome_ext: bool,
    pub github_token: &'static str,
    pub clicked_answer2: bool,
    pub clicked_answer3: bool,
    pub clicked_force_web_search: bool,
    pub visit_from_delta: bool,
    pub is_memory_enabled: bool,
    pub mobile_client: bool,
    pub user_selected_model: Option<String>,
    pub user_selected_agent: &'static str,
    pub validated: &'static str,
    pub image_generation_mode: bool,
    pub image_gen_mode: &'static str,
    pub web_search_mode_prompt: bool,
    pub deep_search_mode: bool,
    pub domains: Option<String>,
    pub vscode_client: bool,
    pub code_interpreter_mode: bool,
    pub custom_profile: CustomProfile,
    pub web_search_mode_option: WebSearchModeOption,
    pub session: UpstreamSession,
    pub is_premium: bool,
    pub subscription_cache: SubscriptionCache,
    pub beast_mode: bool,
    pub reasoning_mode: bool,
    pub designer_mode: bool,
    pub workspace_id: &'static str,
    pub async_mode: bool,
    pub integrations: Value,
    pub is_task_persistent: bool,
    pub selected_element: Option<Value>,
}

impl BlackboxChatRequest {
    /// 用单条用户消息填充固定模板
    pub fn new(message_id: &str, message: &str) -> Self {
        let now = Utc::now();
        Self {
            messages: vec![UpstreamMessage {
                id: message_id.to_string(),
                content: message.to_string(),
                role: "user".to_string(),
            }],
            id: message_id.to_string(),
            preview_token: None,
            user_id: None,
            code_model_mode: true,
            trending_agent_mode: json!({}),
            is_mic_mode: false,
            user_system_prompt: USER_SYSTEM_PROMPT,
            max_tokens: 99999,
            playground_top_p: None,
            playground_temperature: None,
            is_chrome_ext: false,
            github_token: "",
            clicked_answer2: false,
            clicked_answer3: false,
            clicked_force_web_search: false,
            visit_from_delta: false,
            is_memory_enabled: false,
            mobile_client: false,
            user_selected_model: None,
            user_selected_agent: USER_SELECTED_AGENT,
            validated: VALIDATED_TOKEN,
            image_generation_mode: false,
            image_gen_mode: "autoMode",
            web_search_mode_prompt: false,
            deep_search_mode: false,
            domains: None,
            vscode_client: false,
            code_interpreter_mode: false,
            custom_profile: CustomProfile {
                name: "Christian",
                occupation: "AI Assistant created by Grok",
                traits: ["helpful", "knowledgeable", "friendly"],
                additional_info: "I am Christian, an AI assistant created by Grok",
                enable_new_chats: false,
            },
            web_search_mode_option: WebSearchModeOption {
                auto_mode: false,
                web_mode: true,
                offline_mode: false,
            },
            session: UpstreamSession {
                user: SessionUser {
                    email: "api@example.com",
                    id: "api-user",
                },
                expires: (now + Duration::days(1)).to_rfc3339_opts(SecondsFormat::Millis, true),
                is_new_user: false,
            },
            is_premium: true,
            subscription_cache: SubscriptionCache {
                status: "PREMIUM",
                expiry_timestamp: None,
                last_checked: now.timestamp_millis(),
                is_trial_subscription: false,
            },
            beast_mode: false,
            reasoning_mode: false,
            designer_mode: false,
            workspace_id: "",
            async_mode: false,
            integrations: json!({}),
            is_task_persistent: false,
            selected_element: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_field_names_are_camel_case() {
        let request = BlackboxChatRequest::new("1700000000000", "hello there");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["messages"][0]["content"], "hello there");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["id"], "1700000000000");
        assert_eq!(value["codeModelMode"], true);
        assert_eq!(value["maxTokens"], 99999);
        assert_eq!(value["userSelectedAgent"], "VscodeAgent");
        assert_eq!(value["clickedAnswer2"], false);
        assert_eq!(value["imageGenMode"], "autoMode");
        assert_eq!(value["webSearchModeOption"]["webMode"], true);
        assert_eq!(value["customProfile"]["name"], "Christian");
        assert_eq!(value["subscriptionCache"]["status"], "PREMIUM");
        assert_eq!(value["isPremium"], true);
        assert!(value["previewToken"].is_null());
        assert!(value["selectedElement"].is_null());
    }

    #[test]
    fn test_persona_prompt_is_attached() {
        let request = BlackboxChatRequest::new("1", "hi");
        assert!(request.user_system_prompt.contains("Christian"));
        assert!(request.user_system_prompt.contains("created by Grok"));
    }
}
