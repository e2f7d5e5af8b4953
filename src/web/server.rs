use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use std::net::SocketAddr;
use anyhow::{Context, Result};
use tracing::info;

use crate::auth::init_session_cache;
use crate::dao::{init_db, init_sqlite_pool};
use crate::llm_api::blackbox::init_blackbox_client;
use crate::web::{
    handlers::{
        health_handler::health_check,
        auth_handler::{login, me, register},
        session_handler::{create_session, delete_session, get_history, list_sessions, rename_session},
        chat_handler::chat,
        api_key_handler::{create_user_api_key, list_user_api_keys, toggle_user_api_key},
        proxy_handler::proxy_chat,
    },
    middleware::cors::cors_layer,
};

/// 会话缓存TTL（秒）
const SESSION_CACHE_TTL_SECS: u64 = 3600;

/// 会话缓存容量
const SESSION_CACHE_CAPACITY: u64 = 10_000;

pub struct WebServer {
    db_url: String,
    init_sql_path: String,
    upstream_base_url: String,
}

impl WebServer {
    pub fn new(db_url: String, init_sql_path: String, upstream_base_url: String) -> Self {
        Self {
            db_url,
            init_sql_path,
            upstream_base_url,
        }
    }

    pub async fn start(&self, addr: SocketAddr) -> Result<()> {
        // 初始化数据库
        init_sqlite_pool(&self.db_url).await;
        init_db(&self.init_sql_path)
            .await
            .context("Failed to initialize database schema")?;

        // 初始化会话缓存与上游客户端
        init_session_cache(SESSION_CACHE_TTL_SECS, SESSION_CACHE_CAPACITY);
        init_blackbox_client(&self.upstream_base_url)
            .map_err(|e| anyhow::anyhow!("Failed to build upstream client: {}", e))?;

        let app = self.create_app();

        info!(addr = %addr, upstream = %self.upstream_base_url, "Chat relay listening");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    fn create_app(&self) -> Router {
        // API路由
        let api_routes = Router::new()
            // 健康检查
            .route("/health", get(health_check))
            // 用户认证
            .route("/auth/register", post(register))
            .route("/auth/login", post(login))
            .route("/auth/me", get(me))
            // 浏览器聊天与会话管理
            .route("/chat", post(chat))
            .route(
                "/chat/sessions",
                get(list_sessions)
                    .post(create_session)
                    .put(rename_session)
                    .delete(delete_session),
            )
            .route("/chat/history", get(get_history))
            // API Key管理
            .route("/user/api-keys", get(list_user_api_keys).post(create_user_api_key))
            .route("/user/api-keys/:id/toggle/:status", put(toggle_user_api_key))
            // API Key调用方的聊天代理
            .route("/v1/chat", post(proxy_chat));

        Router::new()
            .nest("/api", api_routes)
            .layer(ServiceBuilder::new().layer(cors_layer()))
    }
}
