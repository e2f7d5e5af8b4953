//! # Web服务模块
//!
//! 聊天后端的HTTP入口：用户认证、会话/历史CRUD、API Key管理，
//! 以及面向浏览器和API Key调用方的两个聊天代理端点

pub mod server;
pub mod handlers;
pub mod dto;
pub mod error;
pub mod middleware;

pub use server::WebServer;
pub use error::ApiError;
