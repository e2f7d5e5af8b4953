//! # 上游聊天服务接入模块
//!
//! Blackbox聊天接口的HTTP客户端，以及对其返回文本的清洗

pub mod blackbox;
pub mod sanitize;
