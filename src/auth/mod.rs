//! # 用户认证模块
//!
//! 密码哈希与基于数据库的不透明会话令牌，浏览器侧通过HttpOnly Cookie携带

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password};
pub use session::{
    AuthUser,
    SESSION_COOKIE,
    init_session_cache,
    issue_session,
    authenticate_token,
    token_from_cookie_header,
    session_cookie,
};
