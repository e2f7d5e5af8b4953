use axum::{
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Json},
};
use tracing::info;

use crate::auth::{hash_password, issue_session, session_cookie, verify_password};
use crate::dao::user::{create_user, get_user_by_email, user_email_exists};
use crate::web::dto::auth_dto::{LoginRequest, RegisterRequest, UserResponse};
use crate::web::error::ApiError;
use crate::web::handlers::{current_user, db_pool};

/// 注册新用户，成功后直接下发会话Cookie
pub async fn register(Json(request): Json<RegisterRequest>) -> Result<impl IntoResponse, ApiError> {
    let pool = db_pool()?;

    let username = request
        .username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Username is required"))?;
    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Email is required"))?;
    let password = request
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Password is required"))?;

    if user_email_exists(pool, email).await? {
        return Err(ApiError::validation("User already exists"));
    }

    let password_hash =
        hash_password(password).map_err(|e| ApiError::internal(format!("Password hashing failed: {}", e)))?;
    let user_id = create_user(pool, username, email, &password_hash).await?;
    let token = issue_session(pool, user_id).await?;

    info!(user_id, "User registered");

    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Json(UserResponse {
            id: user_id,
            username: username.to_string(),
            email: email.to_string(),
        }),
    ))
}

/// 登录；用户不存在与密码错误返回同样的消息
pub async fn login(Json(request): Json<LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    let pool = db_pool()?;

    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Email is required"))?;
    let password = request
        .password
        .as_deref()
        .ok_or_else(|| ApiError::validation("Password is required"))?;

    let user = get_user_by_email(pool, email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = issue_session(pool, user.id).await?;

    info!(user_id = user.id, "User logged in");

    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Json(UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }),
    ))
}

/// 返回当前登录用户
pub async fn me(headers: HeaderMap) -> Result<Json<UserResponse>, ApiError> {
    let user = current_user(&headers).await?;
    Ok(Json(UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
    }))
}
