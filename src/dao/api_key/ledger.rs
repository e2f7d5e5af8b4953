use sqlx::SqlitePool;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::dao::api_key::{
    ApiKey, get_active_api_key_by_hash, get_api_key_by_id, charge_api_key,
    reset_api_key_credits,
};
use crate::dao::api_key::crypto::hash_api_secret;

/// 额度耗尽后距离自动重置的窗口长度（天）
pub const RESET_WINDOW_DAYS: f64 = 30.0;

/// 一次成功计费后的额度快照
#[derive(Debug, Clone, Serialize)]
pub struct ChargeOutcome {
    pub credits_used: i64,
    pub credits_limit: i64,
    pub credits_remaining: i64,
}

/// 额度账本错误类型
#[derive(Debug)]
pub enum LedgerError {
    /// 密钥不存在或已停用
    Unauthorized,
    /// 额度耗尽且未到重置窗口
    QuotaExceeded { days_remaining: i64 },
    /// 存储层错误，绝不能降级为放行
    Storage { source: sqlx::Error },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Unauthorized => write!(f, "Invalid API key"),
            LedgerError::QuotaExceeded { days_remaining } => {
                write!(f, "Credit limit exceeded. Credits will reset in {} days.", days_remaining)
            }
            LedgerError::Storage { source } => write!(f, "Storage error: {}", source),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<sqlx::Error> for LedgerError {
    fn from(error: sqlx::Error) -> Self {
        LedgerError::Storage { source: error }
    }
}

/// Fractional days elapsed since a stored `datetime('now')` timestamp.
///
/// A malformed timestamp counts as a fresh reset, so a corrupt row denies
/// instead of granting quota.
fn days_since_reset(last_reset: &str, now: NaiveDateTime) -> f64 {
    let parsed = match NaiveDateTime::parse_from_str(last_reset, "%Y-%m-%d %H:%M:%S") {
        Ok(ts) => ts,
        Err(e) => {
            warn!(last_reset = %last_reset, error = %e, "Unparseable last_reset timestamp");
            return 0.0;
        }
    };
    now.signed_duration_since(parsed).num_seconds() as f64 / 86_400.0
}

/// Whole days until the reset window opens, rounded up.
///
/// Ceiling rounding keeps the user-facing figure from ever reading "0 days"
/// while the key is still blocked.
fn days_remaining(days_since: f64) -> i64 {
    (RESET_WINDOW_DAYS - days_since).ceil().max(1.0) as i64
}

/// Decide whether an API-key request may proceed (steps 1-3 of the ledger).
///
/// Looks the key up by the hash of its secret; inactive and unknown secrets
/// are indistinguishable to the caller. An exhausted key past the 30-day
/// window is reset here and allowed through. A key with unused quota is never
/// auto-reset, no matter how old its window is.
pub async fn authorize(pool: &SqlitePool, secret: &str) -> Result<ApiKey, LedgerError> {
    let key_hash = hash_api_secret(secret);
    let key = get_active_api_key_by_hash(pool, &key_hash)
        .await?
        .ok_or(LedgerError::Unauthorized)?;

    if key.credits_used < key.credits_limit {
        return Ok(key);
    }

    let days_since = days_since_reset(&key.last_reset, Utc::now().naive_utc());
    if days_since < RESET_WINDOW_DAYS {
        return Err(LedgerError::QuotaExceeded { days_remaining: days_remaining(days_since) });
    }

    reset_api_key_credits(pool, &key.id).await?;
    get_api_key_by_id(pool, &key.id)
        .await?
        .ok_or(LedgerError::Unauthorized)
}

/// Consume exactly one credit and report the post-increment counters.
///
/// The increment is a single conditional update, so concurrent requests
/// against the same key cannot spend past the limit. Callers charge only
/// after the upstream call has succeeded; a failed upstream call never
/// consumes quota.
pub async fn charge(pool: &SqlitePool, key_id: &str) -> Result<ChargeOutcome, LedgerError> {
    let rows = charge_api_key(pool, key_id).await?;
    if rows == 0 {
        // 区分密钥失效与额度耗尽
        return match get_api_key_by_id(pool, key_id).await? {
            Some(key) if key.is_active => {
                let days_since = days_since_reset(&key.last_reset, Utc::now().naive_utc());
                Err(LedgerError::QuotaExceeded { days_remaining: days_remaining(days_since) })
            }
            _ => Err(LedgerError::Unauthorized),
        };
    }

    let key = get_api_key_by_id(pool, key_id)
        .await?
        .ok_or(LedgerError::Unauthorized)?;
    Ok(ChargeOutcome {
        credits_used: key.credits_used,
        credits_limit: key.credits_limit,
        credits_remaining: key.credits_limit - key.credits_used,
    })
}

/// Gate and account for a request in one call.
///
/// One-shot path for callers with no external work between the gate and the
/// charge; the chat proxy splits the two around its upstream call instead.
pub async fn authorize_and_charge(pool: &SqlitePool, secret: &str) -> Result<ChargeOutcome, LedgerError> {
    let key = authorize(pool, secret).await?;
    charge(pool, &key.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(date: (i32, u32, u32), time: (u32, u32, u32)) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(time.0, time.1, time.2)
            .unwrap()
    }

    #[test]
    fn test_days_since_reset_exact_days() {
        let now = at((2025, 1, 31), (12, 0, 0));
        assert_eq!(days_since_reset("2025-01-21 12:00:00", now), 10.0);
        assert_eq!(days_since_reset("2025-01-31 12:00:00", now), 0.0);
    }

    #[test]
    fn test_days_since_reset_fractional() {
        let now = at((2025, 1, 22), (0, 0, 0));
        let days = days_since_reset("2025-01-21 12:00:00", now);
        assert!((days - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_days_since_reset_malformed_counts_as_fresh() {
        let now = at((2025, 1, 31), (12, 0, 0));
        assert_eq!(days_since_reset("not-a-timestamp", now), 0.0);
        assert_eq!(days_since_reset("", now), 0.0);
    }

    #[test]
    fn test_days_remaining_uses_ceiling() {
        // 10天前重置 -> 还剩整20天
        assert_eq!(days_remaining(10.0), 20);
        // 29.9天前重置 -> 仍然显示1天，绝不显示0天
        assert_eq!(days_remaining(29.9), 1);
        assert_eq!(days_remaining(29.0001), 1);
    }

    #[test]
    fn test_days_remaining_never_below_one() {
        assert_eq!(days_remaining(30.0), 1);
        assert_eq!(days_remaining(45.0), 1);
    }
}
