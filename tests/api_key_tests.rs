//! # API Key 管理测试集
//!
//! 测试Key的创建、查找、列表、计数与启停：
//! - 明文密钥入库前的哈希与加密
//! - 按哈希查找仅命中活跃Key
//! - 停用的Key仍计入数量上限
//! - 启停操作按所有者隔离

use chat_relay::dao::api_key::{
    count_api_keys_by_user, create_api_key_from_secret, get_active_api_key_by_hash,
    get_api_key_by_id, list_active_api_keys_by_user, toggle_api_key_active,
    crypto::{decrypt_api_secret, generate_api_secret, hash_api_secret},
    DEFAULT_CREDITS_LIMIT,
};
use chat_relay::dao::user::create_user;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

/// 创建内存中的测试数据库
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let create_tables_sql = r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS api_keys (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id),
            key_hash TEXT NOT NULL UNIQUE,
            encrypted_key_value TEXT NOT NULL,
            name TEXT NOT NULL,
            credits_used INTEGER NOT NULL DEFAULT 0,
            credits_limit INTEGER NOT NULL DEFAULT 200,
            last_reset TEXT NOT NULL DEFAULT (datetime('now')),
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT DEFAULT (datetime('now'))
        );
    "#;

    for stmt in create_tables_sql.split(';') {
        let stmt = stmt.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt).execute(&pool).await.expect("Failed to create table");
        }
    }

    pool
}

async fn setup_test_user(pool: &SqlitePool, tag: &str) -> i64 {
    let email = format!("{}_{}@test.com", tag, Uuid::new_v4());
    create_user(pool, tag, &email, "hash")
        .await
        .expect("Failed to create user")
}

#[tokio::test]
async fn test_create_stores_hash_and_encrypted_secret() {
    let pool = setup_test_db().await;
    let user_id = setup_test_user(&pool, "creator").await;

    let id = Uuid::new_v4().to_string();
    let secret = generate_api_secret();
    create_api_key_from_secret(&pool, id.clone(), user_id, "My Key".to_string(), &secret, DEFAULT_CREDITS_LIMIT)
        .await
        .expect("Failed to create api key");

    let key = get_api_key_by_id(&pool, &id).await.unwrap().expect("Key should exist");
    assert_eq!(key.user_id, user_id);
    assert_eq!(key.name, "My Key");
    assert_eq!(key.credits_used, 0);
    assert_eq!(key.credits_limit, DEFAULT_CREDITS_LIMIT);
    assert!(key.is_active);

    // 明文不入库，哈希用于查找，密文可回显原文
    assert_ne!(key.key_hash, secret);
    assert_ne!(key.encrypted_key_value, secret);
    assert_eq!(key.key_hash, hash_api_secret(&secret));
    assert_eq!(decrypt_api_secret(&key.encrypted_key_value).unwrap(), secret);
}

#[tokio::test]
async fn test_lookup_by_hash_only_finds_active_keys() {
    let pool = setup_test_db().await;
    let user_id = setup_test_user(&pool, "lookup").await;

    let id = Uuid::new_v4().to_string();
    let secret = generate_api_secret();
    create_api_key_from_secret(&pool, id.clone(), user_id, "key".to_string(), &secret, 200)
        .await
        .expect("Failed to create api key");

    let hash = hash_api_secret(&secret);
    let found = get_active_api_key_by_hash(&pool, &hash).await.unwrap();
    assert!(found.is_some());

    toggle_api_key_active(&pool, &id, user_id, false).await.expect("Toggle should succeed");
    let found = get_active_api_key_by_hash(&pool, &hash).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_list_excludes_inactive_but_count_includes_them() {
    let pool = setup_test_db().await;
    let user_id = setup_test_user(&pool, "counter").await;

    let mut ids = Vec::new();
    for i in 0..3 {
        let id = Uuid::new_v4().to_string();
        let secret = generate_api_secret();
        create_api_key_from_secret(&pool, id.clone(), user_id, format!("key {}", i), &secret, 200)
            .await
            .expect("Failed to create api key");
        ids.push(id);
    }

    toggle_api_key_active(&pool, &ids[0], user_id, false).await.expect("Toggle should succeed");

    let active = list_active_api_keys_by_user(&pool, user_id).await.unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|k| k.is_active));

    // 行不做物理删除，停用的Key仍占名额
    let count = count_api_keys_by_user(&pool, user_id).await.unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_toggle_is_scoped_to_owner() {
    let pool = setup_test_db().await;
    let owner_id = setup_test_user(&pool, "owner").await;
    let other_id = setup_test_user(&pool, "other").await;

    let id = Uuid::new_v4().to_string();
    let secret = generate_api_secret();
    create_api_key_from_secret(&pool, id.clone(), owner_id, "key".to_string(), &secret, 200)
        .await
        .expect("Failed to create api key");

    // 非所有者的启停不命中任何行
    let rows = toggle_api_key_active(&pool, &id, other_id, false).await.unwrap();
    assert_eq!(rows, 0);

    let key = get_api_key_by_id(&pool, &id).await.unwrap().unwrap();
    assert!(key.is_active);

    let rows = toggle_api_key_active(&pool, &id, owner_id, false).await.unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_keys_are_isolated_per_user() {
    let pool = setup_test_db().await;
    let alice = setup_test_user(&pool, "alice").await;
    let bob = setup_test_user(&pool, "bob").await;

    let id = Uuid::new_v4().to_string();
    let secret = generate_api_secret();
    create_api_key_from_secret(&pool, id, alice, "alice key".to_string(), &secret, 200)
        .await
        .expect("Failed to create api key");

    assert_eq!(list_active_api_keys_by_user(&pool, alice).await.unwrap().len(), 1);
    assert_eq!(list_active_api_keys_by_user(&pool, bob).await.unwrap().len(), 0);
    assert_eq!(count_api_keys_by_user(&pool, bob).await.unwrap(), 0);
}
