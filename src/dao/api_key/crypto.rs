use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce, Key
};
use sha2::{Sha256, Digest};
use base64::{Engine as _, engine::general_purpose};
use rand::Rng;
use anyhow::{Result, anyhow};

/// API Key密文的固定加密密钥 - 生产环境应从环境变量或配置文件读取
const ENCRYPTION_KEY: &[u8; 32] = b"chat_relay_32_byte_secret_key!!!";

/// 生成的API Key密钥前缀
const SECRET_PREFIX: &str = "ck_";

/// 密钥随机部分的字节数，编码为48个十六进制字符
const SECRET_RANDOM_BYTES: usize = 24;

/// 生成一个新的API Key密钥
///
/// 格式固定为 `ck_` + 48位小写十六进制，共51个字符
pub fn generate_api_secret() -> String {
    let mut bytes = [0u8; SECRET_RANDOM_BYTES];
    rand::thread_rng().fill(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}{}", SECRET_PREFIX, hex)
}

/// 对密钥做SHA-256哈希，用作数据库查找键
pub fn hash_api_secret(secret: &str) -> String {
    let mut hasher = Sha256::default();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 使用AES-256-GCM加密密钥，供Key列表页回显
///
/// 返回Base64编码的 nonce + 密文
pub fn encrypt_api_secret(secret: &str) -> Result<String> {
    let key = Key::<Aes256Gcm>::from_slice(ENCRYPTION_KEY);
    let cipher = Aes256Gcm::new(key);

    // 每次加密使用随机nonce
    let mut nonce_bytes = [0u8; 12];
    rand::thread_rng().fill(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, secret.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    let mut encrypted_data = nonce_bytes.to_vec();
    encrypted_data.extend_from_slice(&ciphertext);

    Ok(general_purpose::STANDARD.encode(&encrypted_data))
}

/// 解密数据库中存储的密钥密文
pub fn decrypt_api_secret(encrypted_data: &str) -> Result<String> {
    let encrypted_bytes = general_purpose::STANDARD
        .decode(encrypted_data)
        .map_err(|e| anyhow!("Base64 decode failed: {}", e))?;

    if encrypted_bytes.len() < 12 {
        return Err(anyhow!("Invalid encrypted data: too short"));
    }

    let (nonce_bytes, ciphertext) = encrypted_bytes.split_at(12);
    let nonce = Nonce::from_slice(nonce_bytes);

    let key = Key::<Aes256Gcm>::from_slice(ENCRYPTION_KEY);
    let cipher = Aes256Gcm::new(key);

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| anyhow!("Decryption failed: {}", e))?;

    String::from_utf8(plaintext)
        .map_err(|e| anyhow!("UTF-8 conversion failed: {}", e))
}

/// 从明文密钥生成入库所需的 (key_hash, encrypted_key_value)
pub fn process_api_secret(secret: &str) -> Result<(String, String)> {
    let key_hash = hash_api_secret(secret);
    let encrypted_value = encrypt_api_secret(secret)?;
    Ok((key_hash, encrypted_value))
}
