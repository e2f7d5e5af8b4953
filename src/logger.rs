use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use tracing_appender::{non_blocking, rolling};
use anyhow::Result;

/// 日志级别枚举
#[derive(Debug, Clone)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for &'static str {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// 日志配置结构体
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 日志文件目录
    pub log_dir: String,
    /// 日志文件名前缀
    pub file_prefix: String,
    /// 是否启用控制台输出
    pub console_output: bool,
    /// 文件日志是否使用JSON格式
    pub json_format: bool,
    /// 日志文件滚动策略 (daily, hourly)
    pub rotation: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_dir: "logs".to_string(),
            file_prefix: "chat-relay".to_string(),
            console_output: true,
            json_format: false,
            rotation: "daily".to_string(),
        }
    }
}

/// 初始化日志系统
///
/// RUST_LOG 环境变量优先于 config.level
pub fn init_logger(config: LogConfig) -> Result<()> {
    // 确保日志目录存在
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = match config.rotation.as_str() {
        "hourly" => rolling::hourly(&config.log_dir, &config.file_prefix),
        _ => rolling::daily(&config.log_dir, &config.file_prefix),
    };

    let (non_blocking_file, guard) = non_blocking(file_appender);

    let default_directive = format!(
        "{}={}",
        env!("CARGO_PKG_NAME").replace("-", "_"),
        <&str>::from(config.level)
    );
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(env_filter);

    // 文件日志：JSON 或者纯文本，带来源定位信息
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // 控制台日志保持简洁
    if config.json_format {
        let console_layer = config.console_output.then(|| {
            fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(true)
                .with_target(false)
        });
        registry.with(file_layer.json()).with(console_layer).init();
    } else {
        let console_layer = config.console_output.then(|| {
            fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(true)
                .with_target(false)
        });
        registry.with(file_layer).with(console_layer).init();
    }

    // 防止guard被丢弃，否则文件日志会丢失
    std::mem::forget(guard);

    Ok(())
}

/// 快速初始化开发环境日志
pub fn init_dev_logger() -> Result<()> {
    let config = LogConfig {
        level: LogLevel::Debug,
        file_prefix: "dev".to_string(),
        ..LogConfig::default()
    };
    init_logger(config)
}

/// 快速初始化生产环境日志
pub fn init_prod_logger() -> Result<()> {
    let config = LogConfig {
        log_dir: "/var/log/chat-relay".to_string(),
        console_output: false,
        json_format: true,
        ..LogConfig::default()
    };
    init_logger(config)
}
