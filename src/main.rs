use std::net::SocketAddr;
use chat_relay::{logger::init_dev_logger, web::WebServer};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    //*
    //* Initialize logger
    //*
    if let Err(e) = init_dev_logger() {
        eprintln!("Failed to initialize logger: {}", e);
        std::process::exit(1);
    }
    info!("Logger initialized successfully");

    //*
    //* Configuration from environment
    //*
    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/app.db?mode=rwc".to_string());
    let init_sql_path = std::env::var("INIT_SQL_PATH")
        .unwrap_or_else(|_| "data/init.sql".to_string());
    let bind_addr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let upstream_base_url = std::env::var("BLACKBOX_API_URL")
        .unwrap_or_else(|_| chat_relay::llm_api::blackbox::DEFAULT_BASE_URL.to_string());

    info!(db_url = %db_url, bind_addr = %bind_addr, "Starting chat relay");

    // SQLite文件放在data目录下
    std::fs::create_dir_all("data")?;

    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| format!("Invalid bind address: {}", e))?;

    let server = WebServer::new(db_url, init_sql_path, upstream_base_url);
    server.start(addr).await?;

    Ok(())
}
