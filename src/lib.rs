pub mod auth;
pub mod dao;
pub mod llm_api;
pub mod logger;
pub mod web;
