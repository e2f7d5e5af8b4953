pub mod auth_dto;
pub mod chat_dto;
pub mod session_dto;
pub mod api_key_dto;
