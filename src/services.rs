// src/services.rs

pub mod account_service;
pub mod auth;
pub mod record_service;

pub use account_service::AccountService;
pub use auth::AuthService;
pub use record_service::RecordService;
