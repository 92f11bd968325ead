pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod extraction;
pub mod models;
pub mod service;

pub use self::config::AppConfig;
pub use db::{create_pool, ensure_schema};
pub use error::AppError;
pub use service::ReceiptService;
