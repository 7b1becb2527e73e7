pub mod config;
pub mod error;
pub mod pool;

// Re-exports for public API
pub use config::DbConnectionConfig;
pub use error::DbConnectionError;
pub use pool::{create_pool, sanitize_database_url, DbPool};
