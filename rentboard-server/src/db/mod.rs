//! Database layer - connection pool, schema and repositories
//!
//! - sqlx `Any` pool so the same queries run on SQLite and PostgreSQL
//! - Multi-step mutations (enquiry, delete) run in a transaction
//! - Missing rows surface as `DbError::NotFound`, never as empty success

pub mod pool;
pub mod migrations;
pub mod repos;

pub use pool::create_pool;
pub use repos::*;
