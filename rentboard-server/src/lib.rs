//! rentboard-server: listings marketplace backend
//!
//! Accepts property listings with proof and image uploads, serves public
//! search, turns enquiries into WhatsApp deep links, and exposes admin
//! moderation (verify, unverify, delete) behind a shared secret.

pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod storage;

pub use config::{AppConfig, ConfigError, DatabaseBackend};
pub use http::{build_router, prepare_state, run_server, ApiError, AppState, ServerError};
