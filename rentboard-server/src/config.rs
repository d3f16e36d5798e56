//! Server configuration, built once at startup and shared with handlers
//!
//! The CLI fills this from flags and environment variables; tests build it
//! directly with [`AppConfig::new`] and the `with_*` helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::models::{ContactNumber, ValidationError};

/// Database used when `DATABASE_URL` is unset
pub const DEFAULT_DATABASE_URL: &str = "sqlite://local.db?mode=rwc";

/// Contact that enquiry links open a chat with
pub const DEFAULT_WHATSAPP_NUMBER: &str = "2347077513836";

/// Largest request body accepted (uploads included)
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Configuration errors surfaced at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported database URL scheme: '{0}' (expected sqlite: or postgres(ql)://)")]
    UnsupportedDatabase(String),

    #[error("admin secret cannot be empty")]
    EmptyAdminSecret,

    #[error("invalid WhatsApp number: {0}")]
    InvalidContact(#[from] ValidationError),
}

/// Which SQL dialect the schema is created in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

impl DatabaseBackend {
    /// Detect the backend from an already-normalised URL.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else if url.starts_with("postgresql://") || url.starts_with("postgres://") {
            Ok(Self::Postgres)
        } else {
            let scheme = url.split(':').next().unwrap_or_default();
            Err(ConfigError::UnsupportedDatabase(scheme.to_owned()))
        }
    }
}

/// Apply defaults and legacy rewrites to a database URL.
///
/// - unset/blank → [`DEFAULT_DATABASE_URL`]
/// - `postgres://` → `postgresql://`
/// - file-backed `sqlite:` URLs without `mode=` get `mode=rwc`
pub fn normalize_database_url(raw: Option<&str>) -> String {
    let url = match raw.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return DEFAULT_DATABASE_URL.to_owned(),
    };

    if let Some(rest) = url.strip_prefix("postgres://") {
        return format!("postgresql://{}", rest);
    }

    if url.starts_with("sqlite:") && !is_memory_url(url) && !url.contains("mode=") {
        let sep = if url.contains('?') { '&' } else { '?' };
        return format!("{}{}mode=rwc", url, sep);
    }

    url.to_owned()
}

/// In-memory SQLite URLs need a single pinned connection.
pub fn is_memory_url(url: &str) -> bool {
    url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    pub bind_addr: SocketAddr,

    /// Normalised database URL
    pub database_url: String,

    /// Flat directory holding uploaded proofs and images
    pub upload_dir: PathBuf,

    /// Directory with `index.html` and `admin.html`
    pub static_dir: PathBuf,

    /// Shared secret for admin routes
    pub admin_secret: String,

    /// WhatsApp destination for enquiry links
    pub whatsapp_number: ContactNumber,

    /// Request body limit in bytes
    pub max_body_bytes: usize,

    /// Allow any CORS origin (default: false = localhost only)
    pub cors_permissive: bool,
}

impl AppConfig {
    /// Build a config with defaults for everything but the admin secret.
    pub fn new(admin_secret: impl Into<String>) -> Result<Self, ConfigError> {
        let admin_secret = admin_secret.into();
        if admin_secret.trim().is_empty() {
            return Err(ConfigError::EmptyAdminSecret);
        }

        Ok(Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            admin_secret,
            whatsapp_number: ContactNumber::new(DEFAULT_WHATSAPP_NUMBER)?,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors_permissive: false,
        })
    }

    pub fn with_database_url(mut self, raw: Option<&str>) -> Result<Self, ConfigError> {
        let url = normalize_database_url(raw);
        DatabaseBackend::from_url(&url)?;
        self.database_url = url;
        Ok(self)
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    pub fn with_whatsapp_number(mut self, number: &str) -> Result<Self, ConfigError> {
        self.whatsapp_number = ContactNumber::new(number)?;
        Ok(self)
    }

    pub fn backend(&self) -> Result<DatabaseBackend, ConfigError> {
        DatabaseBackend::from_url(&self.database_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_database_is_local_sqlite() {
        assert_eq!(normalize_database_url(None), DEFAULT_DATABASE_URL);
        assert_eq!(normalize_database_url(Some("  ")), DEFAULT_DATABASE_URL);
    }

    #[test]
    fn legacy_postgres_scheme_is_rewritten() {
        assert_eq!(
            normalize_database_url(Some("postgres://u:p@db:5432/app")),
            "postgresql://u:p@db:5432/app"
        );
        assert_eq!(
            normalize_database_url(Some("postgresql://db/app")),
            "postgresql://db/app"
        );
    }

    #[test]
    fn sqlite_file_urls_get_create_mode() {
        assert_eq!(
            normalize_database_url(Some("sqlite://data/app.db")),
            "sqlite://data/app.db?mode=rwc"
        );
        assert_eq!(
            normalize_database_url(Some("sqlite://app.db?cache=shared")),
            "sqlite://app.db?cache=shared&mode=rwc"
        );
        assert_eq!(
            normalize_database_url(Some("sqlite://app.db?mode=ro")),
            "sqlite://app.db?mode=ro"
        );
        assert_eq!(normalize_database_url(Some("sqlite::memory:")), "sqlite::memory:");
    }

    #[test]
    fn backend_detection() {
        assert_eq!(
            DatabaseBackend::from_url("sqlite::memory:").unwrap(),
            DatabaseBackend::Sqlite
        );
        assert_eq!(
            DatabaseBackend::from_url("postgresql://db/app").unwrap(),
            DatabaseBackend::Postgres
        );
        assert!(matches!(
            DatabaseBackend::from_url("mysql://db/app"),
            Err(ConfigError::UnsupportedDatabase(s)) if s == "mysql"
        ));
    }

    #[test]
    fn config_defaults() {
        let config = AppConfig::new("secret").unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.max_body_bytes, 25 * 1024 * 1024);
        assert_eq!(config.whatsapp_number.as_str(), DEFAULT_WHATSAPP_NUMBER);
        assert!(!config.cors_permissive);
        assert_eq!(config.backend().unwrap(), DatabaseBackend::Sqlite);
    }

    #[test]
    fn empty_admin_secret_is_rejected() {
        assert!(matches!(
            AppConfig::new(" "),
            Err(ConfigError::EmptyAdminSecret)
        ));
    }
}
