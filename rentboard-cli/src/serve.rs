use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rentboard_server::config::{DEFAULT_MAX_BODY_BYTES, DEFAULT_WHATSAPP_NUMBER};
use rentboard_server::db::{self, migrations};
use rentboard_server::{AppConfig, DatabaseBackend};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Database URL (default: local SQLite file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory for uploaded proofs and images
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Directory containing index.html and admin.html
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Shared secret for admin routes
    #[arg(long, env = "ADMIN_SECRET", hide_env_values = true)]
    pub admin_secret: String,

    /// WhatsApp number enquiries are routed to
    #[arg(long, env = "WHATSAPP_NUMBER", default_value = DEFAULT_WHATSAPP_NUMBER)]
    pub whatsapp_number: String,

    /// Maximum request body size in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Allow any CORS origin instead of localhost only
    #[arg(long, env = "CORS_PERMISSIVE")]
    pub cors_permissive: bool,
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Database URL (default: local SQLite file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

impl ServeArgs {
    fn into_config(self) -> Result<AppConfig> {
        let mut config = AppConfig::new(self.admin_secret)?
            .with_database_url(self.database_url.as_deref())?
            .with_upload_dir(self.upload_dir)
            .with_static_dir(self.static_dir)
            .with_whatsapp_number(&self.whatsapp_number)?;
        config.bind_addr = self.bind;
        config.max_body_bytes = self.max_body_bytes;
        config.cors_permissive = self.cors_permissive;
        Ok(config)
    }
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.into_config().context("invalid server configuration")?;
    tracing::info!(
        backend = ?config.backend()?,
        upload_dir = %config.upload_dir.display(),
        "starting rentboard"
    );

    rentboard_server::run_server(config).await?;
    Ok(())
}

pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let url = rentboard_server::config::normalize_database_url(args.database_url.as_deref());
    let backend = DatabaseBackend::from_url(&url)?;

    let pool = db::create_pool(&url)
        .await
        .context("could not connect to database")?;
    migrations::run(&pool, backend).await?;
    pool.close().await;

    tracing::info!(?backend, "schema up to date");
    Ok(())
}
