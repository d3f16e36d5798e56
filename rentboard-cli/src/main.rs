//! rentboard CLI - runs the listings marketplace backend
//!
//! - `serve`: HTTP API, landing/admin pages and upload serving
//! - `migrate`: create the database schema and exit

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod serve;

use serve::{MigrateArgs, ServeArgs};

#[derive(Parser, Debug)]
#[command(name = "rentboard", version, about = "Property listings marketplace backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Create the database schema without serving
    Migrate(MigrateArgs),
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();
    init_tracing().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run_serve(args).await?,
        Commands::Migrate(args) => serve::run_migrate(args).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "rentboard",
            "serve",
            "--admin-secret",
            "s3cret",
            "--bind",
            "0.0.0.0:8080",
            "--upload-dir",
            "/tmp/up",
        ])
        .unwrap();

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.admin_secret, "s3cret");
                assert_eq!(args.bind.port(), 8080);
                assert_eq!(args.upload_dir.to_str(), Some("/tmp/up"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
