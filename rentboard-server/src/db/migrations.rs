//! Schema creation for the listings and enquiries tables
//!
//! Idempotent: every statement is `IF NOT EXISTS`, so it runs on each start.

use sqlx::AnyPool;

use super::repos::DbError;
use crate::config::DatabaseBackend;

const SQLITE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS listings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        rent INTEGER,
        location TEXT,
        owner_name TEXT NOT NULL,
        owner_email TEXT NOT NULL,
        owner_phone TEXT NOT NULL,
        proof_filename TEXT,
        property_images TEXT,
        is_verified INTEGER NOT NULL DEFAULT 0,
        contact_clicks INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enquiries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        listing_id INTEGER NOT NULL REFERENCES listings(id),
        message TEXT NOT NULL,
        whatsapp_url TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

// Integers are BIGINT and the verified flag is a 0/1 BIGINT so that rows
// decode identically through the Any driver on both backends.
const POSTGRES_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS listings (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        rent BIGINT,
        location TEXT,
        owner_name TEXT NOT NULL,
        owner_email TEXT NOT NULL,
        owner_phone TEXT NOT NULL,
        proof_filename TEXT,
        property_images TEXT,
        is_verified BIGINT NOT NULL DEFAULT 0 CHECK (is_verified IN (0, 1)),
        contact_clicks BIGINT NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enquiries (
        id BIGSERIAL PRIMARY KEY,
        listing_id BIGINT NOT NULL REFERENCES listings(id),
        message TEXT NOT NULL,
        whatsapp_url TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_listings_created_at ON listings (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_enquiries_listing_id ON enquiries (listing_id)",
];

/// Create tables and indexes for the given backend.
pub async fn run(pool: &AnyPool, backend: DatabaseBackend) -> Result<(), DbError> {
    tracing::info!(?backend, "Running schema migrations...");

    let tables = match backend {
        DatabaseBackend::Sqlite => SQLITE_SCHEMA,
        DatabaseBackend::Postgres => POSTGRES_SCHEMA,
    };

    for statement in tables.iter().chain(INDEXES) {
        sqlx::query(*statement).execute(pool).await?;
    }

    tracing::info!("Schema migrations complete");
    Ok(())
}
