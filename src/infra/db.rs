//! Database connection + table provisioning.
//!
//! The service owns its tables and creates them on startup; there is no
//! separate migration step. The `employees` table starts with the fixed
//! baseline columns and grows/shrinks at runtime through the field
//! endpoints.

use crate::infra::config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connects using `DATABASE_URL` and provisions all service tables.
pub async fn connect() -> anyhow::Result<PgPool> {
    let database_url = config::database_url();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    provision(&pool).await?;
    Ok(pool)
}

/// Creates the service tables if they do not exist yet.
pub async fn provision(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS employees (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            phone_number TEXT
        )",
    )
    .execute(pool)
    .await?;

    // Column descriptors for runtime fields: the declared semantic type of
    // every column the mutator manages.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS employee_fields (
            name TEXT PRIMARY KEY,
            field_type TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    // Seed descriptors for the baseline columns. `id` stays undeclared and
    // reports as `unknown`.
    sqlx::query(
        "INSERT INTO employee_fields (name, field_type)
         VALUES ('name', 'text'), ('email', 'email'), ('phone_number', 'phone')
         ON CONFLICT (name) DO NOTHING",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS employee_schema_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "INSERT INTO employee_schema_meta (key, value)
         VALUES ('schema_version', '0')
         ON CONFLICT (key) DO NOTHING",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
