use sqlx::postgres::PgPoolOptions;
use sqlx::Row;

use employee_records::infra::config;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--create-media-root]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL, JWT_SECRET\n\
         Optional:\n\
           MEDIA_ROOT (default ./media), BIND_ADDR, MAX_UPLOAD_BYTES\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let create_media_root = args.iter().any(|a| a == "--create-media-root");

    // Force-read config (nice error messages if missing)
    let database_url = config::database_url();
    let _ = config::jwt_secret();
    let media_root = config::media_root();

    println!("> Preflight:");
    println!("  MEDIA_ROOT={}", media_root);
    println!("  BIND_ADDR={}", config::bind_addr());
    println!("  MAX_UPLOAD_BYTES={}", config::max_upload_bytes());

    // Basic database connectivity
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    println!("  Database reachable.");

    // Employee table presence (provisioned on first server start)
    let count: i64 = sqlx::query(
        "SELECT COUNT(*)::bigint AS cnt
         FROM information_schema.columns
         WHERE table_schema = 'public' AND table_name = 'employees'",
    )
    .fetch_one(&pool)
    .await?
    .try_get("cnt")?;
    if count == 0 {
        println!("  employees table not provisioned yet (created on first server start).");
    } else {
        println!("  employees table present with {} columns.", count);
    }

    // Media root existence + writability
    let media_path = std::path::Path::new(&media_root);
    if !media_path.exists() {
        if create_media_root {
            std::fs::create_dir_all(media_path)?;
            println!("  Media root created.");
        } else {
            return Err(anyhow::anyhow!(
                "Media root '{}' does not exist. Re-run with --create-media-root",
                media_root
            ));
        }
    }
    let probe = media_path.join(".preflight_probe");
    std::fs::write(&probe, b"ok")
        .map_err(|e| anyhow::anyhow!("Media root '{}' is not writable: {}", media_root, e))?;
    std::fs::remove_file(&probe)?;
    println!("  Media root is writable.");

    println!("> Preflight OK.");
    Ok(())
}
