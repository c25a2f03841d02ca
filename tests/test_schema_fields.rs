//! End-to-end schema mutation flow: add/rename/remove columns, typed
//! runtime columns, and concurrent mutation vs. record writes under the
//! schema lock.
//!
//! Requires a reachable Postgres via `DATABASE_URL`.

use serde_json::{json, Value as JsonValue};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::sync::RwLock;

use employee_records::infra::db;
use employee_records::transport;
use employee_records::{
    AttachmentStore, AuthService, EmployeeService, FieldService, FieldType, SchemaRegistry,
};

async fn start_server(
    media_root: &std::path::Path,
) -> Result<(String, sqlx::PgPool), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&std::env::var("DATABASE_URL")?)
        .await?;

    for table in [
        "employees",
        "employee_fields",
        "employee_schema_meta",
        "users",
    ] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {} CASCADE", table))
            .execute(&pool)
            .await?;
    }
    db::provision(&pool).await?;

    let registry = SchemaRegistry::new(pool.clone());
    let attachments = AttachmentStore::new(media_root, 10 * 1024 * 1024);
    let app_state = transport::http::AppState {
        employees: Arc::new(EmployeeService::new(
            pool.clone(),
            registry.clone(),
            attachments,
        )),
        fields: Arc::new(FieldService::new(pool.clone(), registry)),
        auth: Arc::new(AuthService::new(
            pool.clone(),
            "test-secret".to_string(),
            900,
        )),
        schema_lock: Arc::new(RwLock::new(())),
        jwt_secret: Arc::new("test-secret".to_string()),
    };
    let router = transport::http::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Ok((format!("http://127.0.0.1:{}", port), pool))
}

async fn list_columns(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> Result<(Vec<String>, Vec<String>), Box<dyn std::error::Error>> {
    let listing = client
        .get(format!("{}/employees/", base_url))
        .bearer_auth(token)
        .send()
        .await?
        .json::<JsonValue>()
        .await?;
    let columns = listing["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect();
    let types = listing["column_types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect();
    Ok((columns, types))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_schema_fields() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- test_schema_fields ---");

    let media_dir = tempfile::tempdir()?;
    let (base_url, pool) = start_server(media_dir.path()).await?;
    let client = reqwest::Client::new();
    let registry = SchemaRegistry::new(pool.clone());

    client
        .post(format!("{}/signup/", base_url))
        .json(&json!({"username": "schema-admin", "password": "hunter2secret"}))
        .send()
        .await?;
    let token = client
        .post(format!("{}/login/", base_url))
        .json(&json!({"username": "schema-admin", "password": "hunter2secret"}))
        .send()
        .await?
        .json::<JsonValue>()
        .await?["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    // --- ADD FIELD ---
    println!("> add-field");
    let resp = client
        .post(format!("{}/employees/add-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"field_name": "department", "field_type": "text"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 201);

    let (columns, types) = list_columns(&client, &base_url, &token).await?;
    let idx = columns.iter().position(|c| c == "department").unwrap();
    assert_eq!(types[idx], "text");

    // The registry reports the declared semantic type, and the sentinel
    // for names it has never seen.
    assert_eq!(registry.type_of("department").await?, Some(FieldType::Text));
    assert_eq!(registry.type_of("ghost").await?, None);

    // Duplicate name, bad type, and bad identifier are all rejected.
    let resp = client
        .post(format!("{}/employees/add-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"field_name": "department", "field_type": "text"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(format!("{}/employees/add-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"field_name": "level", "field_type": "blob"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(format!("{}/employees/add-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"field_name": "bad name; --", "field_type": "text"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    // Typed runtime columns: values land with their native affinity.
    println!("> typed columns");
    for (name, ftype) in [("age", "number"), ("active", "checkbox"), ("hired", "date")] {
        let resp = client
            .post(format!("{}/employees/add-field/", base_url))
            .bearer_auth(&token)
            .json(&json!({"field_name": name, "field_type": ftype}))
            .send()
            .await?;
        assert_eq!(resp.status(), 201);
    }
    assert_eq!(registry.type_of("age").await?, Some(FieldType::Number));

    let resp = client
        .post(format!("{}/employees/", base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Dana",
            "department": "Platform",
            "age": "41",
            "active": "true",
            "hired": "2024-02-01"
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), 201);
    let dana_id = resp.json::<JsonValue>().await?["data"]["id"].as_i64().unwrap();

    let dana = client
        .get(format!("{}/employees/{}/", base_url, dana_id))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<JsonValue>()
        .await?;
    assert_eq!(dana["department"], "Platform");
    assert_eq!(dana["age"], 41);
    assert_eq!(dana["active"], true);
    assert_eq!(dana["hired"], "2024-02-01");

    // --- EDIT FIELD ---
    println!("> edit-field");
    let resp = client
        .put(format!("{}/employees/edit-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"old_field_name": "department", "new_field_name": "dept"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);

    // Row contents re-key under the new name; the old name is gone and the
    // declared type survives the rename.
    let dana = client
        .get(format!("{}/employees/{}/", base_url, dana_id))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<JsonValue>()
        .await?;
    assert_eq!(dana["dept"], "Platform");
    assert!(dana.get("department").is_none());

    let (columns, types) = list_columns(&client, &base_url, &token).await?;
    assert!(!columns.iter().any(|c| c == "department"));
    let idx = columns.iter().position(|c| c == "dept").unwrap();
    assert_eq!(types[idx], "text");

    let resp = client
        .put(format!("{}/employees/edit-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"old_field_name": "missing", "new_field_name": "other"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    let resp = client
        .put(format!("{}/employees/edit-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"old_field_name": "", "new_field_name": "other"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    // --- REMOVE FIELD ---
    println!("> remove-field");
    let resp = client
        .delete(format!("{}/employees/add-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"field_name": "dept"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);

    let (columns, _) = list_columns(&client, &base_url, &token).await?;
    assert!(!columns.iter().any(|c| c == "dept"));

    // Remaining column values are untouched by the drop.
    let dana = client
        .get(format!("{}/employees/{}/", base_url, dana_id))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<JsonValue>()
        .await?;
    assert_eq!(dana["name"], "Dana");
    assert_eq!(dana["age"], 41);
    assert!(dana.get("dept").is_none());

    let resp = client
        .delete(format!("{}/employees/add-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"field_name": "dept"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 404);

    let resp = client
        .delete(format!("{}/employees/add-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"field_name": ""}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    let resp = client
        .delete(format!("{}/employees/add-field/", base_url))
        .bearer_auth(&token)
        .json(&json!({"field_name": "id"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    // --- CONCURRENT ADD-COLUMN vs CREATE ---
    // Structure changes and record writes race here; the schema lock must
    // keep every statement consistent with the column set it was built
    // against.
    println!("> concurrent add-field / create");
    let mut tasks = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        let base_url = base_url.clone();
        let token = token.clone();
        tasks.push(tokio::spawn(async move {
            client
                .post(format!("{}/employees/", base_url))
                .bearer_auth(&token)
                .json(&json!({"name": format!("worker_{}", i)}))
                .send()
                .await
                .map(|r| r.status().as_u16())
        }));
    }
    for i in 0..3 {
        let client = client.clone();
        let base_url = base_url.clone();
        let token = token.clone();
        tasks.push(tokio::spawn(async move {
            client
                .post(format!("{}/employees/add-field/", base_url))
                .bearer_auth(&token)
                .json(&json!({
                    "field_name": format!("extra_{}", i),
                    "field_type": "text"
                }))
                .send()
                .await
                .map(|r| r.status().as_u16())
        }));
    }

    for task in tasks {
        let status = task.await??;
        assert_eq!(status, 201);
    }

    let (columns, _) = list_columns(&client, &base_url, &token).await?;
    for i in 0..3 {
        assert!(columns.iter().any(|c| c == &format!("extra_{}", i)));
    }
    let listing = client
        .get(format!("{}/employees/?search=worker", base_url))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<JsonValue>()
        .await?;
    assert_eq!(listing["data"].as_array().unwrap().len(), 10);

    // Every mutation bumped the version stamp: department, age, active,
    // hired, the rename, the removal, and the three concurrent extras.
    assert_eq!(registry.schema_version().await?, 9);

    println!("--- test_schema_fields OK ---");
    Ok(())
}
