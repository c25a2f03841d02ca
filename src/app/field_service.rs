//! Structural mutations of the employee table.
//!
//! Each operation validates its identifiers against the allow-list, checks
//! the live column set, applies the native ALTER, keeps the descriptor
//! table in step, and bumps the schema version stamp.

use crate::app::error::ServiceError;
use crate::domain::schema::{validate_ident, FieldType, SchemaRegistry, EMPLOYEE_TABLE};
use sqlx::PgPool;

pub struct FieldService {
    pool: PgPool,
    registry: SchemaRegistry,
}

impl FieldService {
    pub fn new(pool: PgPool, registry: SchemaRegistry) -> Self {
        Self { pool, registry }
    }

    /// Appends a column of the declared semantic type.
    pub async fn add_column(&self, name: &str, declared: &str) -> Result<FieldType, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation(
                "field_name is required".to_string(),
            ));
        }
        if !validate_ident(name) {
            return Err(ServiceError::Validation(format!(
                "'{}' is not a valid column identifier",
                name
            )));
        }
        let field_type = FieldType::parse(declared).ok_or_else(|| {
            ServiceError::Validation(format!("invalid field type '{}'", declared))
        })?;

        let live = self.registry.column_names().await?;
        if live.iter().any(|c| c == name) {
            return Err(ServiceError::schema_rejected(format!(
                "column '{}' already exists",
                name
            )));
        }

        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            EMPLOYEE_TABLE,
            name,
            field_type.to_sql()
        );
        sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
            ServiceError::schema_failed(format!("failed adding column '{}': {}", name, e))
        })?;

        sqlx::query(
            "INSERT INTO employee_fields (name, field_type)
             VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET field_type = EXCLUDED.field_type",
        )
        .bind(name)
        .bind(field_type.as_str())
        .execute(&self.pool)
        .await?;

        self.bump_version().await?;
        Ok(field_type)
    }

    /// Renames a column; row contents are untouched and re-key under the
    /// new name. The `id` primary key may not be renamed.
    pub async fn rename_column(&self, old_name: &str, new_name: &str) -> Result<(), ServiceError> {
        let old_name = old_name.trim();
        let new_name = new_name.trim();
        if old_name.is_empty() || new_name.is_empty() {
            return Err(ServiceError::Validation(
                "both old and new field names are required".to_string(),
            ));
        }
        if !validate_ident(new_name) {
            return Err(ServiceError::Validation(format!(
                "'{}' is not a valid column identifier",
                new_name
            )));
        }
        if !validate_ident(old_name) {
            return Err(ServiceError::Validation(format!(
                "'{}' is not a valid column identifier",
                old_name
            )));
        }
        if old_name == "id" {
            return Err(ServiceError::Validation(
                "the id column cannot be renamed".to_string(),
            ));
        }

        let live = self.registry.column_names().await?;
        if !live.iter().any(|c| c == old_name) {
            return Err(ServiceError::schema_rejected(format!(
                "column '{}' does not exist",
                old_name
            )));
        }
        if live.iter().any(|c| c == new_name) {
            return Err(ServiceError::schema_rejected(format!(
                "column '{}' already exists",
                new_name
            )));
        }

        let sql = format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            EMPLOYEE_TABLE, old_name, new_name
        );
        sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
            ServiceError::schema_failed(format!(
                "failed renaming column '{}' to '{}': {}",
                old_name, new_name, e
            ))
        })?;

        // Descriptor follows the rename so the declared type survives.
        sqlx::query("UPDATE employee_fields SET name = $1 WHERE name = $2")
            .bind(new_name)
            .bind(old_name)
            .execute(&self.pool)
            .await?;

        self.bump_version().await?;
        Ok(())
    }

    /// Drops a column natively. Other columns' values are unchanged.
    pub async fn remove_column(&self, name: &str) -> Result<(), ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation(
                "field_name is required".to_string(),
            ));
        }
        if !validate_ident(name) {
            return Err(ServiceError::Validation(format!(
                "'{}' is not a valid column identifier",
                name
            )));
        }
        if name == "id" {
            return Err(ServiceError::Validation(
                "the id column cannot be removed".to_string(),
            ));
        }

        let live = self.registry.column_names().await?;
        if !live.iter().any(|c| c == name) {
            return Err(ServiceError::NotFound(format!(
                "column '{}' not found",
                name
            )));
        }

        let sql = format!("ALTER TABLE {} DROP COLUMN {}", EMPLOYEE_TABLE, name);
        sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
            ServiceError::schema_failed(format!("failed removing column '{}': {}", name, e))
        })?;

        sqlx::query("DELETE FROM employee_fields WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        self.bump_version().await?;
        Ok(())
    }

    async fn bump_version(&self) -> Result<(), ServiceError> {
        sqlx::query(
            "INSERT INTO employee_schema_meta (key, value)
             VALUES ('schema_version', '1')
             ON CONFLICT (key) DO UPDATE
             SET value = ((employee_schema_meta.value)::bigint + 1)::text",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
