//! Live schema registry for the employee table.
//!
//! The registry is deliberately read-through: the column set is re-read
//! from `information_schema` on every call because the structure can
//! change between any two requests. Declared semantic types come from the
//! `employee_fields` descriptor table; a live column with no descriptor
//! reports as unknown rather than failing.

use crate::app::error::ServiceError;
use crate::domain::schema::FieldType;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

pub const EMPLOYEE_TABLE: &str = "employees";

/// One live column plus its declared semantic type (`None` = unknown).
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub name: String,
    pub field_type: Option<FieldType>,
}

#[derive(Clone)]
pub struct SchemaRegistry {
    pool: PgPool,
}

impl SchemaRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The live column set, ordered by ordinal position. Never cached.
    pub async fn columns(&self) -> Result<Vec<ColumnDescriptor>, ServiceError> {
        let rows = sqlx::query(
            "SELECT column_name
             FROM information_schema.columns
             WHERE table_schema = 'public' AND table_name = $1
             ORDER BY ordinal_position",
        )
        .bind(EMPLOYEE_TABLE)
        .fetch_all(&self.pool)
        .await?;

        let declared = self.declared_types().await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("column_name")?;
            let field_type = declared.get(&name).copied();
            columns.push(ColumnDescriptor { name, field_type });
        }
        Ok(columns)
    }

    /// Just the live column names, in order.
    pub async fn column_names(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.columns().await?.into_iter().map(|c| c.name).collect())
    }

    /// Declared semantic type of a column; `None` when the name is not a
    /// recorded descriptor (callers must tolerate unknown gracefully).
    pub async fn type_of(&self, name: &str) -> Result<Option<FieldType>, ServiceError> {
        let row = sqlx::query("SELECT field_type FROM employee_fields WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .and_then(|r| r.try_get::<String, _>("field_type").ok())
            .and_then(|s| FieldType::parse(&s)))
    }

    /// Live columns whose declared type carries an attachment path.
    pub async fn file_columns(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self
            .columns()
            .await?
            .into_iter()
            .filter(|c| c.field_type.map(FieldType::is_file).unwrap_or(false))
            .map(|c| c.name)
            .collect())
    }

    /// Monotonic counter bumped by every schema mutation.
    pub async fn schema_version(&self) -> Result<i64, ServiceError> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM employee_schema_meta WHERE key = 'schema_version'",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(value.and_then(|v| v.parse::<i64>().ok()).unwrap_or(0))
    }

    async fn declared_types(&self) -> Result<HashMap<String, FieldType>, ServiceError> {
        let rows = sqlx::query("SELECT name, field_type FROM employee_fields")
            .fetch_all(&self.pool)
            .await?;

        let mut declared = HashMap::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name")?;
            let raw: String = row.try_get("field_type")?;
            if let Some(ft) = FieldType::parse(&raw) {
                declared.insert(name, ft);
            }
        }
        Ok(declared)
    }
}
