//! Record access over the employee table.
//!
//! Every statement is composed against the live column set reported by
//! the [`SchemaRegistry`] at the time of the operation, never a cached
//! set, since the structure can change between any two requests. Column
//! identifiers are allow-list validated before interpolation; values
//! always travel as bind parameters.

use crate::app::error::ServiceError;
use crate::domain::schema::{validate_ident, FieldType, SchemaRegistry, EMPLOYEE_TABLE};
use crate::storage::attachments::{AttachmentStore, UploadedFile};
use serde_json::{Map, Value as JsonValue};
use sqlx::{PgPool, Row};
use std::collections::HashMap;

pub struct EmployeeService {
    pool: PgPool,
    registry: SchemaRegistry,
    attachments: AttachmentStore,
}

/// Result shape of list/search: ordered columns, their declared semantic
/// types (or `unknown`), and one mapping per record.
pub struct EmployeeListing {
    pub columns: Vec<String>,
    pub column_types: Vec<String>,
    pub data: Vec<JsonValue>,
}

impl EmployeeService {
    pub fn new(pool: PgPool, registry: SchemaRegistry, attachments: AttachmentStore) -> Self {
        Self {
            pool,
            registry,
            attachments,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Lists all employees, optionally narrowed to records whose `name`
    /// contains `search` case-insensitively. No pagination.
    pub async fn list(&self, search: Option<&str>) -> Result<EmployeeListing, ServiceError> {
        let descriptors = self.registry.columns().await?;
        let columns: Vec<String> = descriptors.iter().map(|c| c.name.clone()).collect();
        let column_types: Vec<String> = descriptors
            .iter()
            .map(|c| {
                c.field_type
                    .map(FieldType::as_str)
                    .unwrap_or("unknown")
                    .to_string()
            })
            .collect();

        let rows = match search {
            Some(q) => {
                let sql = format!(
                    "SELECT row_to_json({t}.*) AS record FROM {t} WHERE name ILIKE $1 ORDER BY id",
                    t = EMPLOYEE_TABLE
                );
                sqlx::query(&sql)
                    .bind(format!("%{}%", q))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT row_to_json({t}.*) AS record FROM {t} ORDER BY id",
                    t = EMPLOYEE_TABLE
                );
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let record: JsonValue = row.try_get("record")?;
            data.push(record);
        }

        Ok(EmployeeListing {
            columns,
            column_types,
            data,
        })
    }

    /// Creates a record from the non-file fields, then stores each file and
    /// writes its path into the corresponding column. The insert is not
    /// rolled back if a later file step fails; the error names the record
    /// that already exists.
    pub async fn create(
        &self,
        fields: Map<String, JsonValue>,
        files: Vec<UploadedFile>,
    ) -> Result<i64, ServiceError> {
        let types = self.live_types().await?;

        // Discard blank scalars before judging emptiness.
        let fields: Vec<(String, JsonValue)> = fields
            .into_iter()
            .filter(|(_, value)| !is_blank(value))
            .collect();

        if fields.is_empty() && files.is_empty() {
            return Err(ServiceError::Validation(
                "no valid data provided".to_string(),
            ));
        }

        for (name, _) in &fields {
            check_column(name, &types)?;
        }
        for file in &files {
            check_column(&file.field_name, &types)?;
        }

        let id: i64 = if fields.is_empty() {
            let sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING id", EMPLOYEE_TABLE);
            let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
            row.try_get("id")
                .map_err(|e| ServiceError::Persistence(format!("failed to retrieve id: {}", e)))?
        } else {
            let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
            let placeholders: Vec<String> = fields
                .iter()
                .enumerate()
                .map(|(idx, (name, _))| placeholder(types.get(name.as_str()).copied().flatten(), idx + 1))
                .collect();

            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
                EMPLOYEE_TABLE,
                names.join(", "),
                placeholders.join(", ")
            );

            let mut query = sqlx::query(&sql);
            for (name, value) in &fields {
                query = bind_field(query, types.get(name.as_str()).copied().flatten(), value);
            }

            let row = query.fetch_one(&self.pool).await?;
            row.try_get("id")
                .map_err(|e| ServiceError::Persistence(format!("failed to retrieve id: {}", e)))?
        };

        for file in files {
            let stored_path = self
                .attachments
                .save(&file.field_name, &file.bytes, &file.file_name)
                .await
                .map_err(|e| partial(e, &format!("record {} was created", id)))?;

            let sql = format!(
                "UPDATE {} SET {} = $1 WHERE id = $2",
                EMPLOYEE_TABLE, file.field_name
            );
            sqlx::query(&sql)
                .bind(&stored_path)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    ServiceError::Persistence(format!(
                        "record {} was created but writing path for '{}' failed: {}",
                        id, file.field_name, e
                    ))
                })?;
        }

        Ok(id)
    }

    /// Returns the full record as a mapping.
    pub async fn retrieve(&self, id: i64) -> Result<JsonValue, ServiceError> {
        let sql = format!(
            "SELECT row_to_json({t}.*) AS record FROM {t} WHERE id = $1",
            t = EMPLOYEE_TABLE
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(r.try_get("record")?),
            None => Err(ServiceError::NotFound(format!("employee {} not found", id))),
        }
    }

    /// Applies a single multi-column update for `fields`, then the per-file
    /// store-and-update loop. A failure mid-loop leaves earlier writes
    /// committed; the error says so. Empty fields and files is a no-op.
    pub async fn update(
        &self,
        id: i64,
        fields: Map<String, JsonValue>,
        files: Vec<UploadedFile>,
    ) -> Result<(), ServiceError> {
        if fields.is_empty() && files.is_empty() {
            return Ok(());
        }

        let types = self.live_types().await?;

        for (name, _) in &fields {
            check_column(name, &types)?;
        }
        for file in &files {
            check_column(&file.field_name, &types)?;
        }

        if !fields.is_empty() {
            let assignments: Vec<String> = fields
                .iter()
                .enumerate()
                .map(|(idx, (name, _))| {
                    format!(
                        "{} = {}",
                        name,
                        placeholder(types.get(name.as_str()).copied().flatten(), idx + 1)
                    )
                })
                .collect();

            let sql = format!(
                "UPDATE {} SET {} WHERE id = ${}",
                EMPLOYEE_TABLE,
                assignments.join(", "),
                fields.len() + 1
            );

            let mut query = sqlx::query(&sql);
            for (name, value) in &fields {
                query = bind_field(query, types.get(name.as_str()).copied().flatten(), value);
            }
            let result = query.bind(id).execute(&self.pool).await?;

            if result.rows_affected() == 0 {
                return Err(ServiceError::NotFound(format!("employee {} not found", id)));
            }
        }

        let mut applied: Vec<String> = fields.keys().cloned().collect();

        for file in files {
            // Previous path, for supersede cleanup after the new one lands.
            let sql_old = format!(
                "SELECT {}::text FROM {} WHERE id = $1",
                file.field_name, EMPLOYEE_TABLE
            );
            let existing: Option<Option<String>> = sqlx::query_scalar(&sql_old)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            let old_path = match existing {
                Some(value) => value,
                None => {
                    return Err(ServiceError::NotFound(format!("employee {} not found", id)))
                }
            };

            let context = if applied.is_empty() {
                format!("employee {}", id)
            } else {
                format!("employee {} ({} already updated)", id, applied.join(", "))
            };
            let stored_path = self
                .attachments
                .save(&file.field_name, &file.bytes, &file.file_name)
                .await
                .map_err(|e| partial(e, &context))?;

            let sql = format!(
                "UPDATE {} SET {} = $1 WHERE id = $2",
                EMPLOYEE_TABLE, file.field_name
            );
            let result = sqlx::query(&sql)
                .bind(&stored_path)
                .bind(id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(ServiceError::NotFound(format!("employee {} not found", id)));
            }

            // The old file is superseded; a cleanup failure never fails the
            // request.
            if let Some(old) = old_path {
                if old != stored_path {
                    if let Err(e) = self.attachments.delete(&old).await {
                        eprintln!("> attachment cleanup failed for '{}': {}", old, e);
                    }
                }
            }

            applied.push(file.field_name);
        }

        Ok(())
    }

    /// Removes the row. Deleting an id twice fails the second time.
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        // Collect attachment paths before the row goes away.
        let file_columns = self.registry.file_columns().await?;
        let mut stored_paths: Vec<String> = Vec::new();
        if !file_columns.is_empty() {
            let selected: Vec<String> = file_columns
                .iter()
                .filter(|c| validate_ident(c))
                .map(|c| format!("{c}::text AS {c}"))
                .collect();
            let sql = format!(
                "SELECT {} FROM {} WHERE id = $1",
                selected.join(", "),
                EMPLOYEE_TABLE
            );
            if let Some(row) = sqlx::query(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            {
                for column in &file_columns {
                    if let Ok(Some(path)) = row.try_get::<Option<String>, _>(column.as_str()) {
                        stored_paths.push(path);
                    }
                }
            }
        }

        let sql = format!("DELETE FROM {} WHERE id = $1", EMPLOYEE_TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("employee {} not found", id)));
        }

        for path in stored_paths {
            if let Err(e) = self.attachments.delete(&path).await {
                eprintln!("> attachment cleanup failed for '{}': {}", path, e);
            }
        }

        Ok(())
    }

    async fn live_types(&self) -> Result<HashMap<String, Option<FieldType>>, ServiceError> {
        Ok(self
            .registry
            .columns()
            .await?
            .into_iter()
            .map(|c| (c.name, c.field_type))
            .collect())
    }
}

/// A referenced column must be a valid identifier and a member of the live
/// column set; `id` is assigned by the store and immutable.
fn check_column(
    name: &str,
    types: &HashMap<String, Option<FieldType>>,
) -> Result<(), ServiceError> {
    if name == "id" {
        return Err(ServiceError::Validation(
            "the id column is assigned by the store".to_string(),
        ));
    }
    if !validate_ident(name) || !types.contains_key(name) {
        return Err(ServiceError::Validation(format!(
            "unknown column '{}'",
            name
        )));
    }
    Ok(())
}

/// Empty or whitespace-only scalars are discarded on create.
fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Placeholder with an explicit cast for non-text affinities, so scalar
/// strings from multipart forms still land in typed columns.
fn placeholder(declared: Option<FieldType>, idx: usize) -> String {
    match declared {
        Some(FieldType::Number) => format!("${}::bigint", idx),
        Some(FieldType::Checkbox) => format!("${}::boolean", idx),
        Some(FieldType::Date) => format!("${}::date", idx),
        _ => format!("${}", idx),
    }
}

fn bind_field<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    declared: Option<FieldType>,
    value: &JsonValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    match declared {
        Some(FieldType::Number) | Some(FieldType::Checkbox) | Some(FieldType::Date) => {
            if value.is_null() {
                query.bind(None::<String>)
            } else if let Some(s) = value.as_str() {
                query.bind(s.to_string())
            } else if let Some(n) = value.as_i64() {
                query.bind(n)
            } else if let Some(f) = value.as_f64() {
                query.bind(f)
            } else if let Some(b) = value.as_bool() {
                query.bind(b)
            } else {
                query.bind(value.to_string())
            }
        }
        // Text-affinity columns: stringify bare scalars so a JSON number
        // still lands in a TEXT column.
        _ => {
            if value.is_null() {
                query.bind(None::<String>)
            } else if let Some(s) = value.as_str() {
                query.bind(s.to_string())
            } else {
                query.bind(value.to_string())
            }
        }
    }
}

fn partial(e: ServiceError, context: &str) -> ServiceError {
    match e {
        ServiceError::Storage(msg) => ServiceError::Storage(format!("{}: {}", context, msg)),
        ServiceError::Validation(msg) => ServiceError::Validation(format!("{}: {}", context, msg)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_scalars_are_discarded() {
        assert!(is_blank(&JsonValue::Null));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!("   ")));
        assert!(!is_blank(&json!("x")));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!(false)));
    }

    #[test]
    fn placeholders_cast_by_declared_type() {
        assert_eq!(placeholder(Some(FieldType::Number), 1), "$1::bigint");
        assert_eq!(placeholder(Some(FieldType::Checkbox), 2), "$2::boolean");
        assert_eq!(placeholder(Some(FieldType::Date), 3), "$3::date");
        assert_eq!(placeholder(Some(FieldType::Email), 4), "$4");
        assert_eq!(placeholder(None, 5), "$5");
    }

    #[test]
    fn unknown_and_reserved_columns_are_rejected() {
        let mut types: HashMap<String, Option<FieldType>> = HashMap::new();
        types.insert("id".to_string(), None);
        types.insert("name".to_string(), Some(FieldType::Text));

        assert!(check_column("name", &types).is_ok());
        assert!(matches!(
            check_column("id", &types),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            check_column("salary", &types),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            check_column("name; --", &types),
            Err(ServiceError::Validation(_))
        ));
    }
}
