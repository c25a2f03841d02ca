//! Splits an inbound employee payload into scalar fields and file parts.
//!
//! JSON bodies carry scalars only; multipart bodies may intermix scalar
//! parts and file parts. The split is decided here, at the boundary, from
//! the request content type and each part's metadata, never by runtime
//! type inspection deeper in.

use crate::app::error::ServiceError;
use crate::storage::attachments::UploadedFile;
use axum::extract::{Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use axum::RequestExt;
use serde_json::{Map, Value as JsonValue};

pub struct RecordPayload {
    pub fields: Map<String, JsonValue>,
    pub files: Vec<UploadedFile>,
}

pub async fn parse_record_payload(request: Request) -> Result<RecordPayload, ServiceError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart: Multipart = request
            .extract()
            .await
            .map_err(|e| ServiceError::Validation(format!("invalid multipart body: {}", e)))?;

        let mut fields = Map::new();
        let mut files = Vec::new();

        while let Some(part) = multipart
            .next_field()
            .await
            .map_err(|e| ServiceError::Validation(format!("malformed multipart part: {}", e)))?
        {
            let name = match part.name() {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => continue,
            };

            // A filename marks a file part; everything else is a scalar.
            if let Some(file_name) = part.file_name().map(|s| s.to_string()) {
                let bytes = part.bytes().await.map_err(|e| {
                    ServiceError::Validation(format!("failed reading part '{}': {}", name, e))
                })?;
                files.push(UploadedFile {
                    field_name: name,
                    file_name,
                    bytes,
                });
            } else {
                let text = part.text().await.map_err(|e| {
                    ServiceError::Validation(format!("failed reading part '{}': {}", name, e))
                })?;
                fields.insert(name, JsonValue::String(text));
            }
        }

        Ok(RecordPayload { fields, files })
    } else {
        let Json(body): Json<JsonValue> = request
            .extract()
            .await
            .map_err(|e| ServiceError::Validation(format!("invalid JSON body: {}", e)))?;

        let fields = body
            .as_object()
            .cloned()
            .ok_or_else(|| {
                ServiceError::Validation("request body must be a JSON object".to_string())
            })?;

        Ok(RecordPayload {
            fields,
            files: Vec::new(),
        })
    }
}
