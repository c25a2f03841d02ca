use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Semantic type a caller may declare for a runtime column.
///
/// Each variant maps to exactly one native column affinity; `image` and
/// `file` columns hold the stored attachment path, not the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Email,
    Phone,
    Url,
    Checkbox,
    Image,
    File,
}

impl FieldType {
    /// Native column type used in DDL.
    pub fn to_sql(self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Email | FieldType::Phone | FieldType::Url => "TEXT",
            FieldType::Number => "BIGINT",
            FieldType::Date => "DATE",
            FieldType::Checkbox => "BOOLEAN",
            FieldType::Image | FieldType::File => "TEXT",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Url => "url",
            FieldType::Checkbox => "checkbox",
            FieldType::Image => "image",
            FieldType::File => "file",
        }
    }

    pub fn parse(s: &str) -> Option<FieldType> {
        match s {
            "text" => Some(FieldType::Text),
            "number" => Some(FieldType::Number),
            "date" => Some(FieldType::Date),
            "email" => Some(FieldType::Email),
            "phone" => Some(FieldType::Phone),
            "url" => Some(FieldType::Url),
            "checkbox" => Some(FieldType::Checkbox),
            "image" => Some(FieldType::Image),
            "file" => Some(FieldType::File),
            _ => None,
        }
    }

    /// Columns of these types carry attachment paths.
    pub fn is_file(self) -> bool {
        matches!(self, FieldType::Image | FieldType::File)
    }
}
