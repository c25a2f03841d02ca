//! The employee table's column universe: semantic field types, identifier
//! validation, and the live-schema registry.

pub mod field_type;
pub mod registry;

pub use field_type::FieldType;
pub use registry::{ColumnDescriptor, SchemaRegistry, EMPLOYEE_TABLE};

/// Allow-list check for anything interpolated into a statement as an
/// identifier. Values never go through here; they are always bound.
pub fn validate_ident(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
