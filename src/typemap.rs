//! MySQL column type classification
//!
//! Classifies a column into a language-neutral [`FieldType`]. Each code
//! generator then renders the field type as a concrete type name plus the
//! import it requires (see [`crate::codegen::CodeGenerator::map_type`]).

/// Semantic type of a generated field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Fixed-width integer (`bits` is 8, 16 or 64)
    Integer { bits: u8, unsigned: bool },
    /// Any nullable integer column
    NullableInteger,
    Float,
    NullableFloat,
    Text,
    /// Nullable text, serialized as JSON `null` when absent
    NullableText,
    /// Date and time columns, always optional
    Timestamp,
}

/// A field type rendered for one target language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    pub type_name: String,
    /// Supporting module the type needs, if any
    pub import: Option<String>,
}

impl MappedType {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            import: None,
        }
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.import = Some(import.into());
        self
    }
}

/// Classify a column from its catalog description
///
/// `base_type` is the `DATA_TYPE` classifier and `full_type` the complete
/// `COLUMN_TYPE` descriptor, which is only consulted for a trailing
/// `unsigned` token. Returns `None` for base types outside the supported set.
pub fn classify(nullable: bool, base_type: &str, full_type: &str) -> Option<FieldType> {
    let base = base_type.trim().to_lowercase();
    let unsigned = is_unsigned(full_type);

    let field_type = match base.as_str() {
        "int" | "smallint" | "tinyint" if nullable => FieldType::NullableInteger,
        "int" => FieldType::Integer { bits: 64, unsigned },
        "smallint" => FieldType::Integer { bits: 16, unsigned },
        "tinyint" => FieldType::Integer { bits: 8, unsigned },
        "decimal" if nullable => FieldType::NullableFloat,
        "decimal" => FieldType::Float,
        "varchar" | "char" | "text" if nullable => FieldType::NullableText,
        "varchar" | "char" | "text" => FieldType::Text,
        // Temporal columns are optional regardless of nullability
        "datetime" | "date" | "timestamp" => FieldType::Timestamp,
        _ => return None,
    };

    Some(field_type)
}

/// Check for a trailing `unsigned` token, e.g. `int(10) unsigned`
fn is_unsigned(full_type: &str) -> bool {
    full_type
        .split_whitespace()
        .last()
        .is_some_and(|token| token.eq_ignore_ascii_case("unsigned"))
}
