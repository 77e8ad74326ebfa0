//! Schema data structures
//!
//! These types represent catalog information as read from the database and
//! form the contract between introspection (produces) and code generation
//! (consumes). Column types are kept as the raw catalog strings; mapping them
//! to target-language types is the job of [`crate::typemap`].

/// The selected tables of one database
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    pub tables: Vec<Table>,
}

/// Database table
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    /// Columns in catalog (ordinal) order
    pub columns: Vec<Column>,
}

impl Table {
    /// Returns PascalCase struct name from snake_case table name
    pub fn struct_name(&self) -> String {
        to_pascal_case(&self.name)
    }
}

/// A table column as described by `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub is_nullable: bool,
    /// Coarse type classifier (`DATA_TYPE`), e.g. `int`
    pub data_type: String,
    /// Full type descriptor (`COLUMN_TYPE`), e.g. `int(10) unsigned`
    pub column_type: String,
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        is_nullable: bool,
        data_type: impl Into<String>,
        column_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            is_nullable,
            data_type: data_type.into(),
            column_type: column_type.into(),
        }
    }
}

/// Convert snake_case to PascalCase
///
/// Every underscore-delimited segment gets its first character upper-cased;
/// the rest of the segment is kept as is. Empty segments (leading, trailing or
/// doubled underscores) contribute nothing.
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    let first_upper = first.to_uppercase().to_string();
                    first_upper + chars.as_str()
                }
            }
        })
        .collect()
}

/// Check that a generated name can be used as an identifier in the output
///
/// Accepts a leading letter followed by letters, digits and underscores. A
/// leading `r#` (Rust raw identifier) is ignored.
pub fn is_valid_identifier(name: &str) -> bool {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            name != "_" && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
