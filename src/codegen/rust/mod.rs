//! Rust code generator
//!
//! Generates serde-derived Rust structs. Nullable columns become `Option`s,
//! except nullable text which uses the generated `JsonNullString`.

use std::collections::BTreeSet;

use heck::ToSnakeCase;
use minijinja::Environment;
use tracing::debug;

use crate::codegen::{CodeGenerator, TableModel};
use crate::error::ModelGenError;
use crate::typemap::{FieldType, MappedType};

const BASE_IMPORTS: [&str; 1] = ["serde::{Deserialize, Serialize}"];

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "unsafe", "use", "where",
    "while", "yield", "abstract", "become", "box", "do", "final", "gen", "macro", "override",
    "priv", "typeof", "unsized", "virtual",
];

/// Identifiers that cannot be raw identifiers
const RESERVED: &[&str] = &["self", "Self", "super", "crate"];

/// Rust code generator
pub struct RustGenerator {
    env: Environment<'static>,
    /// Module path of the generated models, relative to the crate root
    package: String,
}

impl RustGenerator {
    pub fn new(package: impl Into<String>) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        // Register templates
        env.add_template("model", include_str!("templates/model.rs.jinja"))
            .expect("Failed to load rust model template");
        env.add_template(
            "json_null_string",
            include_str!("templates/json_null_string.rs.jinja"),
        )
        .expect("Failed to load rust json_null_string template");

        Self {
            env,
            package: package.into(),
        }
    }

    fn render(&self, template: &str, table: &str, ctx: minijinja::Value) -> Result<String, ModelGenError> {
        let template = self
            .env
            .get_template(template)
            .map_err(|e| ModelGenError::CodeGen {
                table: table.to_string(),
                message: format!("Template error: {}", e),
            })?;

        template.render(ctx).map_err(|e| ModelGenError::CodeGen {
            table: table.to_string(),
            message: format!("Render error: {}", e),
        })
    }
}

impl CodeGenerator for RustGenerator {
    fn extension(&self) -> &'static str {
        "rs"
    }

    fn map_type(&self, field_type: FieldType) -> MappedType {
        match field_type {
            FieldType::Integer { bits, unsigned } => {
                let sign = if unsigned { "u" } else { "i" };
                MappedType::new(format!("{}{}", sign, bits))
            }
            FieldType::NullableInteger => MappedType::new("Option<i64>"),
            FieldType::Float => MappedType::new("f64"),
            FieldType::NullableFloat => MappedType::new("Option<f64>"),
            FieldType::Text => MappedType::new("String"),
            FieldType::NullableText => MappedType::new("JsonNullString").with_import(format!(
                "crate::{}::json_null_string::JsonNullString",
                self.package
            )),
            FieldType::Timestamp => {
                MappedType::new("Option<NaiveDateTime>").with_import("chrono::NaiveDateTime")
            }
        }
    }

    /// snake_case field name, escaped when it is a keyword
    fn field_name(&self, column: &str) -> String {
        let name = column.to_snake_case();
        if RESERVED.contains(&name.as_str()) {
            format!("{}_", name)
        } else if RUST_KEYWORDS.contains(&name.as_str()) {
            format!("r#{}", name)
        } else {
            name
        }
    }

    fn reserved_struct_names(&self) -> &'static [&'static str] {
        &["Self"]
    }

    fn render_model(&self, model: &TableModel) -> Result<String, ModelGenError> {
        debug!(table = ?model.table_name, "Rendering Rust model");

        let mut imports: BTreeSet<&str> = BASE_IMPORTS.into_iter().collect();
        imports.extend(model.imports.iter().map(String::as_str));

        let columns: Vec<_> = model
            .fields
            .iter()
            .map(|field| {
                minijinja::context! {
                    name => &field.name,
                    type_name => &field.type_name,
                    tag => &field.tag,
                }
            })
            .collect();

        let ctx = minijinja::context! {
            package => &self.package,
            table_name => &model.table_name,
            struct_name => &model.struct_name,
            columns => columns,
            imports => imports,
        };

        self.render("model", &model.table_name, ctx)
    }

    fn render_null_string(&self) -> Result<String, ModelGenError> {
        let ctx = minijinja::context! {
            package => &self.package,
        };

        self.render("json_null_string", "json_null_string", ctx)
    }
}
