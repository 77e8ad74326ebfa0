//! Go code generator
//!
//! Generates Go structs with `json` tags, `database/sql` null wrappers and a
//! `JsonNullString` helper.

use std::collections::BTreeSet;

use minijinja::Environment;
use tracing::debug;

use crate::codegen::{CodeGenerator, TableModel};
use crate::error::ModelGenError;
use crate::typemap::{FieldType, MappedType};

/// Imports every model file needs for its `Set` method
const BASE_IMPORTS: [&str; 2] = ["bytes", "encoding/json"];

/// Go code generator
pub struct GoGenerator {
    env: Environment<'static>,
    package: String,
}

impl GoGenerator {
    pub fn new(package: impl Into<String>) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        // Register templates
        env.add_template("model", include_str!("templates/model.go.jinja"))
            .expect("Failed to load go model template");
        env.add_template(
            "json_null_string",
            include_str!("templates/json_null_string.go.jinja"),
        )
        .expect("Failed to load go json_null_string template");

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

impl CodeGenerator for GoGenerator {
    fn extension(&self) -> &'static str {
        "go"
    }

    fn map_type(&self, field_type: FieldType) -> MappedType {
        match field_type {
            FieldType::Integer { bits, unsigned } => {
                let sign = if unsigned { "u" } else { "" };
                MappedType::new(format!("{}int{}", sign, bits))
            }
            FieldType::NullableInteger => MappedType::new("sql.NullInt64").with_import("database/sql"),
            FieldType::Float => MappedType::new("float64"),
            FieldType::NullableFloat => MappedType::new("sql.NullFloat64").with_import("database/sql"),
            FieldType::Text => MappedType::new("string"),
            FieldType::NullableText => MappedType::new("JsonNullString"),
            FieldType::Timestamp => MappedType::new("*time.Time").with_import("time"),
        }
    }

    /// Methods declared by the model template
    fn reserved_field_names(&self) -> &'static [&'static str] {
        &["TableName", "Set"]
    }

    fn render_model(&self, model: &TableModel) -> Result<String, ModelGenError> {
        debug!(table = ?model.table_name, "Rendering Go model");

        let mut imports: BTreeSet<&str> = BASE_IMPORTS.into_iter().collect();
        imports.extend(model.imports.iter().map(String::as_str));

        // Align field declarations the way gofmt does
        let name_width = model.fields.iter().map(|f| f.name.chars().count()).max().unwrap_or(0);
        let type_width = model
            .fields
            .iter()
            .map(|f| f.type_name.chars().count())
            .max()
            .unwrap_or(0);

        let columns: Vec<_> = model
            .fields
            .iter()
            .map(|field| {
                minijinja::context! {
                    name => format!("{:<width$}", field.name, width = name_width),
                    type_name => format!("{:<width$}", field.type_name, width = type_width),
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
