//! Code generation
//!
//! This module turns the introspected schema into one model file per table,
//! plus a shared nullable-string helper file.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use tracing::{debug, info, trace, warn};

use crate::output::{self, OverwritePolicy, WriteResult};
use crate::prelude::{ModelGenError, Schema, Table};
use crate::schema::{is_valid_identifier, to_pascal_case};
use crate::typemap::{self, FieldType, MappedType};

pub mod go;
pub mod rust;

pub use go::GoGenerator;
pub use rust::RustGenerator;

/// File stem of the nullable-string helper
pub const NULL_STRING_FILE_STEM: &str = "json_null_string";

/// Type declared by the nullable-string helper
pub const NULL_STRING_TYPE: &str = "JsonNullString";

/// Target language for generated code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Go,
    Rust,
}

impl Language {
    /// Build the generator for this language
    pub fn generator(self, package: &str) -> Box<dyn CodeGenerator> {
        match self {
            Language::Go => Box::new(GoGenerator::new(package)),
            Language::Rust => Box::new(RustGenerator::new(package)),
        }
    }
}

/// Configuration for code generation
#[derive(Debug, Clone)]
pub struct CodeGenConfig {
    /// Output directory
    pub output_dir: PathBuf,
    /// Report the files that would be written without touching disk
    pub dry_run: bool,
}

impl CodeGenConfig {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// One field of a generated structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    /// Original column name, used as the serialized field name
    pub tag: String,
}

/// Everything needed to render one table file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    pub table_name: String,
    pub struct_name: String,
    pub fields: Vec<Field>,
    /// Modules required by the field types, sorted
    pub imports: BTreeSet<String>,
}

/// Trait for language-specific code generators
pub trait CodeGenerator {
    /// Extension of generated files, without the dot
    fn extension(&self) -> &'static str;

    /// Render a field type as a type name plus required import
    fn map_type(&self, field_type: FieldType) -> MappedType;

    /// Field identifier for a raw column name
    fn field_name(&self, column: &str) -> String {
        to_pascal_case(column)
    }

    /// Field names taken by members the model template declares
    fn reserved_field_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Names the target language does not accept for a struct
    fn reserved_struct_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Render the source file for one table
    fn render_model(&self, model: &TableModel) -> Result<String, ModelGenError>;

    /// Render the nullable-string helper file
    fn render_null_string(&self) -> Result<String, ModelGenError>;
}

/// Map one column to its target type
///
/// Fails with [`ModelGenError::UnrecognizedType`] when the column's base type
/// is outside the supported set.
pub fn map_column(
    generator: &dyn CodeGenerator,
    table: &str,
    column: &crate::schema::Column,
) -> Result<MappedType, ModelGenError> {
    let field_type = typemap::classify(column.is_nullable, &column.data_type, &column.column_type)
        .ok_or_else(|| ModelGenError::UnrecognizedType {
            table: table.to_string(),
            column: column.name.clone(),
            data_type: column.data_type.clone(),
        })?;

    let mapped = generator.map_type(field_type);
    trace!(
        table = ?table,
        column = ?column.name,
        field_type = ?field_type,
        type_name = ?mapped.type_name,
        "Mapped column"
    );
    Ok(mapped)
}

/// Build the render input for a table
///
/// Pure: converts names, maps every column and collects the import set.
pub fn build_model(generator: &dyn CodeGenerator, table: &Table) -> Result<TableModel, ModelGenError> {
    let mut fields = Vec::with_capacity(table.columns.len());
    let mut imports = BTreeSet::new();

    for column in &table.columns {
        let mapped = map_column(generator, &table.name, column)?;
        if let Some(import) = mapped.import {
            imports.insert(import);
        }
        fields.push(Field {
            name: generator.field_name(&column.name),
            type_name: mapped.type_name,
            tag: column.name.clone(),
        });
    }

    Ok(TableModel {
        table_name: table.name.clone(),
        struct_name: table.struct_name(),
        fields,
        imports,
    })
}

/// Reject models that would produce invalid or clashing output
///
/// Checked before anything is written: identifiers must be valid, file names
/// must differ case-insensitively (and from the helper file), struct names must
/// be unique and must not shadow the helper type, and field names must be
/// unique within a table and must not clash with generated members.
pub fn validate_models(generator: &dyn CodeGenerator, models: &[TableModel]) -> Result<(), ModelGenError> {
    let mut file_names: HashMap<String, &str> = HashMap::new();
    let mut struct_names: HashMap<&str, &str> = HashMap::new();

    for model in models {
        if !is_valid_identifier(&model.struct_name)
            || generator.reserved_struct_names().contains(&model.struct_name.as_str())
        {
            return Err(ModelGenError::InvalidIdentifier {
                table: model.table_name.clone(),
                name: model.struct_name.clone(),
            });
        }
        if model.struct_name == NULL_STRING_TYPE {
            return Err(ModelGenError::NameCollision(format!(
                "table '{}' maps to struct '{}', which the helper file declares",
                model.table_name, NULL_STRING_TYPE
            )));
        }

        let file_key = model.table_name.to_lowercase();
        if file_key == NULL_STRING_FILE_STEM {
            return Err(ModelGenError::NameCollision(format!(
                "table '{}' would overwrite the {} helper file",
                model.table_name, NULL_STRING_FILE_STEM
            )));
        }
        if let Some(other) = file_names.insert(file_key, &model.table_name) {
            return Err(ModelGenError::NameCollision(format!(
                "tables '{}' and '{}' map to the same file name",
                other, model.table_name
            )));
        }
        if let Some(other) = struct_names.insert(&model.struct_name, &model.table_name) {
            return Err(ModelGenError::NameCollision(format!(
                "tables '{}' and '{}' both map to struct '{}'",
                other, model.table_name, model.struct_name
            )));
        }

        let mut field_names: HashMap<&str, &str> = HashMap::new();
        for field in &model.fields {
            if !is_valid_identifier(&field.name) {
                return Err(ModelGenError::InvalidIdentifier {
                    table: model.table_name.clone(),
                    name: field.name.clone(),
                });
            }
            if generator.reserved_field_names().contains(&field.name.as_str()) {
                return Err(ModelGenError::NameCollision(format!(
                    "column '{}' of table '{}' maps to field '{}', which clashes with a generated method",
                    field.tag, model.table_name, field.name
                )));
            }
            if let Some(other) = field_names.insert(&field.name, &field.tag) {
                return Err(ModelGenError::NameCollision(format!(
                    "columns '{}' and '{}' of table '{}' both map to field '{}'",
                    other, field.tag, model.table_name, field.name
                )));
            }
        }
    }

    Ok(())
}

/// Outcome of a generation run
#[derive(Debug, Default)]
pub struct GenerateSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// Files a dry run would have written
    pub planned: Vec<PathBuf>,
}

/// Generate all table files and the helper file
///
/// Every table is mapped, rendered and validated first; nothing is written if
/// any table fails. Table files follow `policy`; the helper file is always
/// regenerated.
pub fn generate(
    schema: &Schema,
    generator: &dyn CodeGenerator,
    config: &CodeGenConfig,
    policy: &mut OverwritePolicy<'_>,
) -> Result<GenerateSummary, ModelGenError> {
    info!(
        output = ?config.output_dir,
        tables = schema.tables.len(),
        dry_run = config.dry_run,
        "Generating models"
    );

    let models = schema
        .tables
        .iter()
        .map(|table| build_model(generator, table))
        .collect::<Result<Vec<_>, _>>()?;
    validate_models(generator, &models)?;

    let mut rendered = Vec::with_capacity(models.len());
    for model in &models {
        let code = generator.render_model(model)?;
        let path = config
            .output_dir
            .join(format!("{}.{}", model.table_name, generator.extension()));
        rendered.push((path, code));
    }

    let helper_path = config
        .output_dir
        .join(format!("{}.{}", NULL_STRING_FILE_STEM, generator.extension()));
    let helper_code = generator.render_null_string()?;

    let mut summary = GenerateSummary::default();

    if config.dry_run {
        for (path, _) in &rendered {
            info!(path = ?path, "Would write file");
            summary.planned.push(path.clone());
        }
        info!(path = ?helper_path, "Would write file");
        summary.planned.push(helper_path);
        return Ok(summary);
    }

    if models.is_empty() {
        warn!("No tables to generate");
    }

    for ((path, code), model) in rendered.iter().zip(&models) {
        info!(table = ?model.table_name, "Generating table");
        match output::write_file(path, code, policy)? {
            WriteResult::Skipped => summary.skipped.push(path.clone()),
            result => {
                debug!(table = ?model.table_name, path = ?path, result = ?result, "Generated table file");
                summary.written.push(path.clone());
            }
        }
    }

    output::write_file_unconditionally(&helper_path, &helper_code)?;
    debug!(path = ?helper_path, "Generated helper file");
    summary.written.push(helper_path);

    info!(
        written = summary.written.len(),
        skipped = summary.skipped.len(),
        "Code generation complete"
    );

    Ok(summary)
}
