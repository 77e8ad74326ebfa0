//! Database introspection
//!
//! This module provides functionality for extracting table and column
//! information from a database catalog. Each supported database has its own
//! feature-gated submodule.

use tracing::{debug, info, trace, warn};

use crate::prelude::{Column, ModelGenError, Schema, Table};

/// Filters to apply during introspection
#[derive(Debug, Default, Clone)]
pub struct TableFilter {
    /// Only include these tables (if Some)
    pub include: Option<Vec<String>>,
    /// Exclude these tables
    pub exclude: Option<Vec<String>>,
}

impl TableFilter {
    /// Filter down to a single table
    pub fn only(table: impl Into<String>) -> Self {
        Self {
            include: Some(vec![table.into()]),
            exclude: None,
        }
    }

    /// Check if a table should be included
    pub fn should_include(&self, table_name: &str) -> bool {
        // Check include list
        if let Some(include) = &self.include {
            if !include.iter().any(|t| t == table_name) {
                return false;
            }
        }

        // Check exclude list
        if let Some(exclude) = &self.exclude {
            if exclude.iter().any(|t| t == table_name) {
                return false;
            }
        }

        true
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }
}

/// Trait for database introspection implementations
pub trait Introspector {
    /// List every table registered under `database`
    fn list_tables(&mut self, database: &str) -> Result<Vec<String>, ModelGenError>;

    /// List the columns of `table` in the catalog's ordinal order
    fn list_columns(&mut self, database: &str, table: &str) -> Result<Vec<Column>, ModelGenError>;

    /// Introspect the tables selected by `filter`
    ///
    /// A filter naming a table that does not exist yields an empty schema.
    fn introspect(&mut self, database: &str, filter: &TableFilter) -> Result<Schema, ModelGenError> {
        info!(database = ?database, "Starting schema introspection");

        let all_table_names = self.list_tables(database)?;
        debug!(count = ?all_table_names.len(), "Found all tables");

        let table_names: Vec<String> = all_table_names
            .into_iter()
            .filter(|name| filter.should_include(name))
            .collect();
        debug!(count = ?table_names.len(), "Tables after filtering");

        if let Some(include) = &filter.include {
            for wanted in include {
                if !table_names.contains(wanted) {
                    warn!(table = ?wanted, "Requested table not found");
                }
            }
        }

        let mut tables = Vec::with_capacity(table_names.len());
        for table_name in table_names {
            debug!(table = ?table_name, "Introspecting table");

            let columns = self.list_columns(database, &table_name)?;
            trace!(table = ?table_name, columns = ?columns.len(), "Found columns");

            tables.push(Table {
                name: table_name,
                columns,
            });
        }

        info!(
            database = ?database,
            tables = ?tables.len(),
            "Schema introspection complete"
        );

        Ok(Schema {
            name: database.to_string(),
            tables,
        })
    }
}

// Feature-gated database implementations
#[cfg(feature = "mysql")]
mod mysql;

#[cfg(feature = "mysql")]
pub use self::mysql::MySqlIntrospector;
