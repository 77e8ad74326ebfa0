//! # modelgen
//!
//! Generate data-model source files from a live MySQL schema
//!
//! This crate provides a CLI tool and library for introspecting the tables of
//! a database and emitting one model file per table, in Go or Rust.

pub mod codegen;
pub mod config;
pub mod error;
pub mod introspect;
pub mod output;
pub mod schema;
pub mod typemap;

pub mod prelude {
    pub use crate::codegen::{
        build_model, generate, CodeGenConfig, CodeGenerator, Field, GenerateSummary, Language,
        TableModel,
    };
    pub use crate::config::DbConfig;
    pub use crate::error::ModelGenError;
    pub use crate::introspect::{Introspector, TableFilter};
    pub use crate::output::{
        AlwaysOverwrite, Answer, ConflictResolver, InteractivePrompt, NeverOverwrite,
        OverwritePolicy, ScriptedResponses, WriteResult,
    };
    pub use crate::schema::{Column, Schema, Table};
    pub use crate::typemap::{FieldType, MappedType};
}

#[cfg(feature = "mysql")]
pub use introspect::MySqlIntrospector;
