//! End-to-end generation against an in-memory catalog.

use std::collections::BTreeMap;
use std::fs;

use modelgen::prelude::*;
use tempfile::TempDir;

/// Catalog backed by a map of table name to columns
#[derive(Default)]
struct MemoryCatalog {
    tables: BTreeMap<String, Vec<Column>>,
}

impl MemoryCatalog {
    fn with_table(mut self, name: &str, columns: Vec<Column>) -> Self {
        self.tables.insert(name.to_string(), columns);
        self
    }
}

impl Introspector for MemoryCatalog {
    fn list_tables(&mut self, _database: &str) -> Result<Vec<String>, ModelGenError> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn list_columns(&mut self, _database: &str, table: &str) -> Result<Vec<Column>, ModelGenError> {
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }
}

fn shop() -> MemoryCatalog {
    MemoryCatalog::default()
        .with_table(
            "user_profile",
            vec![
                Column::new("id", false, "int", "int unsigned"),
                Column::new("email", true, "varchar", "varchar(255)"),
                Column::new("created_at", false, "datetime", "datetime"),
            ],
        )
        .with_table(
            "orders",
            vec![
                Column::new("id", false, "int", "int(11)"),
                Column::new("user_id", true, "int", "int(11)"),
                Column::new("total", false, "decimal", "decimal(10,2)"),
                Column::new("note", false, "text", "text"),
            ],
        )
}

fn run(
    schema: &Schema,
    language: Language,
    dir: &TempDir,
    resolver: &mut dyn ConflictResolver,
) -> Result<GenerateSummary, ModelGenError> {
    let generator = language.generator("model");
    let config = CodeGenConfig::new(dir.path().to_path_buf());
    let mut policy = OverwritePolicy::new(resolver);
    generate(schema, generator.as_ref(), &config, &mut policy)
}

#[test]
fn test_user_profile_end_to_end() {
    let dir = TempDir::new().unwrap();
    let schema = shop().introspect("shop", &TableFilter::only("user_profile")).unwrap();

    let summary = run(&schema, Language::Go, &dir, &mut NeverOverwrite).unwrap();

    assert_eq!(summary.written.len(), 2);
    assert!(summary.skipped.is_empty());
    assert!(!dir.path().join("orders.go").exists());

    let code = fs::read_to_string(dir.path().join("user_profile.go")).unwrap();
    assert!(code.starts_with("package model\n"));
    assert!(code.contains("\t\"time\"\n"));
    assert!(!code.contains("\"database/sql\""));
    assert!(code.contains("type UserProfile struct {\n"));
    assert!(code.contains("\tId        uint64         `json:\"id\"`\n"));
    assert!(code.contains("\tEmail     JsonNullString `json:\"email\"`\n"));
    assert!(code.contains("\tCreatedAt *time.Time     `json:\"created_at\"`\n"));
    assert!(code.contains("return \"user_profile\""));

    let helper = fs::read_to_string(dir.path().join("json_null_string.go")).unwrap();
    assert!(helper.contains("type JsonNullString struct"));
}

#[test]
fn test_field_order_follows_catalog() {
    let dir = TempDir::new().unwrap();
    let schema = shop().introspect("shop", &TableFilter::only("orders")).unwrap();

    run(&schema, Language::Go, &dir, &mut NeverOverwrite).unwrap();

    let code = fs::read_to_string(dir.path().join("orders.go")).unwrap();
    let positions: Vec<usize> = ["\tId ", "\tUserId ", "\tTotal ", "\tNote "]
        .iter()
        .map(|field| code.find(field).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(code.contains("sql.NullInt64"));
    assert!(code.contains("\t\"database/sql\"\n"));
}

#[test]
fn test_unknown_type_aborts_before_writing() {
    let dir = TempDir::new().unwrap();
    let mut catalog = shop().with_table(
        "documents",
        vec![
            Column::new("id", false, "int", "int(11)"),
            Column::new("body", false, "json", "json"),
        ],
    );
    let schema = catalog.introspect("shop", &TableFilter::default()).unwrap();

    let err = run(&schema, Language::Go, &dir, &mut AlwaysOverwrite).unwrap_err();

    assert!(err.to_string().contains("json"));
    assert!(err.to_string().contains("documents"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_target_table_still_writes_helper() {
    let dir = TempDir::new().unwrap();
    let schema = shop().introspect("shop", &TableFilter::only("missing")).unwrap();

    let summary = run(&schema, Language::Go, &dir, &mut NeverOverwrite).unwrap();

    assert_eq!(summary.written, vec![dir.path().join("json_null_string.go")]);
}

#[test]
fn test_decline_accept_and_accept_all() {
    let dir = TempDir::new().unwrap();
    let mut catalog = shop()
        .with_table("a_items", vec![Column::new("id", false, "int", "int(11)")])
        .with_table("b_items", vec![Column::new("id", false, "int", "int(11)")]);
    let schema = catalog.introspect("shop", &TableFilter::default()).unwrap();

    // Tables come back sorted: a_items, b_items, orders, user_profile
    for name in ["a_items", "b_items", "orders", "user_profile"] {
        fs::write(dir.path().join(format!("{}.go", name)), "stale").unwrap();
    }
    fs::write(dir.path().join("json_null_string.go"), "stale").unwrap();

    let mut resolver = ScriptedResponses::new([Answer::Decline, Answer::Accept, Answer::AcceptAll]);
    let summary = run(&schema, Language::Go, &dir, &mut resolver).unwrap();

    let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
    assert_eq!(read("a_items.go"), "stale");
    assert!(read("b_items.go").contains("type BItems struct"));
    assert!(read("orders.go").contains("type Orders struct"));
    assert!(read("user_profile.go").contains("type UserProfile struct"));
    assert!(read("json_null_string.go").contains("JsonNullString"));

    // The accept-all answer on orders.go covers user_profile.go
    assert_eq!(resolver.asked().len(), 3);
    assert_eq!(summary.skipped, vec![dir.path().join("a_items.go")]);
}

#[test]
fn test_regeneration_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let schema = shop().introspect("shop", &TableFilter::default()).unwrap();

    run(&schema, Language::Go, &dir, &mut NeverOverwrite).unwrap();
    let first: Vec<_> = ["orders.go", "user_profile.go", "json_null_string.go"]
        .iter()
        .map(|name| fs::read(dir.path().join(name)).unwrap())
        .collect();

    let mut resolver = ScriptedResponses::new([Answer::AcceptAll]);
    run(&schema, Language::Go, &dir, &mut resolver).unwrap();
    let second: Vec<_> = ["orders.go", "user_profile.go", "json_null_string.go"]
        .iter()
        .map(|name| fs::read(dir.path().join(name)).unwrap())
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_case_collision_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut catalog = MemoryCatalog::default()
        .with_table("Users", vec![Column::new("id", false, "int", "int(11)")])
        .with_table("users", vec![Column::new("id", false, "int", "int(11)")]);
    let schema = catalog.introspect("shop", &TableFilter::default()).unwrap();

    let err = run(&schema, Language::Go, &dir, &mut AlwaysOverwrite).unwrap_err();

    assert!(matches!(err, ModelGenError::NameCollision(_)));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_rust_output() {
    let dir = TempDir::new().unwrap();
    let schema = shop().introspect("shop", &TableFilter::only("user_profile")).unwrap();

    run(&schema, Language::Rust, &dir, &mut NeverOverwrite).unwrap();

    let code = fs::read_to_string(dir.path().join("user_profile.rs")).unwrap();
    assert!(code.contains("pub struct UserProfile {"));
    assert!(code.contains("pub id: u64,"));
    assert!(code.contains("pub email: JsonNullString,"));
    assert!(code.contains("pub created_at: Option<NaiveDateTime>,"));
    assert!(code.contains("use crate::model::json_null_string::JsonNullString;"));
    assert!(dir.path().join("json_null_string.rs").exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let schema = shop().introspect("shop", &TableFilter::default()).unwrap();
    let generator = Language::Go.generator("model");
    let config = CodeGenConfig::new(dir.path().to_path_buf()).with_dry_run(true);
    let mut resolver = AlwaysOverwrite;
    let mut policy = OverwritePolicy::new(&mut resolver);

    let summary = generate(&schema, generator.as_ref(), &config, &mut policy).unwrap();

    assert_eq!(summary.planned.len(), 3);
    assert!(summary.written.is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_generated_member_collisions_write_nothing() {
    let catalogs = [
        MemoryCatalog::default().with_table(
            "settings",
            vec![Column::new("table_name", false, "varchar", "varchar(64)")],
        ),
        MemoryCatalog::default().with_table(
            "jsonNullString",
            vec![Column::new("note", true, "varchar", "varchar(64)")],
        ),
    ];

    for mut catalog in catalogs {
        let dir = TempDir::new().unwrap();
        let schema = catalog.introspect("shop", &TableFilter::default()).unwrap();

        let err = run(&schema, Language::Go, &dir, &mut AlwaysOverwrite).unwrap_err();

        assert!(matches!(err, ModelGenError::NameCollision(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
