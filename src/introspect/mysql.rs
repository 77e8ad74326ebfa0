use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder};
use tracing::{error, info, trace};

use super::Introspector;
use crate::config::DbConfig;
use crate::prelude::ModelGenError;
use crate::schema::Column;

/// MySQL introspector reading `information_schema`
pub struct MySqlIntrospector<'a> {
    conn: &'a mut Conn,
}

impl<'a> MySqlIntrospector<'a> {
    pub fn new(conn: &'a mut Conn) -> Self {
        Self { conn }
    }

    /// Open a single connection for the run
    pub fn connect(config: &DbConfig) -> Result<Conn, ModelGenError> {
        info!(connection = ?config.redacted(), "Connecting to MySQL");

        let mut opts = OptsBuilder::new()
            .user(config.user.clone())
            .pass(config.password.clone())
            .db_name(Some(config.database.clone()));

        opts = match &config.socket {
            Some(socket) => opts.socket(Some(socket.clone())),
            None => opts
                .ip_or_hostname(Some(config.host.clone()))
                .tcp_port(config.port),
        };

        Conn::new(opts).map_err(|e| {
            error!(connection = ?config.redacted(), error = ?e, "Failed to connect");
            ModelGenError::Connection(format!("{}: {}", config.redacted(), e))
        })
    }
}

impl Introspector for MySqlIntrospector<'_> {
    fn list_tables(&mut self, database: &str) -> Result<Vec<String>, ModelGenError> {
        trace!(database = ?database, "Querying tables");

        let sql = r#"
            SELECT table_name
              FROM information_schema.tables
             WHERE table_schema = ?
             ORDER BY table_name
        "#;

        let rows: Vec<(String,)> = self.conn.exec(sql, (database,)).map_err(|e| {
            error!(database = ?database, error = ?e, "Failed to query tables");
            ModelGenError::Introspection {
                schema: database.to_string(),
                message: format!("Failed to query tables: {}", e),
            }
        })?;

        let tables: Vec<String> = rows.into_iter().map(|(name,)| name).collect();
        trace!(tables = ?tables, "Tables found");
        Ok(tables)
    }

    fn list_columns(&mut self, database: &str, table: &str) -> Result<Vec<Column>, ModelGenError> {
        trace!(database = ?database, table = ?table, "Querying columns");

        let sql = r#"
            SELECT column_name, is_nullable, data_type, column_type
              FROM information_schema.columns
             WHERE table_schema = ?
               AND table_name = ?
             ORDER BY ordinal_position
        "#;

        let rows: Vec<(String, String, String, String)> =
            self.conn.exec(sql, (database, table)).map_err(|e| {
                error!(
                    database = ?database,
                    table = ?table,
                    error = ?e,
                    "Failed to query columns"
                );
                ModelGenError::Introspection {
                    schema: database.to_string(),
                    message: format!("Failed to query columns for table '{}': {}", table, e),
                }
            })?;

        Ok(rows.into_iter().map(column_from_row).collect())
    }
}

/// Build a [`Column`] from a `(column_name, is_nullable, data_type, column_type)` row
fn column_from_row((name, is_nullable, data_type, column_type): (String, String, String, String)) -> Column {
    let is_nullable = is_nullable.eq_ignore_ascii_case("YES");

    trace!(
        column = ?name,
        data_type = ?data_type,
        column_type = ?column_type,
        is_nullable = ?is_nullable,
        "Parsed column"
    );

    Column {
        name,
        is_nullable,
        data_type,
        column_type,
    }
}
