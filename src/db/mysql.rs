//! MySQL stored procedure executor.
//!
//! Provides the `MySqlExecutor` struct that implements the `ProcedureExecutor`
//! trait using sqlx. Each call opens its own connection, runs one `CALL`
//! statement and closes the connection before returning.

use crate::config::ConnectionConfig;
use crate::db::{validate_identifier, Connector, Param, ProcedureExecutor, Row, Value};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column as SqlxColumn, Connection, Row as SqlxRow, TypeInfo, ValueRef};
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Connector that builds a `MySqlExecutor` per connection string.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlConnector;

impl Connector for MySqlConnector {
    fn executor(&self, connection_string: &str) -> Result<Box<dyn ProcedureExecutor>> {
        Ok(Box::new(MySqlExecutor::new(connection_string)?))
    }
}

/// MySQL stored procedure executor.
#[derive(Debug)]
pub struct MySqlExecutor {
    connection_string: String,
    config: ConnectionConfig,
}

impl MySqlExecutor {
    /// Creates an executor for the given `mysql://` connection string.
    ///
    /// The string is validated here; no connection is opened until a call.
    pub fn new(connection_string: &str) -> Result<Self> {
        let config = ConnectionConfig::from_connection_string(connection_string)?;
        Ok(Self {
            connection_string: connection_string.to_string(),
            config,
        })
    }

    /// Opens a fresh connection for a single call.
    async fn open(&self) -> Result<MySqlConnection> {
        debug!("Opening connection to {}", self.config.display_string());
        MySqlConnection::connect(&self.connection_string)
            .await
            .map_err(|e| map_connection_error(e, &self.config))
    }

    async fn fetch_rows(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>> {
        let mut conn = self.open().await?;
        let fetched = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut conn)
            .await;
        close_connection(conn).await;

        let rows = fetched.map_err(|e| AppError::procedure(format_procedure_error(e)))?;
        Ok(rows.iter().map(convert_row).collect())
    }

    async fn run_non_query(&self, sql: &str, params: &[Param]) -> Result<u64> {
        let mut conn = self.open().await?;
        let executed = bind_params(sqlx::query(sql), params)
            .execute(&mut conn)
            .await;
        close_connection(conn).await;

        let result = executed.map_err(|e| AppError::procedure(format_procedure_error(e)))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProcedureExecutor for MySqlExecutor {
    async fn execute(&self, procedure: &str, params: &[Param]) -> Result<Vec<Row>> {
        let result = match call_statement(procedure, params) {
            Ok(sql) => self.fetch_rows(&sql, params).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(rows) => {
                debug!("{} returned {} rows", procedure, rows.len());
                Ok(rows)
            }
            Err(e) => {
                error!("Error executing stored procedure: {}: {}", procedure, e);
                Err(e)
            }
        }
    }

    async fn execute_non_query(&self, procedure: &str, params: &[Param]) -> Result<u64> {
        let result = match call_statement(procedure, params) {
            Ok(sql) => self.run_non_query(&sql, params).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            error!("Error executing non-query: {}: {}", procedure, e);
        }
        result
    }
}

/// Builds the `CALL` statement for a procedure with positional placeholders.
///
/// MySQL binds `CALL` arguments by position, so parameters must be supplied
/// in the order the procedure declares them.
fn call_statement(procedure: &str, params: &[Param]) -> Result<String> {
    validate_identifier("procedure", procedure)?;
    for param in params {
        validate_identifier("parameter", &param.name)?;
    }

    let placeholders = vec!["?"; params.len()].join(", ");
    Ok(format!("CALL {procedure}({placeholders})"))
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [Param],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match &param.value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::String(s) => query.bind(s.as_str()),
            Value::DateTime(dt) => query.bind(*dt),
            // Identifiers are stored as CHAR(36).
            Value::Uuid(u) => query.bind(u.hyphenated().to_string()),
        };
    }
    query
}

async fn close_connection(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close connection cleanly: {}", e);
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            (
                col.name().to_string(),
                convert_value(row, i, col.type_info().name()),
            )
        })
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let is_null = row
        .try_get_raw(index)
        .map(|raw| raw.is_null())
        .unwrap_or(true);
    if is_null {
        return Value::Null;
    }

    let type_name = type_name.to_uppercase();
    match type_name.as_str() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "YEAR" => row
            .try_get_unchecked::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        t if t.ends_with("UNSIGNED") => row
            .try_get::<Option<u64>, _>(index)
            .ok()
            .flatten()
            .map(|v| match i64::try_from(v) {
                Ok(i) => Value::Int(i),
                Err(_) => Value::String(v.to_string()),
            })
            .unwrap_or(Value::Null),

        "FLOAT" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        // DECIMAL arrives as text on the wire.
        "DECIMAL" => row
            .try_get_unchecked::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(|s| match s.parse::<f64>() {
                Ok(f) => Value::Float(f),
                Err(_) => Value::String(s),
            })
            .unwrap_or(Value::Null),

        "DATETIME" | "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(Value::DateTime)
            .unwrap_or(Value::Null),

        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(|d| Value::DateTime(d.and_time(NaiveTime::MIN)))
            .unwrap_or(Value::Null),

        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(index)
            .ok()
            .flatten()
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null),

        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(convert_bytes)
            .unwrap_or(Value::Null),

        "NULL" => Value::Null,

        // For all other types, try to get as string
        _ => row
            .try_get_unchecked::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// BINARY(16) columns hold identifiers; other binary data is surfaced as text.
fn convert_bytes(bytes: Vec<u8>) -> Value {
    if bytes.len() == 16 {
        if let Ok(id) = Uuid::from_slice(&bytes) {
            return Value::Uuid(id);
        }
    }
    Value::String(String::from_utf8_lossy(&bytes).into_owned())
}

/// Maps sqlx connection errors to readable messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> AppError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        AppError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") {
        AppError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("unknown database") {
        AppError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        AppError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        AppError::connection(error.to_string())
    }
}

/// Extracts the server's message from a procedure error.
///
/// Database errors (including `SIGNAL` raised inside a procedure) surface
/// their message text; anything else falls back to the sqlx description.
fn format_procedure_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}
