//! Database abstraction layer.
//!
//! Provides a trait-based interface for stored procedure execution, allowing
//! the MySQL backend and the in-memory mock to be used interchangeably.

mod mock;
mod mysql;
mod types;

pub use mock::{FailingConnector, MockConnector, MockExecutor, ProcedureCall};
pub use mysql::{MySqlConnector, MySqlExecutor};
pub use types::{Param, Row, Value};

use crate::error::{AppError, Result};
use async_trait::async_trait;

/// Trait defining the interface for stored procedure executors.
///
/// Every call acquires its own connection and releases it before returning.
#[async_trait]
pub trait ProcedureExecutor: Send + Sync {
    /// Executes a stored procedure and returns every row of its first result set.
    async fn execute(&self, procedure: &str, params: &[Param]) -> Result<Vec<Row>>;

    /// Executes a stored procedure and returns the number of affected rows.
    async fn execute_non_query(&self, procedure: &str, params: &[Param]) -> Result<u64>;
}

/// Creates executors from connection strings.
///
/// Handlers resolve their connection string per request and ask the
/// connector for an executor, so a missing string never reaches this trait.
pub trait Connector: Send + Sync {
    /// Builds an executor for the given connection string.
    fn executor(&self, connection_string: &str) -> Result<Box<dyn ProcedureExecutor>>;
}

/// Checks that a procedure or parameter name is a plain identifier.
///
/// Procedure names are spliced into the `CALL` statement text, so anything
/// other than ASCII alphanumerics and underscores is rejected.
pub fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::procedure(format!("{kind} name is empty")));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::procedure(format!(
            "Invalid {kind} name '{name}'"
        )));
    }
    Ok(())
}
