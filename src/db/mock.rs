//! Mock procedure executor for testing.
//!
//! Provides an in-memory executor that returns scripted rows and records
//! every call it receives, so tests can assert on procedure names, bound
//! parameters and call counts without a database.

use super::{Connector, Param, ProcedureExecutor, Row};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A recorded procedure invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    /// Procedure name as passed by the caller.
    pub procedure: String,

    /// Parameters in the order they were supplied.
    pub params: Vec<Param>,

    /// True when invoked through `execute_non_query`.
    pub non_query: bool,
}

impl ProcedureCall {
    /// Returns the value bound to the named parameter.
    pub fn param(&self, name: &str) -> Option<&super::Value> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, Vec<Row>>,
    failures: HashMap<String, String>,
    calls: Vec<ProcedureCall>,
}

/// A mock executor that returns predefined rows.
///
/// Clones share state, so a clone handed to a connector records into the
/// same call log the test inspects.
#[derive(Debug, Clone, Default)]
pub struct MockExecutor {
    state: Arc<Mutex<MockState>>,
}

impl MockExecutor {
    /// Creates a mock that returns no rows for every procedure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the rows returned by `procedure`.
    pub fn with_rows(self, procedure: impl Into<String>, rows: Vec<Row>) -> Self {
        self.lock().responses.insert(procedure.into(), rows);
        self
    }

    /// Makes `procedure` fail with a procedure error carrying `message`.
    pub fn with_failure(self, procedure: impl Into<String>, message: impl Into<String>) -> Self {
        self.lock().failures.insert(procedure.into(), message.into());
        self
    }

    /// Returns every call received so far.
    pub fn calls(&self) -> Vec<ProcedureCall> {
        self.lock().calls.clone()
    }

    /// Returns the number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, procedure: &str, params: &[Param], non_query: bool) -> Result<Vec<Row>> {
        let mut state = self.lock();
        state.calls.push(ProcedureCall {
            procedure: procedure.to_string(),
            params: params.to_vec(),
            non_query,
        });

        if let Some(message) = state.failures.get(procedure) {
            return Err(AppError::procedure(message.clone()));
        }
        Ok(state.responses.get(procedure).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ProcedureExecutor for MockExecutor {
    async fn execute(&self, procedure: &str, params: &[Param]) -> Result<Vec<Row>> {
        self.record(procedure, params, false)
    }

    async fn execute_non_query(&self, procedure: &str, params: &[Param]) -> Result<u64> {
        self.record(procedure, params, true)
            .map(|rows| rows.len() as u64)
    }
}

/// Connector that hands out a shared `MockExecutor`.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    executor: MockExecutor,
    connection_strings: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    /// Creates a connector around the given mock.
    pub fn new(executor: MockExecutor) -> Self {
        Self {
            executor,
            connection_strings: Arc::default(),
        }
    }

    /// Returns the shared mock executor.
    pub fn executor_handle(&self) -> &MockExecutor {
        &self.executor
    }

    /// Returns the connection strings executors were requested for.
    pub fn connection_strings(&self) -> Vec<String> {
        self.connection_strings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Connector for MockConnector {
    fn executor(&self, connection_string: &str) -> Result<Box<dyn ProcedureExecutor>> {
        self.connection_strings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(connection_string.to_string());
        Ok(Box::new(self.executor.clone()))
    }
}

/// A connector whose connections always fail.
#[derive(Debug, Clone)]
pub struct FailingConnector {
    message: String,
}

impl FailingConnector {
    /// Creates a connector that fails with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Connector for FailingConnector {
    fn executor(&self, _connection_string: &str) -> Result<Box<dyn ProcedureExecutor>> {
        Err(AppError::connection(self.message.clone()))
    }
}
