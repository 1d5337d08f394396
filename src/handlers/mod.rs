//! Request handlers.
//!
//! Each handler is a straight pipeline: parse, validate, resolve the
//! connection string, call one stored procedure, map the rows, and wrap the
//! outcome in an [`ApiResponse`]. Handlers know nothing about HTTP routing;
//! they return a [`Reply`] that the server turns into a response.

mod asset;
mod player;
mod report;

pub use asset::{create_asset, CREATE_ASSET_PROCEDURE};
pub use player::{register_player, REGISTER_PLAYER_PROCEDURE};
pub use report::{get_assets_by_player, GET_ASSETS_BY_PLAYER_PROCEDURE};

use crate::config::DatabaseConfig;
use crate::db::{Connector, ProcedureExecutor, Row};
use crate::error::{AppError, Result};
use crate::mapping::{map_row, MapRow};
use crate::models::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Which connection string a handler uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionFamily {
    /// Create-asset and register-player.
    Write,
    /// The player assets report.
    Report,
}

/// Shared, immutable state every handler runs against.
#[derive(Clone)]
pub struct HandlerContext {
    database: DatabaseConfig,
    connector: Arc<dyn Connector>,
}

impl HandlerContext {
    /// Creates a context from connection settings and a connector.
    pub fn new(database: DatabaseConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            database,
            connector,
        }
    }

    /// Returns an executor for the family's connection string.
    ///
    /// Fails before touching the connector when no string is configured.
    pub fn executor(&self, family: ConnectionFamily) -> Result<Box<dyn ProcedureExecutor>> {
        let connection_string = match family {
            ConnectionFamily::Write => self.database.write_connection(),
            ConnectionFamily::Report => self.database.report_connection(),
        }
        .ok_or_else(|| AppError::config("Database connection string not configured"))?;

        self.connector.executor(connection_string)
    }
}

/// A status code plus envelope, ready to serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub status: StatusCode,
    pub body: ApiResponse<T>,
}

impl<T> Reply<T> {
    /// Builds a reply from a handler outcome.
    ///
    /// Failures are logged under `operation` and converted to an error envelope.
    fn from_result(
        operation: &str,
        result: Result<T>,
        status: StatusCode,
        respond: impl FnOnce(T) -> ApiResponse<T>,
    ) -> Self {
        match result {
            Ok(data) => Self {
                status,
                body: respond(data),
            },
            Err(e) => {
                match &e {
                    AppError::BadRequest(_) | AppError::Config(_) | AppError::EmptyResult(_) => {
                        warn!("{} rejected: {}", operation, e)
                    }
                    _ => error!("Error in {} function: {}", operation, e),
                }
                Self {
                    status: e.status(),
                    body: ApiResponse::error(e.client_message()),
                }
            }
        }
    }

    /// Returns true for 2xx replies.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Maps a row, logging any columns that did not populate the record.
fn map_logged<T: MapRow>(procedure: &str, row: &Row) -> T {
    let mapped = map_row::<T>(row);
    if !mapped.is_complete() {
        debug!("{} result mapped partially: {:?}", procedure, mapped.skipped);
    }
    mapped.into_record()
}
