//! Create-asset handler.

use super::{map_logged, ConnectionFamily, HandlerContext, Reply};
use crate::error::{AppError, Result};
use crate::models::{parse_body, ApiResponse, Asset, CreateAssetRequest};
use axum::http::StatusCode;
use tracing::info;

/// Stored procedure that inserts an asset and returns the new row.
pub const CREATE_ASSET_PROCEDURE: &str = "sp_CreateAsset";

/// Handles `POST /createasset`.
pub async fn create_asset(ctx: &HandlerContext, body: &[u8]) -> Reply<Asset> {
    info!("CreateAsset function processing a request.");

    Reply::from_result("CreateAsset", run(ctx, body).await, StatusCode::CREATED, |asset| {
        ApiResponse::ok("Asset created successfully", asset)
    })
}

async fn run(ctx: &HandlerContext, body: &[u8]) -> Result<Asset> {
    let request: CreateAssetRequest = parse_body(body)?;
    request.validate()?;

    let executor = ctx.executor(ConnectionFamily::Write)?;
    let rows = executor
        .execute(CREATE_ASSET_PROCEDURE, &request.params())
        .await?;

    let row = rows
        .first()
        .ok_or_else(|| AppError::empty_result("Failed to create asset"))?;
    Ok(map_logged(CREATE_ASSET_PROCEDURE, row))
}
