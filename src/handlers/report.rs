//! Player assets report handler.

use super::{map_logged, ConnectionFamily, HandlerContext, Reply};
use crate::error::Result;
use crate::models::{ApiResponse, PlayerAssetReport};
use axum::http::StatusCode;
use tracing::info;

/// Stored procedure that joins players to the assets they hold.
pub const GET_ASSETS_BY_PLAYER_PROCEDURE: &str = "sp_GetAssetsByPlayer";

/// Handles `GET /getassetsbyplayer`. Takes no input.
pub async fn get_assets_by_player(ctx: &HandlerContext) -> Reply<Vec<PlayerAssetReport>> {
    info!("GetAssetsByPlayer function processing a request.");

    Reply::from_result("GetAssetsByPlayer", run(ctx).await, StatusCode::OK, |report| {
        ApiResponse::list("Report retrieved successfully", report)
    })
}

async fn run(ctx: &HandlerContext) -> Result<Vec<PlayerAssetReport>> {
    let executor = ctx.executor(ConnectionFamily::Report)?;
    let rows = executor.execute(GET_ASSETS_BY_PLAYER_PROCEDURE, &[]).await?;

    Ok(rows
        .iter()
        .map(|row| map_logged(GET_ASSETS_BY_PLAYER_PROCEDURE, row))
        .collect())
}
