//! Register-player handler.

use super::{map_logged, ConnectionFamily, HandlerContext, Reply};
use crate::error::{AppError, Result};
use crate::models::{parse_body, ApiResponse, Player, RegisterPlayerRequest};
use axum::http::StatusCode;
use tracing::info;

/// Stored procedure that inserts a player and returns the new row.
pub const REGISTER_PLAYER_PROCEDURE: &str = "sp_RegisterPlayer";

/// Handles `POST /registerplayer`.
pub async fn register_player(ctx: &HandlerContext, body: &[u8]) -> Reply<Player> {
    info!("RegisterPlayer function processing a request.");

    Reply::from_result(
        "RegisterPlayer",
        run(ctx, body).await,
        StatusCode::CREATED,
        |player| ApiResponse::ok("Player registered successfully", player),
    )
}

async fn run(ctx: &HandlerContext, body: &[u8]) -> Result<Player> {
    let request: RegisterPlayerRequest = parse_body(body)?;
    request.validate()?;

    let executor = ctx.executor(ConnectionFamily::Write)?;
    let rows = executor
        .execute(REGISTER_PLAYER_PROCEDURE, &request.params())
        .await?;

    let row = rows
        .first()
        .ok_or_else(|| AppError::empty_result("Failed to register player"))?;
    Ok(map_logged(REGISTER_PLAYER_PROCEDURE, row))
}
