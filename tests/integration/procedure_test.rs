//! Stored procedure integration tests.
//!
//! These run the real handlers against a MySQL database that has the battle
//! schema and its stored procedures installed. Set DATABASE_URL to run them.

use std::sync::Arc;

use battle_admin::config::DatabaseConfig;
use battle_admin::db::{MySqlConnector, MySqlExecutor, ProcedureExecutor};
use battle_admin::error::AppError;
use battle_admin::handlers::{
    create_asset, get_assets_by_player, register_player, HandlerContext,
};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Helper to create a handler context with both families pointing at the test database.
fn get_test_context() -> Option<HandlerContext> {
    let url = get_test_database_url()?;
    let database = DatabaseConfig {
        write_connection_string: Some(url.clone()),
        report_connection_string: Some(url),
    };
    Some(HandlerContext::new(database, Arc::new(MySqlConnector)))
}

fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", &Uuid::new_v4().simple().to_string()[..8])
}

#[tokio::test]
async fn test_create_asset_round_trip() {
    let Some(ctx) = get_test_context() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let name = unique("Sword");
    let body = json!({ "AssetName": name, "LevelRequire": 10 }).to_string();
    let reply = create_asset(&ctx, body.as_bytes()).await;

    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body.message);
    let asset = reply.body.data.unwrap();
    assert_eq!(asset.asset_name, name);
    assert_eq!(asset.level_require, 10);
    assert!(!asset.asset_id.is_nil());
}

#[tokio::test]
async fn test_register_player_round_trip() {
    let Some(ctx) = get_test_context() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let name = unique("player");
    let body = json!({
        "PlayerName": name,
        "FullName": "Integration Tester",
        "Age": "33",
        "Email": format!("{name}@example.com")
    })
    .to_string();
    let reply = register_player(&ctx, body.as_bytes()).await;

    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body.message);
    let player = reply.body.data.unwrap();
    assert_eq!(player.player_name, name);
    assert_eq!(player.level, 1);
}

#[tokio::test]
async fn test_report_counts_match_rows() {
    let Some(ctx) = get_test_context() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let reply = get_assets_by_player(&ctx).await;

    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body.message);
    let data = reply.body.data.unwrap();
    assert_eq!(reply.body.count, Some(data.len()));
}

#[tokio::test]
async fn test_unknown_procedure_fails() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let executor = MySqlExecutor::new(&url).unwrap();
    let err = executor
        .execute("sp_DoesNotExist", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Procedure(_)), "{err}");
}

