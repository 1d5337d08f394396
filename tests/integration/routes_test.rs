//! HTTP route tests.
//!
//! Drives the full router with `tower::ServiceExt::oneshot` and a mock
//! stored procedure executor.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use battle_admin::config::{DatabaseConfig, ServerConfig};
use battle_admin::db::{
    FailingConnector, MockConnector, MockExecutor, Row, Value,
};
use battle_admin::handlers::{
    HandlerContext, CREATE_ASSET_PROCEDURE, GET_ASSETS_BY_PLAYER_PROCEDURE,
    REGISTER_PLAYER_PROCEDURE,
};
use battle_admin::server::build_router;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::{json, Value as Json};
use tower::ServiceExt;

const ASSET_ID: &str = "0b6f3c1e-9a5d-4a1e-8f27-3d2c1b0a9e8f";

fn configured() -> DatabaseConfig {
    DatabaseConfig {
        write_connection_string: Some("mysql://game@db/battle".to_string()),
        report_connection_string: Some("mysql://reader@db/battle".to_string()),
    }
}

fn router(mock: &MockExecutor, database: DatabaseConfig) -> Router {
    let ctx = Arc::new(HandlerContext::new(
        database,
        Arc::new(MockConnector::new(mock.clone())),
    ));
    build_router(ctx, &ServerConfig::default())
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Json) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn sword_row() -> Row {
    let created = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(10, 30, 0))
        .unwrap();
    Row::new()
        .with("AssetId", ASSET_ID)
        .with("AssetName", "Sword of Fire")
        .with("LevelRequire", 10)
        .with("CreatedDate", Value::DateTime(created))
}

#[tokio::test]
async fn test_create_asset_returns_created_record() {
    let mock = MockExecutor::new().with_rows(CREATE_ASSET_PROCEDURE, vec![sword_row()]);
    let request = post(
        "/api/createasset",
        r#"{"AssetName":"Sword of Fire","LevelRequire":10}"#,
    );

    let (status, body) = send(router(&mock, configured()), request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Asset created successfully",
            "data": {
                "AssetId": ASSET_ID,
                "AssetName": "Sword of Fire",
                "LevelRequire": 10,
                "CreatedDate": "2024-05-01T10:30:00"
            },
            "count": null
        })
    );

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].param("p_AssetName"),
        Some(&Value::String("Sword of Fire".to_string()))
    );
    assert_eq!(calls[0].param("p_LevelRequire"), Some(&Value::Int(10)));
}

#[tokio::test]
async fn test_create_asset_rejects_invalid_bodies() {
    let mock = MockExecutor::new();

    for (body, message) in [
        ("", "Invalid request body"),
        ("not json", "Invalid request body"),
        ("[1, 2]", "Invalid request body"),
        (r#"{"LevelRequire":3}"#, "AssetName is required"),
        (
            r#"{"AssetName":"Bow","LevelRequire":-1}"#,
            "LevelRequire must be at least 0",
        ),
    ] {
        let (status, response) =
            send(router(&mock, configured()), post("/api/createasset", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response["success"], json!(false));
        assert_eq!(response["message"], json!(message));
        assert_eq!(response["data"], Json::Null);
    }

    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_oversized_body_gets_error_envelope() {
    let mock = MockExecutor::new();
    let padding = "x".repeat(3 * 1024 * 1024);
    let body = json!({ "AssetName": padding, "LevelRequire": 1 }).to_string();

    for uri in ["/api/createasset", "/api/registerplayer"] {
        let (status, response) = send(router(&mock, configured()), post(uri, body.clone())).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{uri}");
        assert_eq!(response["success"], json!(false));
        assert_eq!(response["data"], Json::Null);
        assert!(response["message"]
            .as_str()
            .unwrap()
            .contains("length limit exceeded"));
    }

    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_lowercase_keys_create_asset() {
    let mock = MockExecutor::new().with_rows(CREATE_ASSET_PROCEDURE, vec![sword_row()]);

    let (status, body) = send(
        router(&mock, configured()),
        post(
            "/api/createasset",
            r#"{"assetname":"Sword of Fire","levelrequire":10}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["AssetName"], json!("Sword of Fire"));
    assert_eq!(mock.calls()[0].param("p_LevelRequire"), Some(&Value::Int(10)));
}

#[tokio::test]
async fn test_register_player_accepts_camel_case_body() {
    let row = Row::new()
        .with("PlayerId", "3fa85f64-5717-4562-b3fc-2c963f66afa6")
        .with("PlayerName", "sylvanas")
        .with("FullName", "Sylvanas Windrunner")
        .with("Age", "40")
        .with("Level", 1)
        .with("Email", "banshee@forsaken.gg")
        .with("CreatedDate", "2024-05-01 08:00:00");
    let mock = MockExecutor::new().with_rows(REGISTER_PLAYER_PROCEDURE, vec![row]);
    let body = json!({
        "playerName": "sylvanas",
        "fullName": "Sylvanas Windrunner",
        "age": 40,
        "email": "banshee@forsaken.gg"
    });

    let (status, response) = send(
        router(&mock, configured()),
        post("/api/registerplayer", body.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["message"], json!("Player registered successfully"));
    assert_eq!(response["data"]["PlayerName"], json!("sylvanas"));
    assert_eq!(response["data"]["CreatedDate"], json!("2024-05-01T08:00:00"));

    let calls = mock.calls();
    assert_eq!(calls[0].param("p_Age"), Some(&Value::String("40".to_string())));
    assert_eq!(calls[0].param("p_Level"), Some(&Value::Int(1)));
}

#[tokio::test]
async fn test_register_player_without_connection_string() {
    let mock = MockExecutor::new();
    let body = json!({
        "PlayerName": "anduin",
        "FullName": "Anduin Wrynn",
        "Age": "19",
        "Email": "anduin@stormwind.gg"
    });

    let (status, response) = send(
        router(&mock, DatabaseConfig::default()),
        post("/api/registerplayer", body.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response["message"],
        json!("Database connection string not configured")
    );
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_report_lists_rows_with_cors() {
    let rows = vec![
        Row::new()
            .with("No", 1)
            .with("Player name", "thrall")
            .with("Level", 12)
            .with("Age", "30")
            .with("Asset name", "Doomhammer"),
        Row::new()
            .with("No", 2)
            .with("Player name", "jaina")
            .with("Level", 15)
            .with("Age", "28")
            .with("Asset name", "Staff of Antonidas"),
    ];
    let mock = MockExecutor::new().with_rows(GET_ASSETS_BY_PLAYER_PROCEDURE, rows);

    let response = router(&mock, configured())
        .oneshot(get("/api/getassetsbyplayer"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["count"], json!(2));
    assert_eq!(
        body["data"][0],
        json!({
            "No": 1,
            "PlayerName": "thrall",
            "Level": 12,
            "Age": "30",
            "AssetName": "Doomhammer"
        })
    );
    assert_eq!(body["data"][1]["AssetName"], json!("Staff of Antonidas"));
}

#[tokio::test]
async fn test_report_empty_result() {
    let mock = MockExecutor::new();

    let (status, body) = send(router(&mock, configured()), get("/api/getassetsbyplayer")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["count"], json!(0));
}

#[tokio::test]
async fn test_report_connection_failure_keeps_origin_header() {
    let ctx = Arc::new(HandlerContext::new(
        configured(),
        Arc::new(FailingConnector::new("Unable to connect to any of the specified MySQL hosts")),
    ));
    let router = build_router(ctx, &ServerConfig::default());

    let response = router.oneshot(get("/api/getassetsbyplayer")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .is_none());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body["message"],
        json!("Internal server error: Unable to connect to any of the specified MySQL hosts")
    );
}

#[tokio::test]
async fn test_report_preflight() {
    let mock = MockExecutor::new();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/getassetsbyplayer")
        .body(Body::empty())
        .unwrap();

    let response = router(&mock, configured()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_root_prefix_and_health() {
    let mock = MockExecutor::new();
    let ctx = Arc::new(HandlerContext::new(
        configured(),
        Arc::new(MockConnector::new(mock.clone())),
    ));
    let server = ServerConfig {
        route_prefix: "/".to_string(),
        ..ServerConfig::default()
    };
    let router = build_router(ctx, &server);

    let (status, _) = send(router.clone(), get("/getassetsbyplayer")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(router.clone(), get("/api/getassetsbyplayer")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let mock = MockExecutor::new();

    let (status, _) = send(router(&mock, configured()), get("/api/createasset")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(mock.call_count(), 0);
}
