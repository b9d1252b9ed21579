//! Integration tests for the execution HTTP API
//!
//! These run against a real server on an ephemeral port and need no
//! language toolchains: every request here is rejected before anything is
//! spawned, or only touches the metadata routes.

use reqwest::StatusCode;
use serde_json::json;
use skillspan_tests::common::{setup_test_logging, TestServer};

#[tokio::test]
async fn test_unsupported_language_rejected() {
    setup_test_logging();
    let server = TestServer::start().await.unwrap();

    for language in [json!("ruby"), json!("JavaScript"), json!(null), json!(7)] {
        let (status, body) = server
            .execute(json!({ "language": language, "code": "print(1)" }))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "error": "Unsupported language" }));
    }

    let (status, body) = server.execute(json!({ "code": "print(1)" })).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported language");

    assert_eq!(server.leftover_workspaces(), 0);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_blank_code_rejected() {
    let server = TestServer::start().await.unwrap();

    for code in [json!(""), json!("   \n\t"), json!(null), json!(["print(1)"])] {
        let (status, body) = server
            .execute(json!({ "language": "python", "code": code }))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "error": "Code is required" }));
    }

    assert_eq!(server.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_non_string_stdin_rejected() {
    let server = TestServer::start().await.unwrap();

    for stdin in [json!(5), json!(true), json!({ "line": "hello" })] {
        let (status, body) = server
            .execute(json!({ "language": "java", "code": "class Solution {}", "stdin": stdin }))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "error": "stdin must be a string" }));
    }

    assert_eq!(server.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_validation_order() {
    let server = TestServer::start().await.unwrap();

    // Language is checked before code, code before stdin
    let (_, body) = server
        .execute(json!({ "language": "cobol", "code": "", "stdin": 1 }))
        .await
        .unwrap();
    assert_eq!(body["error"], "Unsupported language");

    let (_, body) = server
        .execute(json!({ "language": "python", "code": "", "stdin": 1 }))
        .await
        .unwrap();
    assert_eq!(body["error"], "Code is required");
}

#[tokio::test]
async fn test_malformed_body_treated_as_empty() {
    let server = TestServer::start().await.unwrap();

    for raw in ["", "{not json", "[1, 2, 3]", "[\"python\", \"print(1)\"]", "\"python\""] {
        let (status, body) = server.execute_raw(raw).await.unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {raw:?}");
        assert_eq!(body["error"], "Unsupported language");
    }
}

#[tokio::test]
async fn test_languages_endpoint() {
    let server = TestServer::start().await.unwrap();

    let body = server.get("/api/code/languages").await.unwrap();
    assert_eq!(body, json!({ "languages": ["javascript", "python", "java"] }));
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start().await.unwrap();

    let body = server.get("/health").await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["runtime"], "process");
    assert_eq!(body["available_slots"], 8);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .client
        .get(server.url("/api/code/run"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
