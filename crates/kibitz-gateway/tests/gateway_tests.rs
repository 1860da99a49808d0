// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process HTTP tests for the gateway routes over scripted providers.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header};
use kibitz_core::{ProviderAdapter, ProviderFamily};
use kibitz_engine::{Orchestrator, ProviderRegistry};
use kibitz_gateway::{GatewayState, build_router};
use kibitz_test_utils::{ScriptedProvider, Step};
use tower::ServiceExt;

const MODEL: &str = "scripted-model";
const ORIGIN: &str = "http://localhost:3000";

fn app_with_deadline(provider: ScriptedProvider, deadline: Duration) -> (Router, Arc<ScriptedProvider>) {
    let provider = Arc::new(provider);
    let mut registry = ProviderRegistry::new();
    registry.register_adapter(provider.clone());
    registry.register_model(MODEL, provider.family());
    let state = GatewayState {
        orchestrator: Orchestrator::new(registry, deadline),
    };
    (build_router(state, &[ORIGIN.to_string()]), provider)
}

fn app(provider: ScriptedProvider) -> (Router, Arc<ScriptedProvider>) {
    app_with_deadline(provider, Duration::from_secs(120))
}

fn json_request(path: &str, model: &str) -> Request<Body> {
    let body = serde_json::json!({
        "model": model,
        "game_state": "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        "move_history": ["e4"],
    });
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Bytes {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

#[tokio::test]
async fn health_reports_operational() {
    let (app, _) = app(ScriptedProvider::new(ProviderFamily::OpenAi, vec![]));
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        serde_json::json!({"status": "healthy", "message": "API is operational"})
    );
}

#[tokio::test]
async fn get_move_returns_ruling() {
    let (app, provider) = app(ScriptedProvider::new(
        ProviderFamily::Anthropic,
        vec![
            Step::reason("Let me think"),
            Step::reason(" about this"),
            Step::answer(" e5 "),
        ],
    ));
    let resp = app.oneshot(json_request("/get_move", MODEL)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        serde_json::json!({"move": "e5", "reasoning_cost": 5})
    );

    let requests = provider.requests().await;
    assert!(!requests[0].stream);
    assert!(requests[0].prompt.contains("<move_history>\ne4\n</move_history>"));
}

#[tokio::test]
async fn get_move_reports_resignation() {
    let (app, _) = app(ScriptedProvider::new(
        ProviderFamily::Xai,
        vec![Step::answer("resign"), Step::Usage(7)],
    ));
    let resp = app.oneshot(json_request("/get_move", MODEL)).await.unwrap();

    assert_eq!(
        body_json(resp).await,
        serde_json::json!({"action": "resign", "reasoning_cost": 7})
    );
}

#[tokio::test]
async fn unknown_model_is_rejected() {
    let (app, provider) = app(ScriptedProvider::new(ProviderFamily::OpenAi, vec![]));
    let resp = app.oneshot(json_request("/get_move", "gpt-2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        serde_json::json!({"detail": "unknown model `gpt-2`"})
    );
    assert_eq!(provider.opens(), 0);
}

#[tokio::test]
async fn unknown_model_on_stream_route_is_rejected_before_streaming() {
    let (app, _) = app(ScriptedProvider::new(ProviderFamily::OpenAi, vec![]));
    let resp = app
        .oneshot(json_request("/get_move_stream", "gpt-2"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn missing_credential_is_a_server_fault() {
    let (app, _) = app(
        ScriptedProvider::new(ProviderFamily::Gemini, vec![Step::answer("e5")]).without_credential(),
    );
    let resp = app.oneshot(json_request("/get_move", MODEL)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert!(
        json["detail"]
            .as_str()
            .unwrap()
            .contains("Google Gemini API key not configured")
    );
}

#[tokio::test]
async fn upstream_failure_is_a_server_fault() {
    let (app, _) = app(ScriptedProvider::new(
        ProviderFamily::OpenAi,
        vec![Step::fail("rate limited (HTTP 429)")],
    ));
    let resp = app.oneshot(json_request("/get_move", MODEL)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await["detail"],
        "error calling OpenAI API: rate limited (HTTP 429)"
    );
}

#[tokio::test(start_paused = true)]
async fn expired_deadline_is_a_gateway_timeout() {
    let (app, _) = app_with_deadline(
        ScriptedProvider::new(ProviderFamily::Anthropic, vec![Step::Stall]),
        Duration::from_secs(5),
    );
    let resp = app.oneshot(json_request("/get_move", MODEL)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn draw_response_declines_ambiguous_answers() {
    let (app, provider) = app(ScriptedProvider::new(
        ProviderFamily::OpenAi,
        vec![Step::answer("I think I will decline for now")],
    ));
    let resp = app
        .oneshot(json_request("/draw_response", MODEL))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        serde_json::json!({"action": "draw_decline", "reasoning_cost": 0})
    );
    assert!(provider.requests().await[0].prompt.contains("Move History: e4"));
}

#[tokio::test]
async fn draw_response_accepts() {
    let (app, _) = app(ScriptedProvider::new(
        ProviderFamily::Gemini,
        vec![Step::answer("ACCEPT")],
    ));
    let resp = app
        .oneshot(json_request("/draw_response", MODEL))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["action"], "draw_accept");
}

#[tokio::test]
async fn move_stream_emits_canonical_frames() {
    let (app, provider) = app(ScriptedProvider::new(
        ProviderFamily::Anthropic,
        vec![Step::reason("Hmm"), Step::answer("Nf6")],
    ));
    let resp = app
        .oneshot(json_request("/get_move_stream", MODEL))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    let body = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
    let frames: Vec<&str> = body
        .split("\n\n")
        .filter(|f| !f.is_empty())
        .map(|f| f.strip_prefix("data: ").unwrap())
        .collect();
    assert_eq!(
        frames,
        vec![
            r#"{"type":"thinking_start"}"#,
            r#"{"type":"thinking_delta","content":"Hmm"}"#,
            r#"{"type":"thinking_end"}"#,
            r#"{"type":"response_start"}"#,
            r#"{"type":"response_delta","content":"Nf6"}"#,
            r#"{"type":"response_end"}"#,
            r#"{"type":"result","data":{"move":"Nf6","reasoning_cost":1}}"#,
            "[DONE]",
        ]
    );
    assert!(provider.requests().await[0].stream);
}

#[tokio::test]
async fn move_stream_failure_ends_with_error_frame() {
    let (app, _) = app(ScriptedProvider::new(
        ProviderFamily::Xai,
        vec![Step::answer("Q"), Step::fail("stream reset")],
    ));
    let resp = app
        .oneshot(json_request("/get_move_stream", MODEL))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
    assert!(body.ends_with(
        "data: {\"type\":\"error\",\"message\":\"error calling X.AI API: stream reset\"}\n\n"
    ));
    assert!(!body.contains("[DONE]"));
    assert!(!body.contains("\"type\":\"result\""));
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let (app, _) = app(ScriptedProvider::new(ProviderFamily::OpenAi, vec![]));
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/get_move")
        .header(header::ORIGIN, ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        ORIGIN
    );
}

#[tokio::test]
async fn cors_ignores_other_origins() {
    let (app, _) = app(ScriptedProvider::new(ProviderFamily::OpenAi, vec![]));
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/get_move")
        .header(header::ORIGIN, "http://evil.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
