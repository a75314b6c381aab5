//! Integration tests for the Luxe API.
//!
//! Each test builds its own router over in-memory state: a mock-embedded
//! catalog and a scripted text generator.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use luxe_api::create_router;
use luxe_api::state::AppState;
use luxe_chat::{ChatOrchestrator, ConversationStore, LlmClient, LlmError, GREETING_REPLY};
use luxe_core::types::{ChatResponse, HealthStatus, ProductId, ProductRecord};
use luxe_vector::{CatalogStore, MockEmbedding, ProductTable, RetrievalEngine, VectorIndex};

// =============================================================================
// Helpers
// =============================================================================

const DIMS: usize = 16;

/// Echoes a fixed reply, or fails with a fixed error.
struct StubLlm {
    fail: bool,
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        if self.fail {
            Err(LlmError::Api {
                status: 500,
                message: "quota exhausted".to_string(),
            })
        } else {
            Ok("These sneakers are a perfect match.".to_string())
        }
    }
}

fn retrieval() -> RetrievalEngine {
    let embedder = MockEmbedding::with_dimensions(DIMS);
    let names = ["I want red sneakers", "Ivory silk blouse", "Leather tote"];
    let products = names
        .iter()
        .enumerate()
        .map(|(i, name)| ProductRecord {
            id: ProductId::Int(i as i64 + 1),
            name: name.to_string(),
            price: serde_json::Number::from(400 + i as i64),
            description: format!("{} from the new season.", name),
            images: vec![format!("/static/{}.jpg", i + 1)],
        })
        .collect();
    let vectors = names.iter().map(|n| embedder.vector_for(n)).collect();
    let index = VectorIndex::from_vectors(DIMS, vectors).unwrap();
    let table = ProductTable::pair(&CatalogStore::new(products), index);
    RetrievalEngine::new(Arc::new(table), embedder)
}

fn health() -> HealthStatus {
    HealthStatus {
        api_key_configured: true,
        products_loaded: true,
        faiss_index_loaded: true,
        embedder_loaded: true,
    }
}

fn make_app_with(llm: StubLlm, health: HealthStatus) -> axum::Router {
    let orchestrator = ChatOrchestrator::new(
        Arc::new(retrieval()),
        Arc::new(ConversationStore::new()),
        Arc::new(llm),
    );
    create_router(AppState::new(orchestrator, health))
}

fn make_app() -> axum::Router {
    make_app_with(StubLlm { fail: false }, health())
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// POST /chat
// =============================================================================

#[tokio::test]
async fn test_chat_greeting() {
    let resp = make_app()
        .oneshot(post_json("/chat", r#"{"user_id":"u1","message":"Hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: ChatResponse = serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(body.result, GREETING_REPLY);
    assert!(body.products.is_empty());
    assert_eq!(body.history.len(), 2);
}

#[tokio::test]
async fn test_chat_recommendation_shape() {
    let resp = make_app()
        .oneshot(post_json(
            "/chat",
            r#"{"user_id":"u1","message":"I want red sneakers"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["result"], "These sneakers are a perfect match.");
    let products = json["products"].as_array().unwrap();
    assert!(!products.is_empty() && products.len() <= 2);
    assert_eq!(products[0]["name"], "I want red sneakers");
    assert_eq!(products[0]["link"], "/product/1");
    assert_eq!(products[0]["image"], "/static/1.jpg");
    for p in products {
        assert!(!p["name"].as_str().unwrap().is_empty());
        assert!(p["link"].as_str().unwrap().starts_with("/product/"));
    }

    let history = json["history"].as_array().unwrap();
    assert_eq!(history[0]["role"], "user");
    assert_eq!(history[0]["content"], "I want red sneakers");
    assert_eq!(history[1]["role"], "assistant");
}

#[tokio::test]
async fn test_chat_llm_failure_still_200() {
    let app = make_app_with(StubLlm { fail: true }, health());
    let resp = app
        .oneshot(post_json("/chat", r#"{"message":"Ivory silk blouse"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    let result = json["result"].as_str().unwrap();
    assert!(result.starts_with("I'm sorry"));
    assert!(result.contains("quota exhausted"));
    assert!(!json["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_defaults_user_and_message() {
    let app = make_app();

    let resp = app
        .clone()
        .oneshot(post_json("/chat", r#"{"message":"Hi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Second call without user_id lands in the same "default" conversation.
    let resp = app.oneshot(post_json("/chat", "{}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let history = json["history"].as_array().unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[2]["content"], "");
}

#[tokio::test]
async fn test_chat_history_persists_per_user() {
    let app = make_app();
    for msg in ["Hello", "Leather tote"] {
        let body = format!(r#"{{"user_id":"alice","message":"{}"}}"#, msg);
        let resp = app.clone().oneshot(post_json("/chat", &body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .oneshot(post_json("/chat", r#"{"user_id":"bob","message":"Hello"}"#))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chat_malformed_json_is_server_error() {
    let resp = make_app()
        .oneshot(post_json("/chat", "{not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().starts_with("Server error: "));
}

#[tokio::test]
async fn test_chat_wrong_field_type_is_server_error() {
    let resp = make_app()
        .oneshot(post_json("/chat", r#"{"message": 42}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn test_chat_get_not_allowed() {
    let resp = make_app()
        .oneshot(Request::get("/chat").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// GET /health
// =============================================================================

#[tokio::test]
async fn test_health_reports_flags() {
    let flags = HealthStatus {
        api_key_configured: true,
        products_loaded: true,
        faiss_index_loaded: false,
        embedder_loaded: false,
    };
    let resp = make_app_with(StubLlm { fail: false }, flags)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["api_key_configured"], true);
    assert_eq!(json["products_loaded"], true);
    assert_eq!(json["faiss_index_loaded"], false);
    assert_eq!(json["embedder_loaded"], false);
    assert_eq!(json.as_object().unwrap().len(), 4);
}

#[tokio::test]
async fn test_health_has_no_side_effects() {
    let app = make_app();
    for _ in 0..3 {
        let resp = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: HealthStatus = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(body, health());
    }
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let resp = make_app()
        .oneshot(
            Request::get("/health")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}

#[tokio::test]
async fn test_unknown_route_404() {
    let resp = make_app()
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
