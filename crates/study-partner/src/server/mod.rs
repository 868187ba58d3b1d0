//! HTTP server for the study partner

pub mod render;
pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::StudyConfig;
use crate::error::Result;
use state::AppState;

/// Study partner HTTP server
pub struct StudyServer {
    config: StudyConfig,
    state: AppState,
}

impl StudyServer {
    /// Create a new server talking to the configured completion endpoint
    pub fn new(config: StudyConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Create a server around existing state
    pub fn with_state(config: StudyConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let max_upload_size = self.config.server.max_upload_size;

        let mut router = Router::new()
            // Health check
            .route("/health", get(health_check))
            .merge(routes::page_routes(max_upload_size))
            .nest("/api", routes::api_routes(max_upload_size))
            .with_state(self.state.clone())
            // Middleware layers (order matters - applied bottom to top)
            .layer(RequestBodyLimitLayer::new(max_upload_size))
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| crate::error::Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting study partner on http://{}", addr);
        tracing::info!("API info: http://{}/api/info", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| crate::error::Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::error::Error;
    use crate::providers::{ChatMessage, CompletionProvider};

    const BOUNDARY: &str = "study-partner-test-boundary";

    struct CannedProvider {
        fail: bool,
    }

    #[async_trait]
    impl CompletionProvider for CannedProvider {
        async fn complete(&self, _api_key: &str, messages: &[ChatMessage], _temperature: f32) -> crate::Result<String> {
            if self.fail {
                return Err(Error::llm("HTTP 503 Service Unavailable - over capacity"));
            }
            let cited = messages[1].content.contains("[From notes.txt]");
            Ok(format!("**Mitosis** splits a cell. cited={}", cited))
        }

        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned-model"
        }
    }

    fn router(fail: bool) -> Router {
        let config = StudyConfig::default();
        let state = AppState::with_provider(config.clone(), Arc::new(CannedProvider { fail }));
        StudyServer::with_state(config, state).build_router()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload_request(uri: &str, files: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (filename, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        let value = if body.is_empty() { Value::Null } else { serde_json::from_str(&body).unwrap() };
        (status, value)
    }

    async fn set_key(app: &Router) {
        let (status, body) = send_json(app, json_request(Method::PUT, "/api/credential", json!({"api_key": "gsk_test"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_credential"], true);
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(false);
        let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_query_without_key_is_rejected() {
        let app = router(false);
        let (status, body) = send_json(&app, json_request(Method::POST, "/api/query", json!({"question": "what is mitosis"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "validation_error");
        assert_eq!(body["error"]["message"], "Please enter your Groq API key!");
    }

    #[tokio::test]
    async fn test_upload_query_and_reset() {
        let app = router(false);
        set_key(&app).await;

        let (status, body) = send_json(
            &app,
            upload_request(
                "/api/documents",
                &[("notes.txt", "Mitosis is cell division."), ("slides.pptx", "PK")],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["processed_files"], json!(["notes.txt"]));
        assert_eq!(body["fragment_count"], 1);
        assert_eq!(body["errors"][0]["filename"], "slides.pptx");

        let (status, body) = send_json(&app, json_request(Method::POST, "/api/query", json!({"question": "explain mitosis"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "**Mitosis** splits a cell. cited=true");
        assert_eq!(body["sources"][0]["filename"], "notes.txt");
        assert_eq!(body["sources"][0]["index"], 1);

        let (_, body) = send_json(&app, Request::get("/api/conversation").body(Body::empty()).unwrap()).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][0]["role"], "user");

        let (status, _) = send(&app, Request::delete("/api/conversation").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send_json(&app, Request::get("/api/conversation").body(Body::empty()).unwrap()).await;
        assert!(body["messages"].as_array().unwrap().is_empty());

        let (_, body) = send_json(&app, Request::get("/api/documents").body(Body::empty()).unwrap()).await;
        assert_eq!(body["fragment_count"], 1);
    }

    #[tokio::test]
    async fn test_cleared_credential_blocks_questions() {
        let app = router(false);
        set_key(&app).await;
        send(&app, upload_request("/api/documents", &[("notes.txt", "Mitosis is cell division.")])).await;

        let (status, body) = send_json(&app, Request::delete("/api/credential").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_credential"], false);

        let (status, body) = send_json(&app, json_request(Method::POST, "/api/query", json!({"question": "explain mitosis"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please enter your Groq API key!");
    }

    #[tokio::test]
    async fn test_upload_with_no_readable_files_keeps_documents() {
        let app = router(false);
        set_key(&app).await;
        send(&app, upload_request("/api/documents", &[("notes.txt", "Mitosis is cell division.")])).await;

        let (status, body) = send_json(&app, upload_request("/api/documents", &[("scan.pdf", "garbage")])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("scan.pdf"));

        let (_, body) = send_json(&app, Request::get("/api/documents").body(Body::empty()).unwrap()).await;
        assert_eq!(body["processed_files"], json!(["notes.txt"]));
    }

    #[tokio::test]
    async fn test_completion_failure_is_bad_gateway_and_log_unchanged() {
        let app = router(true);
        set_key(&app).await;
        send(&app, upload_request("/api/documents", &[("notes.txt", "Mitosis is cell division.")])).await;

        let (status, body) = send_json(&app, json_request(Method::POST, "/api/query", json!({"question": "explain mitosis"}))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["type"], "llm_error");

        let (_, body) = send_json(&app, Request::get("/api/conversation").body(Body::empty()).unwrap()).await;
        assert!(body["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settings_round_trip_and_bounds() {
        let app = router(false);

        let (status, body) = send_json(
            &app,
            json_request(Method::PUT, "/api/settings", json!({"temperature": 0.5, "chunk_size": 1500, "top_k": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["settings"]["chunk_size"], 1500);
        assert_eq!(body["bounds"]["top_k"]["max"], 5);

        let (status, _) = send_json(
            &app,
            json_request(Method::PUT, "/api/settings", json!({"temperature": 0.5, "chunk_size": 1500, "top_k": 7})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send_json(&app, Request::get("/api/settings").body(Body::empty()).unwrap()).await;
        assert_eq!(body["settings"]["top_k"], 4);
    }

    #[tokio::test]
    async fn test_page_flow() {
        let app = router(false);

        let (status, page) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("Please enter your Groq API key in the sidebar!"));

        let (_, page) = send(&app, form_request("/credential", "api_key=gsk_test")).await;
        assert!(page.contains("API key saved"));
        assert!(!page.contains("gsk_test"));

        let (_, page) = send(&app, upload_request("/process", &[("notes.txt", "Mitosis is cell division.")])).await;
        assert!(page.contains("Successfully processed 1 file(s) with 1 chunks!"));
        assert!(page.contains("action=\"/ask\""));

        let (_, page) = send(&app, form_request("/ask", "question=explain+mitosis+%3Cb%3Eplease%3C%2Fb%3E")).await;
        assert!(page.contains("explain mitosis &lt;b&gt;please&lt;/b&gt;"));
        assert!(page.contains("<strong>Mitosis</strong> splits a cell."));
        assert!(page.contains("View Sources"));

        let (_, page) = send(&app, form_request("/reset", "")).await;
        assert!(!page.contains("View Sources"));
    }

    #[tokio::test]
    async fn test_page_shows_completion_error_banner() {
        let app = router(true);
        send(&app, form_request("/credential", "api_key=gsk_test")).await;
        send(&app, upload_request("/process", &[("notes.txt", "Mitosis is cell division.")])).await;

        let (status, page) = send(&app, form_request("/ask", "question=mitosis")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("Error generating response: API Error: HTTP 503"));
        assert!(!page.contains("You:</strong>"));
    }

    #[tokio::test]
    async fn test_page_rejects_out_of_range_settings() {
        let app = router(false);
        let (_, page) = send(&app, form_request("/settings", "temperature=0.3&chunk_size=3000&top_k=3")).await;
        assert!(page.contains("Chunk size must be between 500 and 2000"));
    }
}
