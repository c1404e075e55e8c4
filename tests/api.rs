use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use rag_creator_backend::core::config::{AppPaths, Settings};
use rag_creator_backend::core::errors::ApiError;
use rag_creator_backend::llm::{ChatRequest, LlmProvider};
use rag_creator_backend::server::router::router;
use rag_creator_backend::state::AppState;

/// Answers every prompt with a fixed string and keeps the prompts it saw.
struct RecordingProvider {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LlmProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError> {
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);
        Ok("Our office opens at 9am.".to_string())
    }
}

struct TestApp {
    router: Router,
    provider: Arc<RecordingProvider>,
    _dir: tempfile::TempDir,
    data_dir: std::path::PathBuf,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let paths = Arc::new(AppPaths::with_dirs(dir.path().to_path_buf(), data_dir.clone()));
    let provider = Arc::new(RecordingProvider {
        prompts: Mutex::new(Vec::new()),
    });
    let state = AppState::assemble(paths, Settings::default(), provider.clone()).unwrap();

    TestApp {
        router: router(state),
        provider,
        _dir: dir,
        data_dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_upload(filename: &str, contents: &str) -> Request<Body> {
    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n{c}\r\n--{b}--\r\n",
        b = boundary,
        f = filename,
        c = contents
    );
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

fn deploy_body(rag_type: &str, texts: &[&str]) -> Value {
    json!({
        "extracted_texts": texts,
        "ragType": rag_type,
        "useCase": "front desk",
        "vectorDb": "chroma",
        "theme": "sunset",
        "features": ["citations"]
    })
}

#[tokio::test]
async fn health_check_works() {
    let app = test_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn scraping_unreachable_url_reports_error_text() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json("/api/scrape", json!({"urls": ["http://127.0.0.1:1/", ""]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let texts = body["texts"].as_array().unwrap();
    assert_eq!(texts.len(), 1);
    let text = texts[0].as_str().unwrap();
    assert!(text.starts_with("Source: http://127.0.0.1:1/\nError: "));
}

#[tokio::test]
async fn upload_of_unsupported_type_returns_message() {
    let app = test_app();
    let (status, body) = send(&app.router, multipart_upload("deck.pptx", "binary")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Unsupported file type: .pptx");
}

#[tokio::test]
async fn upload_of_text_file_returns_contents() {
    let app = test_app();
    let (status, body) = send(&app.router, multipart_upload("hours.txt", "Open 9am to 5pm.")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["filename"], "hours.txt");
    assert_eq!(body["text"], "Open 9am to 5pm.");

    let leftovers = std::fs::read_dir(app.data_dir.join("uploads")).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn upload_without_file_field_is_server_error() {
    let app = test_app();
    let boundary = "B";
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(
            "--B\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--B--\r\n",
        ))
        .unwrap();

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("'file'"));
}

#[tokio::test]
async fn chat_recommends_architectures() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json("/api/chat", json!({"query": "We have lots of PDF manuals"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["answer"].as_str().unwrap().starts_with("Hybrid RAG"));
}

#[tokio::test]
async fn deploy_echoes_type_and_counts_documents() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json(
            "/api/deploy",
            deploy_body("Citation", &["Office hours: we open at 9am.", "Parking is free."]),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Agentic RAG deployed successfully.");
    assert_eq!(body["theme"], "sunset");

    let info = &body["deployment_info"];
    assert_eq!(info["type"], "Citation");
    assert_eq!(info["documents_processed"], 2);
    assert_eq!(info["total_characters"], 45);
    assert_eq!(info["vector_database"], "chroma");
    let rag_id = info["rag_id"].as_str().unwrap();
    assert_eq!(
        info["query_endpoint"],
        format!("http://localhost:8000/api/rag/{}/query", rag_id)
    );
}

#[tokio::test]
async fn deploy_accepts_bodies_beyond_the_framework_default() {
    let app = test_app();
    let long_text = "word ".repeat(600_000);
    let (status, body) = send(
        &app.router,
        post_json("/api/deploy", deploy_body("hybrid", &[long_text.as_str()])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let info = &body["deployment_info"];
    assert_eq!(info["documents_processed"], 1);
    assert_eq!(info["total_characters"], 3_000_000);
    assert_eq!(info["chunks_indexed"], 200);
}

#[tokio::test]
async fn test_chat_without_deployment_is_server_error() {
    let app = test_app();
    let (status, body) = send(&app.router, post_json("/api/test-chat", json!({"query": "hi"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "No RAG pipeline has been deployed yet");
}

#[tokio::test]
async fn deployed_pipeline_answers_with_retrieved_context() {
    let app = test_app();
    let (_, deployed) = send(
        &app.router,
        post_json(
            "/api/deploy",
            deploy_body("basic", &["Office hours: we open at 9am.", "Parking is free."]),
        ),
    )
    .await;
    let rag_id = deployed["deployment_info"]["rag_id"].as_str().unwrap().to_string();
    let pipeline_id = deployed["deployment_info"]["pipeline_id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = send(
        &app.router,
        post_json("/api/test-chat", json!({"query": "When does the office open?"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Our office opens at 9am.");
    assert_eq!(body["pipeline_id"], pipeline_id);
    assert_eq!(body["sources"], json!(["document_1"]));

    {
        let prompts = app.provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("'front desk' persona"));
        assert!(prompts[0].contains("Office hours: we open at 9am."));
        assert!(!prompts[0].contains("Parking is free."));
    }

    let (status, body) = send(
        &app.router,
        post_json(
            &format!("/api/rag/{}/query", rag_id),
            json!({"query": "Is parking free?"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sources"], json!(["document_2"]));
}

#[tokio::test]
async fn unknown_pipeline_is_server_error() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json("/api/rag/nope/query", json!({"query": "anything"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Unknown pipeline: nope");
}

#[tokio::test]
async fn visualize_describes_the_pipeline_graph() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json(
            "/api/visualize",
            json!({"ragType": "hybrid", "vectorDb": "pinecone", "useCase": "legal"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let viz = &body["visualization"];
    assert_eq!(viz["architecture"], "hybrid");
    assert_eq!(viz["storage"], "Pinecone");
    assert_eq!(viz["pipeline"]["components"].as_array().unwrap().len(), 5);
    assert!(viz["pipeline"]["connections"]
        .as_array()
        .unwrap()
        .contains(&json!({"from": "joiner", "to": "prompt_builder"})));
}

#[tokio::test]
async fn feedback_is_appended_to_log() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json(
            "/api/feedback",
            json!({"chat_id": "test_session", "rating": 4, "comment": ""}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let log = std::fs::read_to_string(app.data_dir.join("feedback.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("\"rating\":4"));

    let (status, _) = send(
        &app.router,
        post_json("/api/feedback", json!({"chat_id": "test_session", "rating": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn demo_payload_is_static() {
    let app = test_app();
    let request = Request::builder().uri("/api/demo").body(Body::empty()).unwrap();

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["demo"]["ragType"], "hybrid");
}
