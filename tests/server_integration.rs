//! Router-level tests: every UI event driven through HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use mhdqa_gui::AppState;
use mhdqa_gui::config::AppConfig;
use mhdqa_gui::error::AppError;
use mhdqa_gui::responder::{PlaceholderGenerator, ResponseGenerator};
use mhdqa_gui::server::build_router;
use mhdqa_gui::session::{ChatHistoryEntry, ChatMessage, MessageRole};
use serde_json::Value;

#[derive(Debug)]
struct OfflineGenerator;

#[async_trait]
impl ResponseGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::ResponseGenerationFailed("engine offline".into()))
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::load_from_args(["mhdqa-gui"]).expect("default config");
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
    config.assets.static_dir = root.clone();
    config.assets.logo_path = root.join("logo.png");
    config.assets.styles_path = root.join("styles.md");
    config.uploads.max_files = 3;
    config
}

fn server_with(generator: Arc<dyn ResponseGenerator>) -> TestServer {
    let state = AppState::new(Arc::new(test_config()), generator);
    TestServer::new(build_router(state)).expect("test server")
}

fn htmx() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("hx-request"),
        HeaderValue::from_static("true"),
    )
}

/// Start a session through `/` and return its id.
async fn new_session(server: &TestServer) -> String {
    let response = server.get("/").await;
    response.assert_status(StatusCode::SEE_OTHER);
    let location = response.header("location");
    let location = location.to_str().expect("ascii location");
    location
        .strip_prefix("/sessions/")
        .expect("session redirect")
        .to_string()
}

async fn messages(server: &TestServer, id: &str) -> Vec<ChatMessage> {
    server
        .get(&format!("/api/sessions/{id}/messages"))
        .await
        .json::<Vec<ChatMessage>>()
}

fn pdf(name: &str, size: usize) -> Part {
    Part::bytes(vec![b'%'; size])
        .file_name(name)
        .mime_type("application/pdf")
}

#[tokio::test]
async fn test_new_session_is_seeded() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;

    let page = server.get(&format!("/sessions/{id}")).await;
    page.assert_status_ok();
    let html = page.text();
    assert!(html.contains("Ask Me Anything"));
    assert!(html.contains("Hello."));

    let msgs = messages(&server, &id).await;
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].role, MessageRole::User);
    assert_eq!(msgs[1].role, MessageRole::Assistant);
}

#[tokio::test]
async fn test_question_round_trip_htmx() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;
    let (name, value) = htmx();

    let response = server
        .post(&format!("/sessions/{id}/messages"))
        .add_header(name, value)
        .form(&[("question", "Hello")])
        .await;

    response.assert_status_ok();
    let fragment = response.text();
    assert!(fragment.starts_with("<section id=\"transcript\""));
    assert!(fragment.contains("Will be modified: Hello"));

    let msgs = messages(&server, &id).await;
    assert_eq!(msgs.len(), 4);
    assert_eq!(
        msgs.last(),
        Some(&ChatMessage::new(MessageRole::Assistant, "Will be modified: Hello"))
    );

    let history = server
        .get(&format!("/api/sessions/{id}/history"))
        .await
        .json::<Vec<ChatHistoryEntry>>();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question, "Hello");
}

#[tokio::test]
async fn test_plain_form_redirects_back() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;

    let response = server
        .post(&format!("/sessions/{id}/messages"))
        .form(&[("question", "What is credit risk?")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(messages(&server, &id).await.len(), 4);
}

#[tokio::test]
async fn test_empty_question_appends_nothing() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;
    let (name, value) = htmx();

    server
        .post(&format!("/sessions/{id}/messages"))
        .add_header(name, value)
        .form(&[("question", "")])
        .await
        .assert_status_ok();

    assert_eq!(messages(&server, &id).await.len(), 2);
}

#[tokio::test]
async fn test_restart_reseeds() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;
    for q in ["one", "two"] {
        server
            .post(&format!("/sessions/{id}/messages"))
            .form(&[("question", q)])
            .await;
    }
    assert_eq!(messages(&server, &id).await.len(), 6);

    server
        .post(&format!("/sessions/{id}/restart"))
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let msgs = messages(&server, &id).await;
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].content, "Hello.");
    let history = server
        .get(&format!("/api/sessions/{id}/history"))
        .await
        .json::<Vec<ChatHistoryEntry>>();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_generator_failure_is_inline_notice() {
    let server = server_with(Arc::new(OfflineGenerator));
    let id = new_session(&server).await;
    let (name, value) = htmx();

    let response = server
        .post(&format!("/sessions/{id}/messages"))
        .add_header(name, value)
        .form(&[("question", "Hello")])
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("RESPONSE_GENERATION_FAILED"));

    let msgs = messages(&server, &id).await;
    assert_eq!(msgs.len(), 3);
    assert_eq!(msgs[2].role, MessageRole::User);
}

#[tokio::test]
async fn test_upload_lists_documents() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;
    let (name, value) = htmx();

    let form = MultipartForm::new()
        .add_part("files", pdf("basel.pdf", 1024))
        .add_part("files", pdf("ifrs9.pdf", 2048));
    let response = server
        .post(&format!("/sessions/{id}/documents"))
        .add_header(name, value)
        .multipart(form)
        .await;

    response.assert_status_ok();
    let fragment = response.text();
    assert!(fragment.contains("id=\"document-list\""));
    assert!(fragment.contains("basel.pdf"));
    assert!(fragment.contains("ifrs9.pdf"));

    let records = server
        .get(&format!("/api/sessions/{id}/documents"))
        .await
        .json::<Vec<Value>>();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["number_of_pages"], "unknown");
}

#[tokio::test]
async fn test_upload_rejects_wrong_kind() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;
    let (name, value) = htmx();

    let form = MultipartForm::new().add_part(
        "files",
        Part::text("plain notes")
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );
    let response = server
        .post(&format!("/sessions/{id}/documents"))
        .add_header(name, value)
        .multipart(form)
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("UPLOAD_REJECTED"));

    let info = server.get(&format!("/api/sessions/{id}")).await.json::<Value>();
    assert_eq!(info["document_count"], 0);
}

#[tokio::test]
async fn test_upload_respects_file_limit() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;

    let form = (0..5).fold(MultipartForm::new(), |form, i| {
        form.add_part("files", pdf(&format!("doc{i}.pdf"), 10))
    });
    let response = server
        .post(&format!("/sessions/{id}/documents"))
        .multipart(form)
        .await;

    // Rejections are shown in place on the full page.
    response.assert_status_ok();
    assert!(response.text().contains("at most 3 documents"));

    let info = server.get(&format!("/api/sessions/{id}")).await.json::<Value>();
    assert_eq!(info["document_count"], 3);
}

#[tokio::test]
async fn test_reupload_replaces_when_full() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;

    let form = ["a.pdf", "b.pdf", "c.pdf"]
        .iter()
        .fold(MultipartForm::new(), |form, name| {
            form.add_part("files", pdf(name, 10))
        });
    server
        .post(&format!("/sessions/{id}/documents"))
        .multipart(form)
        .await
        .assert_status(StatusCode::SEE_OTHER);

    // Same name twice in one body, widget already full.
    let form = MultipartForm::new()
        .add_part("files", pdf("a.pdf", 50))
        .add_part("files", pdf("a.pdf", 99));
    let response = server
        .post(&format!("/sessions/{id}/documents"))
        .multipart(form)
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    let records = server
        .get(&format!("/api/sessions/{id}/documents"))
        .await
        .json::<Vec<Value>>();
    assert_eq!(records.len(), 3);
    let a = records
        .iter()
        .find(|r| r["file_name"] == "a.pdf")
        .expect("a.pdf listed");
    let bytes = a["file_size"].as_f64().expect("size") * 1024.0 * 1024.0;
    assert_eq!(bytes.round(), 99.0);
}

#[tokio::test]
async fn test_truncated_upload_keeps_earlier_files() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;

    let body = concat!(
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"files\"; filename=\"a.pdf\"\r\n",
        "Content-Type: application/pdf\r\n\r\n",
        "%PDF-1.4\r\n",
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"files\"; filename=\"b.pdf\"\r\n",
        "Content-Type: application/pdf\r\n\r\n",
        "%PDF-1",
    );
    let response = server
        .post(&format!("/sessions/{id}/documents"))
        .content_type("multipart/form-data; boundary=XBOUNDARY")
        .bytes(axum::body::Bytes::from_static(body.as_bytes()))
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("MULTIPART_ERROR"));

    let records = server
        .get(&format!("/api/sessions/{id}/documents"))
        .await
        .json::<Vec<Value>>();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["file_name"], "a.pdf");
}

#[tokio::test]
async fn test_remove_and_open_document() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let id = new_session(&server).await;

    server
        .post(&format!("/sessions/{id}/documents"))
        .multipart(MultipartForm::new().add_part("files", pdf("basel.pdf", 10)))
        .await;

    let (name, value) = htmx();
    let opened = server
        .post(&format!("/sessions/{id}/documents/open"))
        .add_header(name, value)
        .form(&[("name", "basel.pdf")])
        .await;
    opened.assert_status_ok();
    assert!(opened.text().contains("NOT_IMPLEMENTED"));

    server
        .post(&format!("/sessions/{id}/documents/remove"))
        .form(&[("name", "basel.pdf")])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let records = server
        .get(&format!("/api/sessions/{id}/documents"))
        .await
        .json::<Vec<Value>>();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let a = new_session(&server).await;
    let b = new_session(&server).await;
    assert_ne!(a, b);

    server
        .post(&format!("/sessions/{a}/messages"))
        .form(&[("question", "only for a")])
        .await;

    assert_eq!(messages(&server, &a).await.len(), 4);
    assert_eq!(messages(&server, &b).await.len(), 2);
}

#[tokio::test]
async fn test_unknown_session_api_is_not_found() {
    let server = server_with(Arc::new(PlaceholderGenerator));
    let response = server
        .get("/api/sessions/7f1c3a52-1f0e-4c55-9a43-5f1f2a3b4c5d/messages")
        .await;
    response.assert_status_not_found();
    let body = response.json::<Value>();
    assert_eq!(body["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_about_and_static() {
    let server = server_with(Arc::new(PlaceholderGenerator));

    let about = server.get("/about").await;
    about.assert_status_ok();
    assert!(about.text().contains("Multi-Hop Document Based Open-Domain Question Answering"));

    server.get("/static/app.css").await.assert_status_ok();
}
