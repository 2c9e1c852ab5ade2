//! HTTP server: routes, middleware and handlers.
//!
//! Each request is one UI turn for one session. Form endpoints answer HTMX
//! requests with the fragment to swap and plain form posts with a redirect
//! back to the session page.

use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::config::AppConfig;
use crate::documents::{UploadedDocumentRecord, UploadedFile};
use crate::error::AppError;
use crate::responder::PlaceholderGenerator;
use crate::session::{ChatHistoryEntry, ChatMessage, Session, UiEvent};
use crate::ui::{self, ChatPage};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let state = AppState::new(Arc::clone(&config), Arc::new(PlaceholderGenerator));

    info!(
        name: "responder.configured",
        generator = state.generator.name(),
        "Response generator configured"
    );

    let app = build_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let timeout_duration = state.config.server.request_timeout();
    let body_limit = state.config.server.body_limit_mb * 1024 * 1024;
    let static_dir = state.config.assets.static_dir.clone();

    Router::new()
        // HTML pages
        .route("/", get(index_handler))
        .route("/about", get(about_handler))
        .route("/sessions/{id}", get(session_page))
        // UI events
        .route("/sessions/{id}/messages", post(submit_question))
        .route("/sessions/{id}/documents", post(upload_documents))
        .route("/sessions/{id}/documents/remove", post(remove_document))
        .route("/sessions/{id}/documents/open", post(open_document))
        .route("/sessions/{id}/restart", post(restart_chat))
        // JSON API
        .route("/api/sessions/{id}", get(api_get_session))
        .route("/api/sessions/{id}/messages", get(api_get_messages))
        .route("/api/sessions/{id}/history", get(api_get_history))
        .route("/api/sessions/{id}/documents", get(api_get_documents))
        // Static assets
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let duration = timeout_duration;
                async move {
                    match tokio::time::timeout(duration, next.run(req)).await {
                        Ok(res) => res,
                        Err(_) => {
                            (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
                        }
                    }
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Turn rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Page region an event re-renders.
#[derive(Debug, Clone, Copy)]
enum Region {
    Transcript,
    Documents,
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|v| v.as_bytes() == b"true")
}

fn render_page(state: &AppState, session: &Session, region: Region, notice: Option<&str>) -> String {
    let snapshot = session.snapshot();
    let documents = snapshot.documents();
    let (transcript_notice, sidebar_notice) = match region {
        Region::Transcript => (notice, None),
        Region::Documents => (None, notice),
    };
    ChatPage {
        session_id: session.id(),
        state: &snapshot,
        documents: &documents,
        assets: &state.assets,
        transcript_notice,
        sidebar_notice,
    }
    .render()
}

/// Finish a turn: swap the region for HTMX, otherwise redirect back to the
/// page (or render it in place when there is a notice to show).
fn finish_turn(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    region: Region,
    notice: Option<String>,
) -> Response {
    if is_htmx(headers) {
        let snapshot = session.snapshot();
        let html = match region {
            Region::Transcript => ui::chat::transcript(&snapshot, notice.as_deref()),
            Region::Documents => ui::sidebar::document_list(
                session.id(),
                &snapshot.documents(),
                notice.as_deref(),
            ),
        };
        return Html(html).into_response();
    }

    match notice {
        Some(notice) => Html(render_page(state, session, region, Some(&notice))).into_response(),
        None => Redirect::to(&format!("/sessions/{}", session.id())).into_response(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Start a new session.
async fn index_handler(State(state): State<AppState>) -> Redirect {
    let session = state.sessions.create();
    Redirect::to(&format!("/sessions/{}", session.id()))
}

/// GET /about - About page.
async fn about_handler(State(state): State<AppState>) -> Html<String> {
    Html(ui::about_page(&state.assets))
}

/// GET /sessions/:id - Full chat page. Unknown IDs get a fresh seeded session.
async fn session_page(State(state): State<AppState>, Path(id): Path<Uuid>) -> Html<String> {
    let session = state.sessions.get_or_create(&id.to_string());
    Html(render_page(&state, &session, Region::Transcript, None))
}

// ─────────────────────────────────────────────────────────────────────────────
// UI Event Handlers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct QuestionForm {
    #[serde(default)]
    question: String,
}

#[derive(Debug, Deserialize)]
struct DocumentForm {
    name: String,
}

/// POST /sessions/:id/messages - Submit a question and answer it.
async fn submit_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Form(form): Form<QuestionForm>,
) -> Response {
    let session = state.sessions.get_or_create(&id.to_string());

    tracing::info!(
        session_id = %session.id(),
        question_length = form.question.len(),
        "Received question"
    );

    let notice = match turn(&state, &session, form.question).await {
        Ok(()) => None,
        Err(e) => {
            tracing::error!(session_id = %session.id(), error = %e, "Turn failed");
            Some(e.notice_html())
        }
    };

    finish_turn(&state, &session, &headers, Region::Transcript, notice)
}

async fn turn(state: &AppState, session: &Session, question: String) -> Result<(), AppError> {
    session.dispatch(UiEvent::SubmitQuestion(question))?;
    if session.respond_if_needed(state.generator.as_ref()).await? {
        tracing::info!(
            name: "chat.response.generated",
            session_id = %session.id(),
            generator = state.generator.name(),
            message_count = session.message_count(),
            "Response appended to transcript"
        );
    }
    Ok(())
}

/// POST /sessions/:id/documents - Put files into the upload widget.
async fn upload_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let session = state.sessions.get_or_create(&id.to_string());
    let held: Vec<String> = session
        .snapshot()
        .uploads()
        .iter()
        .map(|f| f.name.clone())
        .collect();

    let (accepted, mut rejections) = read_uploads(&state, multipart, held).await;

    let accepted_count = accepted.len();
    if accepted_count > 0
        && let Err(e) = session.dispatch(UiEvent::UploadFiles(accepted))
    {
        rejections.push(e);
    }

    tracing::info!(
        name: "documents.uploaded",
        session_id = %session.id(),
        accepted = accepted_count,
        rejected = rejections.len(),
        "Upload processed"
    );

    let notice = (!rejections.is_empty()).then(|| {
        rejections
            .iter()
            .map(AppError::notice_html)
            .collect::<String>()
    });
    finish_turn(&state, &session, &headers, Region::Documents, notice)
}

/// Read every file part, validating each against the upload policy.
///
/// File contents are counted, never kept. A malformed body stops reading
/// but keeps the files accepted before it.
async fn read_uploads(
    state: &AppState,
    mut multipart: Multipart,
    mut held: Vec<String>,
) -> (Vec<UploadedFile>, Vec<AppError>) {
    let mut accepted = Vec::new();
    let mut rejections = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                rejections.push(AppError::Multipart(e.to_string()));
                break;
            }
        };
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                rejections.push(AppError::Multipart(format!(
                    "Failed to read file '{file_name}': {e}"
                )));
                break;
            }
        };

        // Browsers send an empty, unnamed part when no file was picked.
        if file_name.is_empty() && data.is_empty() {
            continue;
        }

        match state.upload_policy.validate(
            &file_name,
            data.len() as u64,
            content_type.as_deref(),
            &held,
        ) {
            Ok(file) => {
                if !held.contains(&file.name) {
                    held.push(file.name.clone());
                }
                accepted.push(file);
            }
            Err(e) => {
                tracing::warn!(file_name = %file_name, error = %e, "Upload rejected");
                rejections.push(e);
            }
        }
    }

    (accepted, rejections)
}

/// POST /sessions/:id/documents/remove - Drop a file from the upload widget.
async fn remove_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Form(form): Form<DocumentForm>,
) -> Response {
    let session = state.sessions.get_or_create(&id.to_string());
    let notice = session
        .dispatch(UiEvent::RemoveFile(form.name))
        .err()
        .map(|e| e.notice_html());
    finish_turn(&state, &session, &headers, Region::Documents, notice)
}

/// POST /sessions/:id/documents/open - Open a listed document.
async fn open_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Form(form): Form<DocumentForm>,
) -> Response {
    let session = state.sessions.get_or_create(&id.to_string());
    let notice = session
        .dispatch(UiEvent::ClickDocument(form.name))
        .err()
        .map(|e| e.notice_html());
    finish_turn(&state, &session, &headers, Region::Documents, notice)
}

/// POST /sessions/:id/restart - Reseed the transcript.
async fn restart_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let session = state.sessions.get_or_create(&id.to_string());
    let notice = session
        .dispatch(UiEvent::ClickRestart)
        .err()
        .map(|e| e.notice_html());
    tracing::info!(name: "chat.restarted", session_id = %session.id(), "Chat restarted");
    finish_turn(&state, &session, &headers, Region::Transcript, notice)
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Session summary for the JSON API.
#[derive(Debug, Serialize)]
struct SessionInfo {
    id: String,
    message_count: usize,
    history_count: usize,
    document_count: usize,
    age_secs: u64,
}

fn existing_session(state: &AppState, id: Uuid) -> Result<Session, AppError> {
    let id = id.to_string();
    state
        .sessions
        .get(&id)
        .ok_or(AppError::SessionNotFound(id))
}

/// GET /api/sessions/:id - Session summary.
async fn api_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionInfo>, AppError> {
    let session = existing_session(&state, id)?;
    let snapshot = session.snapshot();
    Ok(Json(SessionInfo {
        id: session.id().to_string(),
        message_count: snapshot.messages().len(),
        history_count: snapshot.history().len(),
        document_count: snapshot.uploads().len(),
        age_secs: session.age().as_secs(),
    }))
}

/// GET /api/sessions/:id/messages - Transcript in order.
async fn api_get_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let session = existing_session(&state, id)?;
    Ok(Json(session.snapshot().messages().to_vec()))
}

/// GET /api/sessions/:id/history - Question/answer pairs.
async fn api_get_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatHistoryEntry>>, AppError> {
    let session = existing_session(&state, id)?;
    Ok(Json(session.snapshot().history().to_vec()))
}

/// GET /api/sessions/:id/documents - Document records, newest first.
async fn api_get_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<UploadedDocumentRecord>>, AppError> {
    let session = existing_session(&state, id)?;
    Ok(Json(session.snapshot().documents()))
}
