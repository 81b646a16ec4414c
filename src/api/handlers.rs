//! HTTP request handlers

use super::types::{
    CatalogResponse, ChatRequest, ErrorResponse, ProjectTypeInfo, SelectRequest, SessionView,
    SuccessResponse, TopicInfo,
};
use super::AppState;
use crate::catalog::{all_topics, find_topic, ProjectType};
use crate::runtime::SessionHandle;
use crate::state_machine::{Event, Session, TransitionError};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Static catalog
        .route("/api/catalog", get(get_catalog))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        // Student actions
        .route("/api/sessions/:id/select", post(select))
        .route("/api/sessions/:id/start", post(start))
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/retry", post(retry))
        .route("/api/sessions/:id/reset", post(reset))
        // Download of the finished project
        .route("/api/sessions/:id/export", get(export))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Catalog
// ============================================================

async fn get_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        topics: all_topics().into_iter().map(TopicInfo::from).collect(),
        project_types: ProjectType::ALL
            .into_iter()
            .map(ProjectTypeInfo::from)
            .collect(),
    })
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionView>) {
    let (_, handle) = state.sessions.create().await;
    let runtime = handle.lock().await;
    (StatusCode::CREATED, Json(SessionView::from_runtime(&runtime)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(&state, &id).await?;
    let mut runtime = handle.lock().await;
    runtime.settle_interrupted_turn();
    Ok(Json(SessionView::from_runtime(&runtime)))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.remove(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(session_not_found(&id))
    }
}

// ============================================================
// Student Actions
// ============================================================

async fn select(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SessionView>, AppError> {
    let topic = req
        .topic
        .as_deref()
        .map(|name| {
            find_topic(name).ok_or_else(|| AppError::Unprocessable(format!("Unknown act: {name}")))
        })
        .transpose()?;
    let project_type = req
        .project_type
        .as_deref()
        .map(|name| {
            ProjectType::parse(name)
                .ok_or_else(|| AppError::Unprocessable(format!("Unknown project type: {name}")))
        })
        .transpose()?;

    dispatch(
        &state,
        &id,
        Event::Select {
            topic,
            project_type,
        },
    )
    .await
}

async fn start(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, &id, Event::Start).await
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, &id, Event::UserMessage { text: req.text }).await
}

async fn retry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, &id, Event::Retry).await
}

async fn reset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, &id, Event::Reset).await
}

/// Serve the finished project as a plain-text download
async fn export(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let handle = session_handle(&state, &id).await?;
    let runtime = handle.lock().await;

    let Session::Complete { draft, artifact } = runtime.session() else {
        return Err(AppError::Conflict(
            "The project is not finished yet".to_string(),
        ));
    };

    let file_name = draft.export_file_name();
    tracing::info!(session_id = %id, file_name = %file_name, "Exporting project");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        artifact.clone(),
    )
        .into_response())
}

async fn get_version() -> &'static str {
    concat!("civics-helper ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Helpers
// ============================================================

async fn session_handle(state: &AppState, id: &str) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))
}

fn session_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Session not found: {id}"))
}

/// Run one event through a session and return the resulting view.
///
/// The session lock is held across the gateway call, so a second request for
/// the same session waits until this one finishes.
async fn dispatch(state: &AppState, id: &str, event: Event) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(state, id).await?;
    let mut runtime = handle.lock().await;
    runtime.dispatch(event).await?;
    Ok(Json(SessionView::from_runtime(&runtime)))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    NotFound(String),
    Conflict(String),
    Unprocessable(String),
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Validation(msg) => AppError::Unprocessable(msg),
            err @ (TransitionError::Busy | TransitionError::InvalidTransition(_)) => {
                AppError::Conflict(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
