use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::AppState;
use crate::config::AppConfig;
use crate::conversation::ConversationState;
use crate::engine::{SubmitError, Submission};
use crate::research::Screen;
use crate::session::{Session, SessionStore};
use crate::ui::{html, shell, view::TurnView};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    info!(
        name: "research.config.loaded",
        base_url = %config.research.base_url,
        search_path = %config.research.search_path,
        memo_path = %config.research.memo_path,
        "Research API configuration loaded"
    );

    let state = AppState::from_config(Arc::clone(&config))?;
    tokio::spawn(sweep_sessions(state.sessions.clone()));
    let app = router(state);

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        name: "server.started",
        address = %format!("http://{address}"),
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Drop idle sessions once a minute, or every timeout if shorter.
async fn sweep_sessions(sessions: SessionStore) {
    let period = sessions.timeout().clamp(Duration::from_secs(1), Duration::from_secs(60));
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let removed = sessions.cleanup_expired();
        if removed > 0 {
            info!(
                name: "session.expired",
                removed,
                remaining = sessions.len(),
                "Expired sessions removed"
            );
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // HTML pages and HTMX fragments
        .route("/", get(index_handler))
        .route("/{screen}", get(screen_handler))
        .route("/conversations/{id}/submit", post(submit_handler))
        .route("/conversations/{id}/sources", post(sources_handler))
        // JSON API
        .route(
            "/api/conversations",
            get(api_list_conversations).post(api_create_conversation),
        )
        .route(
            "/api/conversations/{id}",
            get(api_get_conversation).delete(api_delete_conversation),
        )
        .route("/api/conversations/{id}/messages", post(api_post_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Landing page.
async fn index_handler() -> Html<String> {
    Html(shell::landing_page())
}

/// GET /{screen} - Start a conversation on a screen.
async fn screen_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let screen = Screen::from_slug(&slug).ok_or(StatusCode::NOT_FOUND)?;
    let session = create_session(&state, screen)?;
    let snapshot = session.engine().snapshot();
    Ok(Html(shell::chat_page(&session, &snapshot)))
}

/// Prompt form body.
#[derive(Debug, Deserialize)]
struct SubmitForm {
    #[serde(default)]
    prompt: String,
}

/// POST /conversations/{id}/submit - Submit a prompt, return the conversation fragment.
async fn submit_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SubmitForm>,
) -> Result<Html<String>, Response> {
    let session = find_session(&state, &id).map_err(IntoResponse::into_response)?;
    submit(&session, form.prompt).await?;
    let snapshot = session.engine().snapshot();
    Ok(Html(html::conversation(&session, &snapshot)))
}

/// POST /conversations/{id}/sources - Toggle the sources panel.
async fn sources_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let session = find_session(&state, &id)?;
    session.touch();
    let snapshot = session.engine().toggle_sources();
    info!(
        name: "conversation.sources.toggled",
        session_id = %id,
        open = snapshot.sources_panel_open(),
        "Sources panel toggled"
    );
    Ok(Html(html::sources_panel(session.id(), &snapshot)))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Conversation info for listing.
#[derive(Debug, Serialize)]
struct ConversationInfo {
    id: String,
    screen: Screen,
    turn_count: usize,
    created_at: DateTime<Utc>,
}

impl From<&Session> for ConversationInfo {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            screen: session.screen(),
            turn_count: session.turn_count(),
            created_at: session.created_at(),
        }
    }
}

/// Full conversation snapshot.
#[derive(Debug, Serialize)]
struct ConversationDto {
    #[serde(flatten)]
    info: ConversationInfo,
    state: Arc<ConversationState>,
}

/// Request body for creating a conversation.
#[derive(Debug, Deserialize)]
struct CreateConversationRequest {
    screen: Screen,
}

/// Request body for posting a message.
#[derive(Debug, Deserialize)]
struct MessageRequest {
    prompt: String,
}

/// Response from posting a message.
#[derive(Debug, Serialize)]
struct MessageResponse {
    /// `None` when the prompt was blank and ignored.
    view: Option<TurnView>,
    state: Arc<ConversationState>,
}

/// GET /api/conversations - List all conversations.
async fn api_list_conversations(State(state): State<AppState>) -> Json<Vec<ConversationInfo>> {
    Json(
        state
            .sessions
            .list()
            .iter()
            .map(ConversationInfo::from)
            .collect(),
    )
}

/// POST /api/conversations - Create a conversation.
async fn api_create_conversation(
    State(state): State<AppState>,
    Json(req): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ConversationInfo>), StatusCode> {
    let session = create_session(&state, req.screen)?;
    Ok((StatusCode::CREATED, Json(ConversationInfo::from(&session))))
}

/// GET /api/conversations/{id} - Get a conversation snapshot.
async fn api_get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationDto>, StatusCode> {
    let session = find_session(&state, &id)?;
    Ok(Json(ConversationDto {
        info: ConversationInfo::from(&session),
        state: session.engine().snapshot(),
    }))
}

/// DELETE /api/conversations/{id} - Delete a conversation.
async fn api_delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> StatusCode {
    match state.sessions.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

/// POST /api/conversations/{id}/messages - Submit a prompt, return the new assistant turn.
async fn api_post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, Response> {
    let session = find_session(&state, &id).map_err(IntoResponse::into_response)?;
    let submission = submit(&session, req.prompt).await?;
    let view = submission
        .assistant_turn()
        .map(|turn| session.engine().render(turn));
    Ok(Json(MessageResponse {
        view,
        state: session.engine().snapshot(),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn find_session(state: &AppState, id: &str) -> Result<Session, StatusCode> {
    state.sessions.get(id).ok_or(StatusCode::NOT_FOUND)
}

fn create_session(state: &AppState, screen: Screen) -> Result<Session, StatusCode> {
    let binding = state.binding(screen).ok_or(StatusCode::NOT_FOUND)?;
    let session = state.sessions.create(binding);
    info!(
        name: "session.created",
        session_id = %session.id(),
        screen = %screen,
        "Conversation started"
    );
    Ok(session)
}

/// Run a submission on its own task so a dropped request cannot leave the
/// conversation stuck in the loading state.
async fn submit(session: &Session, prompt: String) -> Result<Submission, Response> {
    session.touch();
    let engine = session.engine().clone();
    let joined = tokio::spawn(async move { engine.submit(&prompt).await }).await;
    session.touch();

    match joined {
        Ok(Ok(submission)) => Ok(submission),
        Ok(Err(SubmitError::Busy)) => {
            info!(
                name: "conversation.submit.rejected",
                session_id = %session.id(),
                "Submission rejected while a request is in flight"
            );
            Err((StatusCode::CONFLICT, SubmitError::Busy.to_string()).into_response())
        }
        Err(e) => {
            error!(
                name: "conversation.submit.panicked",
                session_id = %session.id(),
                error = %e,
                "Submission task failed"
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}
