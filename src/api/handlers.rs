//! HTTP request handlers

use super::assets::serve_static;
use super::types::{ChatForm, ChatRequest, ErrorResponse, ModelResponse, ProfileForm, SessionResponse};
use super::AppState;
use crate::runtime::{DispatchOutcome, SessionHandle};
use crate::state_machine::{Event, TransitionError};
use crate::view;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "chat_session";

/// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Page
        .route("/", get(chat_page))
        .route("/chat", post(submit_chat))
        .route("/clear", post(clear_chat))
        .route("/profile", post(update_profile))
        // Static assets (embedded or filesystem fallback)
        .route("/assets/*path", get(serve_static))
        // JSON
        .route("/api/session", get(get_session))
        .route("/api/session/chat", post(send_chat))
        .route("/api/session/clear", post(clear_session))
        .route("/api/model", get(get_model))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

/// Resolve the caller's session, issuing a cookie when a new one is made
async fn open_session(state: &AppState, jar: CookieJar) -> (CookieJar, SessionHandle) {
    let existing = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let handle = state.sessions.get_or_create(existing.as_deref()).await;

    let jar = if handle.created {
        jar.add(session_cookie(&handle.id, state.sessions.idle_timeout()))
    } else {
        jar
    };
    (jar, handle)
}

/// The cookie outlives the server-side session by at most one idle period
fn session_cookie(id: &str, max_age: std::time::Duration) -> Cookie<'static> {
    let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

// ============================================================
// Page Handlers
// ============================================================

async fn chat_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    let (jar, handle) = open_session(&state, jar).await;
    let html = render_page(&state, &handle).await?;
    Ok((jar, Html(html)))
}

async fn submit_chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ChatForm>,
) -> Result<Response, AppError> {
    let (jar, handle) = open_session(&state, jar).await;
    let outcome = state.sessions.stage_and_submit(&handle, form.text).await?;
    page_after(&state, jar, &handle, outcome).await
}

async fn clear_chat(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let (jar, handle) = open_session(&state, jar).await;
    let outcome = state.sessions.dispatch(&handle, Event::ClearAll).await?;
    page_after(&state, jar, &handle, outcome).await
}

async fn update_profile(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let (jar, handle) = open_session(&state, jar).await;
    let event = Event::UpdateProfile {
        name: form.name,
        email: form.email,
    };
    let outcome = state.sessions.dispatch(&handle, event).await?;
    page_after(&state, jar, &handle, outcome).await
}

/// Run one render cycle: reconcile, present, then fill the template
async fn render_page(state: &AppState, handle: &SessionHandle) -> Result<String, AppError> {
    let chat_view = {
        let mut session = handle.session.lock().await;
        view::render(&mut session)
    };

    state.pages.render_chat(&chat_view).map_err(|e| {
        tracing::error!(session_id = %handle.id, error = %e, "Failed to render page");
        AppError::Internal(format!("Failed to render page: {e}"))
    })
}

/// Changed state is shown through a redirect to `/`; an action that changed
/// nothing visible draws the page in place
async fn page_after(
    state: &AppState,
    jar: CookieJar,
    handle: &SessionHandle,
    outcome: DispatchOutcome,
) -> Result<Response, AppError> {
    if outcome.rerender {
        return Ok((jar, Redirect::to("/")).into_response());
    }
    let html = render_page(state, handle).await?;
    Ok((jar, Html(html)).into_response())
}

// ============================================================
// JSON Handlers
// ============================================================

/// Current session state, without running a render
async fn get_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SessionResponse>) {
    let (jar, handle) = open_session(&state, jar).await;
    let session = handle.session.lock().await;
    let body = SessionResponse::new(&handle.id, &session);
    (jar, Json(body))
}

async fn send_chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<ChatRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let (jar, handle) = open_session(&state, jar).await;
    state.sessions.stage_and_submit(&handle, req.text).await?;
    Ok((jar, Json(rendered_session(&handle).await)))
}

async fn clear_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let (jar, handle) = open_session(&state, jar).await;
    state.sessions.dispatch(&handle, Event::ClearAll).await?;
    Ok((jar, Json(rendered_session(&handle).await)))
}

/// Session state as the next page render would leave it
async fn rendered_session(handle: &SessionHandle) -> SessionResponse {
    let mut session = handle.session.lock().await;
    view::reconcile(&mut session);
    SessionResponse::new(&handle.id, &session)
}

async fn get_model(State(state): State<AppState>) -> Json<ModelResponse> {
    Json(state.model.clone())
}

async fn get_version() -> &'static str {
    concat!("ai_chatbot ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    Conflict(String),
    Internal(String),
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Busy => AppError::Conflict(err.to_string()),
            TransitionError::InvalidTransition(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
