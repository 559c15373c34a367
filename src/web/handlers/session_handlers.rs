// src/web/handlers/session_handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::gateway::PromptGateway;
use crate::session::{Action, SearchSession, SessionError};
use crate::types::{FilterState, SavedSearch};
use crate::web::types::*;

pub async fn create_session_handler(state: &State<AppState>) -> Json<DataResponse<SearchSession>> {
    let session = state.sessions.create().await;
    Json(DataResponse::success("Search session created", session))
}

pub async fn get_session_handler(id: &str, state: &State<AppState>) -> ApiResult<SearchSession> {
    let id = parse_session_id(id)?;
    let session = state.sessions.get(id).await.map_err(session_error)?;
    Ok(Json(DataResponse::success("Search session", session)))
}

pub async fn delete_session_handler(
    id: &str,
    state: &State<AppState>,
) -> Result<Json<ActionResponse>, ApiError> {
    let id = parse_session_id(id)?;
    state.sessions.remove(id).await.map_err(session_error)?;
    Ok(Json(ActionResponse::success(
        format!("Search session {} deleted", id),
        "session_deleted",
    )))
}

pub async fn update_filters_handler(
    id: &str,
    filters: Json<FilterState>,
    state: &State<AppState>,
) -> ApiResult<SearchSession> {
    let id = parse_session_id(id)?;
    let session = state
        .sessions
        .update_filters(id, filters.into_inner())
        .await
        .map_err(session_error)?;
    Ok(Json(DataResponse::success("Filters updated", session)))
}

pub async fn acknowledge_handler(
    id: &str,
    action: &str,
    state: &State<AppState>,
) -> ApiResult<SearchSession> {
    let id = parse_session_id(id)?;
    let action = Action::from_slug(action).ok_or_else(|| {
        StandardErrorResponse::new(
            format!("Unknown action: {}", action),
            "UNKNOWN_ACTION",
            vec!["Use one of: ai-fill, generate, suggest-keywords".to_string()],
        )
        .with_status(Status::NotFound)
    })?;
    let session = state
        .sessions
        .acknowledge(id, action)
        .await
        .map_err(session_error)?;
    Ok(Json(DataResponse::success(format!("{} acknowledged", action), session)))
}

pub async fn ai_fill_handler(
    id: &str,
    request: Json<PromptRequest>,
    state: &State<AppState>,
) -> ApiResult<SearchSession> {
    let id = parse_session_id(id)?;
    let gateway = require_gateway(state)?;

    info!("AI fill requested for session {}", id);
    let session = state
        .sessions
        .ai_fill(id, gateway, &request.prompt)
        .await
        .map_err(session_error)?;
    Ok(Json(DataResponse::success("Filters generated from prompt", session)))
}

pub async fn generate_handler(id: &str, state: &State<AppState>) -> ApiResult<SearchSession> {
    let id = parse_session_id(id)?;
    let gateway = require_gateway(state)?;

    info!("Query generation requested for session {}", id);
    let session = state
        .sessions
        .generate(id, gateway)
        .await
        .map_err(session_error)?;
    Ok(Json(DataResponse::success("Search URL and query generated", session)))
}

pub async fn suggest_keywords_handler(
    id: &str,
    request: Json<PromptRequest>,
    state: &State<AppState>,
) -> ApiResult<SearchSession> {
    let id = parse_session_id(id)?;
    let gateway = require_gateway(state)?;

    info!("Keyword suggestion requested for session {}", id);
    let session = state
        .sessions
        .suggest_keywords(id, gateway, &request.prompt)
        .await
        .map_err(session_error)?;
    Ok(Json(DataResponse::success("Keywords added", session)))
}

pub async fn list_saved_handler(id: &str, state: &State<AppState>) -> ApiResult<Vec<SavedSearch>> {
    let id = parse_session_id(id)?;
    let saved = state
        .sessions
        .saved_searches(id)
        .await
        .map_err(session_error)?;
    Ok(Json(DataResponse::success(
        format!("{} saved searches", saved.len()),
        saved,
    )))
}

pub async fn save_search_handler(
    id: &str,
    request: Json<SaveSearchRequest>,
    state: &State<AppState>,
) -> ApiResult<SavedSearch> {
    let id = parse_session_id(id)?;
    let saved = state
        .sessions
        .save_search(id, &request.name)
        .await
        .map_err(session_error)?;
    info!("Saved search '{}' in session {}", saved.name, id);
    Ok(Json(DataResponse::success("Search saved", saved)))
}

pub async fn load_saved_handler(
    id: &str,
    saved_id: &str,
    state: &State<AppState>,
) -> ApiResult<SearchSession> {
    let id = parse_session_id(id)?;
    let saved_id = parse_saved_id(saved_id)?;
    let session = state
        .sessions
        .load_saved(id, saved_id)
        .await
        .map_err(session_error)?;
    Ok(Json(DataResponse::success("Saved search loaded", session)))
}

pub async fn delete_saved_handler(
    id: &str,
    saved_id: &str,
    state: &State<AppState>,
) -> Result<Json<ActionResponse>, ApiError> {
    let id = parse_session_id(id)?;
    let saved_id = parse_saved_id(saved_id)?;
    state
        .sessions
        .delete_saved(id, saved_id)
        .await
        .map_err(session_error)?;
    Ok(Json(ActionResponse::success(
        "Saved search deleted",
        "saved_search_deleted",
    )))
}

fn parse_session_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| session_error(SessionError::NotFound(Uuid::nil())))
}

fn parse_saved_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| session_error(SessionError::SavedSearchNotFound(Uuid::nil())))
}

fn require_gateway(state: &State<AppState>) -> Result<&PromptGateway, ApiError> {
    state.gateway.as_ref().ok_or_else(|| {
        error!("Model request rejected: no model credential configured");
        StandardErrorResponse::new(
            "AI features are not configured".to_string(),
            "SERVICE_UNAVAILABLE",
            vec!["Set GEMINI_API_KEY and restart the server".to_string()],
        )
        .with_status(Status::ServiceUnavailable)
    })
}

fn session_error(e: SessionError) -> ApiError {
    let message = e.to_string();
    let (status, code, suggestions) = match &e {
        SessionError::NotFound(_) => (
            Status::NotFound,
            "SESSION_NOT_FOUND",
            vec!["Create a new session with POST /api/sessions".to_string()],
        ),
        SessionError::Busy(_) => (
            Status::Conflict,
            "ACTION_IN_PROGRESS",
            vec!["Wait for the running request to finish".to_string()],
        ),
        SessionError::EmptyPrompt => (
            Status::BadRequest,
            "EMPTY_PROMPT",
            vec!["Describe the job you are looking for".to_string()],
        ),
        SessionError::InvalidName => (
            Status::BadRequest,
            "INVALID_NAME",
            vec!["Give the saved search a name".to_string()],
        ),
        SessionError::SavedSearchNotFound(_) => (
            Status::NotFound,
            "SAVED_SEARCH_NOT_FOUND",
            vec!["List saved searches with GET /api/sessions/<id>/saved".to_string()],
        ),
        SessionError::ActionFailed { action, .. } => (
            Status::BadGateway,
            match action {
                Action::AiFill => "AI_FILL_FAILED",
                Action::GenerateQuery => "GENERATE_FAILED",
                Action::SuggestKeywords => "SUGGEST_FAILED",
            },
            vec!["Try again in a few moments".to_string()],
        ),
    };

    warn!("Request failed ({}): {}", code, message);
    StandardErrorResponse::new(message, code, suggestions).with_status(status)
}
