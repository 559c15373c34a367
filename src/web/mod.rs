// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, put, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::gateway::{GeminiClient, PromptGateway};
use crate::session::{SearchSession, SessionStore};
use crate::types::{FilterState, SavedSearch};
use crate::url_builder::ParsedSearch;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/health")]
pub async fn health(state: &State<AppState>) -> Json<TextResponse> {
    handlers::health_handler(state).await
}

#[get("/vocabulary")]
pub async fn vocabulary() -> Json<DataResponse<Vec<VocabularyData>>> {
    handlers::vocabulary_handler().await
}

#[post("/url", data = "<request>")]
pub async fn build_url(request: Json<BuildUrlRequest>) -> Json<DataResponse<UrlData>> {
    handlers::build_url_handler(request).await
}

#[post("/url/parse", data = "<request>")]
pub async fn parse_url(request: Json<ParseUrlRequest>) -> ApiResult<ParsedSearch> {
    handlers::parse_url_handler(request).await
}

#[post("/sessions")]
pub async fn create_session(state: &State<AppState>) -> Json<DataResponse<SearchSession>> {
    handlers::create_session_handler(state).await
}

#[get("/sessions/<id>")]
pub async fn get_session(id: &str, state: &State<AppState>) -> ApiResult<SearchSession> {
    handlers::get_session_handler(id, state).await
}

#[delete("/sessions/<id>")]
pub async fn delete_session(
    id: &str,
    state: &State<AppState>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_session_handler(id, state).await
}

#[put("/sessions/<id>/filters", data = "<filters>")]
pub async fn update_filters(
    id: &str,
    filters: Json<FilterState>,
    state: &State<AppState>,
) -> ApiResult<SearchSession> {
    handlers::update_filters_handler(id, filters, state).await
}

#[post("/sessions/<id>/acknowledge/<action>")]
pub async fn acknowledge(id: &str, action: &str, state: &State<AppState>) -> ApiResult<SearchSession> {
    handlers::acknowledge_handler(id, action, state).await
}

#[post("/sessions/<id>/ai-fill", data = "<request>")]
pub async fn ai_fill(
    id: &str,
    request: Json<PromptRequest>,
    state: &State<AppState>,
) -> ApiResult<SearchSession> {
    handlers::ai_fill_handler(id, request, state).await
}

#[post("/sessions/<id>/generate")]
pub async fn generate(id: &str, state: &State<AppState>) -> ApiResult<SearchSession> {
    handlers::generate_handler(id, state).await
}

#[post("/sessions/<id>/suggest-keywords", data = "<request>")]
pub async fn suggest_keywords(
    id: &str,
    request: Json<PromptRequest>,
    state: &State<AppState>,
) -> ApiResult<SearchSession> {
    handlers::suggest_keywords_handler(id, request, state).await
}

#[get("/sessions/<id>/saved")]
pub async fn list_saved(id: &str, state: &State<AppState>) -> ApiResult<Vec<SavedSearch>> {
    handlers::list_saved_handler(id, state).await
}

#[post("/sessions/<id>/saved", data = "<request>")]
pub async fn save_search(
    id: &str,
    request: Json<SaveSearchRequest>,
    state: &State<AppState>,
) -> ApiResult<SavedSearch> {
    handlers::save_search_handler(id, request, state).await
}

#[post("/sessions/<id>/saved/<saved_id>/load")]
pub async fn load_saved(
    id: &str,
    saved_id: &str,
    state: &State<AppState>,
) -> ApiResult<SearchSession> {
    handlers::load_saved_handler(id, saved_id, state).await
}

#[delete("/sessions/<id>/saved/<saved_id>")]
pub async fn delete_saved(
    id: &str,
    saved_id: &str,
    state: &State<AppState>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_saved_handler(id, saved_id, state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST",
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected shape".to_string(),
        "INVALID_BODY",
        vec!["Filter fields use camelCase names, lists are JSON arrays".to_string()],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Not found".to_string(),
        "NOT_FOUND",
        vec!["Check the endpoint path".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR",
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Assemble the API without binding it, so tests can drive it locally.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![bad_request, unprocessable, not_found, internal_error],
        )
        .mount(
            "/api",
            routes![
                health,
                vocabulary,
                build_url,
                parse_url,
                create_session,
                get_session,
                delete_session,
                update_filters,
                acknowledge,
                ai_fill,
                generate,
                suggest_keywords,
                list_saved,
                save_search,
                load_saved,
                delete_saved,
                options,
            ],
        )
}

/// Build the model gateway if a credential is configured.
pub fn gateway_from_config(config: &AppConfig) -> Result<Option<PromptGateway>> {
    if !config.model.has_credential() {
        warn!("No model credential configured, AI endpoints will return 503");
        return Ok(None);
    }
    let client = GeminiClient::new(&config.model)?;
    info!("Using model {}", client.model());
    Ok(Some(PromptGateway::new(Arc::new(client))))
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    let state = AppState {
        sessions: SessionStore::with_limits(config.sessions),
        gateway: gateway_from_config(&config)?,
    };

    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", "0.0.0.0"));

    info!("Starting job search URL builder API on port {}", config.port);

    build_rocket(state)
        .configure(figment)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}
