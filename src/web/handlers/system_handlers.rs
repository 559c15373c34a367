// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::types::vocabulary;
use crate::web::types::*;

pub async fn health_handler(state: &State<AppState>) -> Json<TextResponse> {
    let ai = if state.gateway.is_some() {
        "enabled"
    } else {
        "disabled"
    };
    info!("Health check (AI features {})", ai);
    Json(TextResponse::success(format!("OK (AI features {})", ai)))
}

pub async fn vocabulary_handler() -> Json<DataResponse<Vec<VocabularyData>>> {
    let tables = vocabulary::ALL
        .iter()
        .map(|table| VocabularyData {
            field: table.field,
            options: table.options(),
        })
        .collect();
    Json(DataResponse::success("Filter vocabulary", tables))
}
