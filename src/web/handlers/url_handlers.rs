// src/web/handlers/url_handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use tracing::{info, warn};

use crate::url_builder::{build_search_url, parse_search_url, ParsedSearch};
use crate::web::types::*;

pub async fn build_url_handler(request: Json<BuildUrlRequest>) -> Json<DataResponse<UrlData>> {
    let url = build_search_url(&request.filters, &request.query);
    info!("Built search URL: {}", url);
    Json(DataResponse::success("Search URL built", UrlData { url }))
}

pub async fn parse_url_handler(request: Json<ParseUrlRequest>) -> ApiResult<ParsedSearch> {
    match parse_search_url(&request.url) {
        Ok(parsed) => Ok(Json(DataResponse::success("Search URL parsed", parsed))),
        Err(e) => {
            warn!("Failed to parse search URL: {:#}", e);
            Err(StandardErrorResponse::new(
                "Invalid search URL".to_string(),
                "INVALID_URL",
                vec!["Provide an absolute URL such as https://www.linkedin.com/jobs/search/?keywords=rust".to_string()],
            )
            .with_status(Status::BadRequest))
        }
    }
}
