mod common;

use common::{ScriptedModel, EXTRACTED_FILTERS};
use job_url_builder::web::{build_rocket, AppState};
use job_url_builder::{PromptGateway, SessionStore};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::{json, Value};

async fn client_with(gateway: Option<PromptGateway>) -> Client {
    let state = AppState {
        sessions: SessionStore::new(),
        gateway,
    };
    Client::tracked(build_rocket(state))
        .await
        .expect("valid rocket instance")
}

async fn scripted_client(replies: Vec<Result<&str, &str>>) -> Client {
    client_with(Some(PromptGateway::new(ScriptedModel::new(replies)))).await
}

async fn body(response: LocalResponse<'_>) -> Value {
    response.into_json::<Value>().await.expect("json body")
}

async fn create_session(client: &Client) -> String {
    let response = client.post("/api/sessions").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    body(response).await["data"]["id"]
        .as_str()
        .expect("session id")
        .to_string()
}

#[rocket::async_test]
async fn health_reports_disabled_ai_without_credential() {
    let client = client_with(None).await;
    let response = client.get("/api/health").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
    let json = body(response).await;
    assert_eq!(json["type"], "text");
    assert!(json["message"].as_str().unwrap().contains("disabled"));
}

#[rocket::async_test]
async fn vocabulary_lists_every_table() {
    let client = client_with(None).await;
    let json = body(client.get("/api/vocabulary").dispatch().await).await;

    let tables = json["data"].as_array().unwrap();
    assert_eq!(tables.len(), 7);
    assert_eq!(tables[0]["field"], "jobTypes");
    assert_eq!(tables[0]["options"][0], json!({"label": "Full-time", "code": "F"}));
}

#[rocket::async_test]
async fn build_url_encodes_filters_and_query() {
    let client = client_with(None).await;
    let response = client
        .post("/api/url")
        .header(ContentType::JSON)
        .body(
            json!({
                "filters": {"location": "Berlin", "distance": "25"},
                "query": "(python) AND (react)"
            })
            .to_string(),
        )
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let json = body(response).await;
    assert_eq!(
        json["data"]["url"],
        "https://www.linkedin.com/jobs/search/?location=Berlin&distance=25&keywords=%28python%29%20AND%20%28react%29"
    );
}

#[rocket::async_test]
async fn list_fields_with_the_wrong_shape_are_unprocessable() {
    let client = client_with(None).await;
    let response = client
        .post("/api/url")
        .header(ContentType::JSON)
        .body(r#"{"filters": {"jobTypes": "F"}}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::UnprocessableEntity);
    assert_eq!(body(response).await["error_code"], "INVALID_BODY");
}

#[rocket::async_test]
async fn parse_url_rejects_garbage() {
    let client = client_with(None).await;
    let response = client
        .post("/api/url/parse")
        .header(ContentType::JSON)
        .body(r#"{"url": "jobs please"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    let json = body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error_code"], "INVALID_URL");
}

#[rocket::async_test]
async fn ai_endpoints_are_unavailable_without_credential() {
    let client = client_with(None).await;
    let id = create_session(&client).await;

    let response = client
        .post(format!("/api/sessions/{}/generate", id))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::ServiceUnavailable);
    assert_eq!(body(response).await["error_code"], "SERVICE_UNAVAILABLE");
}

#[rocket::async_test]
async fn unknown_sessions_are_not_found() {
    let client = client_with(None).await;

    for path in [
        "/api/sessions/not-a-uuid".to_string(),
        format!("/api/sessions/{}", uuid::Uuid::new_v4()),
    ] {
        let response = client.get(path).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(body(response).await["error_code"], "SESSION_NOT_FOUND");
    }
}

#[rocket::async_test]
async fn new_sessions_start_with_form_defaults() {
    let client = client_with(None).await;
    let id = create_session(&client).await;

    let json = body(client.get(format!("/api/sessions/{}", id)).dispatch().await).await;
    let session = &json["data"];
    assert_eq!(session["filters"]["timePosted"], "r604800");
    assert_eq!(session["filters"]["sortBy"], "R");
    assert_eq!(session["actions"]["aiFill"], json!({"state": "idle"}));
}

#[rocket::async_test]
async fn ai_fill_updates_filters() {
    let client = scripted_client(vec![Ok(EXTRACTED_FILTERS)]).await;
    let id = create_session(&client).await;

    let response = client
        .post(format!("/api/sessions/{}/ai-fill", id))
        .header(ContentType::JSON)
        .body(r#"{"prompt": "junior backend python job in Berlin"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let json = body(response).await;
    assert_eq!(json["data"]["filters"]["location"], "Berlin, Germany");
    assert_eq!(json["data"]["actions"]["aiFill"]["state"], "succeeded");
}

#[rocket::async_test]
async fn blank_prompt_is_a_bad_request() {
    let client = scripted_client(vec![]).await;
    let id = create_session(&client).await;

    let response = client
        .post(format!("/api/sessions/{}/suggest-keywords", id))
        .header(ContentType::JSON)
        .body(r#"{"prompt": "  "}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await["error_code"], "EMPTY_PROMPT");
}

#[rocket::async_test]
async fn failed_generation_is_reported_then_acknowledged() {
    let client = scripted_client(vec![Err("upstream timeout")]).await;
    let id = create_session(&client).await;

    let response = client
        .post(format!("/api/sessions/{}/generate", id))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadGateway);
    let json = body(response).await;
    assert_eq!(json["error_code"], "GENERATE_FAILED");
    assert_eq!(json["error"], "Failed to generate URL and query. Please try again.");

    let session = body(client.get(format!("/api/sessions/{}", id)).dispatch().await).await;
    assert_eq!(session["data"]["actions"]["generateQuery"]["state"], "failed");

    let response = client
        .post(format!("/api/sessions/{}/acknowledge/generate", id))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        body(response).await["data"]["actions"]["generateQuery"],
        json!({"state": "idle"})
    );
}

#[rocket::async_test]
async fn acknowledging_an_unknown_action_is_not_found() {
    let client = client_with(None).await;
    let id = create_session(&client).await;

    let response = client
        .post(format!("/api/sessions/{}/acknowledge/teleport", id))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response).await["error_code"], "UNKNOWN_ACTION");
}

#[rocket::async_test]
async fn saved_searches_round_trip_through_the_api() {
    let client = client_with(None).await;
    let id = create_session(&client).await;

    let response = client
        .put(format!("/api/sessions/{}/filters", id))
        .header(ContentType::JSON)
        .body(r#"{"location": "Lisbon", "workplaceTypes": ["2"]}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .post(format!("/api/sessions/{}/saved", id))
        .header(ContentType::JSON)
        .body(r#"{"name": "Remote Lisbon"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let saved = body(response).await["data"].clone();
    assert_eq!(
        saved["url"],
        "https://www.linkedin.com/jobs/search/?location=Lisbon&f_WT=2"
    );
    let saved_id = saved["id"].as_str().unwrap().to_string();

    client
        .put(format!("/api/sessions/{}/filters", id))
        .header(ContentType::JSON)
        .body("{}")
        .dispatch()
        .await;

    let response = client
        .post(format!("/api/sessions/{}/saved/{}/load", id, saved_id))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let json = body(response).await;
    assert_eq!(json["data"]["filters"]["location"], "Lisbon");
    assert_eq!(json["data"]["generatedUrl"], saved["url"]);

    let list = body(client.get(format!("/api/sessions/{}/saved", id)).dispatch().await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let path = format!("/api/sessions/{}/saved/{}", id, saved_id);
    assert_eq!(client.delete(path.clone()).dispatch().await.status(), Status::Ok);
    let response = client.delete(path).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response).await["error_code"], "SAVED_SEARCH_NOT_FOUND");
}

#[rocket::async_test]
async fn saving_without_a_name_is_rejected() {
    let client = client_with(None).await;
    let id = create_session(&client).await;

    let response = client
        .post(format!("/api/sessions/{}/saved", id))
        .header(ContentType::JSON)
        .body(r#"{"name": "   "}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await["error_code"], "INVALID_NAME");
}

#[rocket::async_test]
async fn deleted_sessions_are_gone() {
    let client = client_with(None).await;
    let id = create_session(&client).await;

    let response = client.delete(format!("/api/sessions/{}", id)).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response).await["action"], "session_deleted");

    let response = client.get(format!("/api/sessions/{}", id)).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}
