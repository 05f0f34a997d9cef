use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use svodka::modules::captions::model::CaptionSet;
use svodka::{config, modules, AppState};

// Point the transcript client at a closed local port so nothing in
// here reaches YouTube.
async fn setup_test_server() -> (TestServer, AppState) {
    dotenvy::dotenv().ok();
    std::env::set_var("TIMEDTEXT_BASE_URL", "http://127.0.0.1:9");

    let db = config::database::connect().await;
    let state = AppState::new(db);

    let app = Router::new()
        .merge(modules::captions::routes::routes())
        .with_state(state.clone());

    (TestServer::new(app).unwrap(), state)
}

#[tokio::test]
async fn test_generate_requires_url() {
    let (server, _state) = setup_test_server().await;

    let response = server.post("/generate-captions").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No URL provided");

    let response = server
        .post("/generate-captions")
        .json(&json!({ "url": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_rejects_non_youtube_url() {
    let (server, _state) = setup_test_server().await;

    let response = server
        .post("/generate-captions")
        .json(&json!({ "url": "https://example.com/watch?v=dQw4w9WgXcQ" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid YouTube URL");
}

#[tokio::test]
async fn test_generate_reports_missing_transcript() {
    let (server, _state) = setup_test_server().await;

    let response = server
        .post("/generate-captions")
        .json(&json!({ "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Could not fetch transcript"));
}

#[tokio::test]
async fn test_download_unknown_video_fails() {
    let (server, _state) = setup_test_server().await;

    let response = server.get("/captions/nope/download").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No captions generated for this video");
}

#[tokio::test]
async fn test_download_variants() {
    let (server, state) = setup_test_server().await;

    state.captions.insert(CaptionSet {
        video_id: "vid123".to_string(),
        russian_srt: "RU BODY".to_string(),
        english_srt: "EN BODY".to_string(),
    });

    // Default language is English.
    let response = server.get("/captions/vid123/download").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "EN BODY");
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("english_captions_vid123.srt"));

    let response = server
        .get("/captions/vid123/download")
        .add_query_param("lang", "ru")
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "RU BODY");

    let response = server
        .get("/captions/vid123/download")
        .add_query_param("lang", "both")
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.text(),
        "=== RUSSIAN ===\n\nRU BODY\n\n=== ENGLISH ===\n\nEN BODY"
    );

    let response = server
        .get("/captions/vid123/download")
        .add_query_param("lang", "de")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
