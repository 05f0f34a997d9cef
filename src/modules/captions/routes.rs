use axum::{
    routing::{get, post},
    Router,
};

use crate::modules::captions::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/generate-captions", post(controller::generate_captions))
        .route(
            "/captions/{video_id}/download",
            get(controller::download_captions),
        )
}
