use axum::{
    routing::{get, post},
    Router,
};

use crate::modules::news::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/news/save", post(controller::save_news))
        .route("/api/news/today", get(controller::today_news))
        .route("/api/news/date/{date}", get(controller::news_by_date))
        .route("/api/news/available-dates", get(controller::available_dates))
        .route("/api/news/date-range", get(controller::date_range))
        .route("/api/news/summarize", post(controller::summarize))
}
