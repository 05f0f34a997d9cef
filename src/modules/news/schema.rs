use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::news::crud::SaveReport;
use crate::services::summarize::Headline;

#[derive(Debug, Deserialize, Validate)]
pub struct SaveNewsRequest {
    #[validate(length(min = 1, message = "Items cannot be empty"), nested)]
    pub items: Vec<NewsItemInput>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewsItemInput {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub original_title: Option<String>,
    #[validate(length(min = 1, message = "Url cannot be empty"))]
    pub url: String,
    #[serde(default)]
    pub channel: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SummarizeRequest {
    /// Headline mode: the list to summarize.
    pub headlines: Option<Vec<Headline>>,
    /// Article mode: a single article URL (with optional title).
    pub url: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewsItemResponse {
    pub id: String,
    pub title: String,
    pub original_title: String,
    pub url: String,
    pub channel: String,
    pub published_at: String,
    pub fetch_date: String,
    pub fetch_time: String,
}

#[derive(Debug, Serialize)]
pub struct NewsListResponse {
    pub data: Vec<NewsItemResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub data: Vec<NewsItemResponse>,
    pub total: usize,
    pub summary: String,
    pub report: SaveReport,
    pub sources_ok: Vec<String>,
    pub sources_failed: Vec<String>,
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveNewsResponse {
    pub report: SaveReport,
}

#[derive(Debug, Serialize)]
pub struct AvailableDatesResponse {
    pub dates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DateRangeResponse {
    pub oldest: Option<String>,
    pub newest: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
