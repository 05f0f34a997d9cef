use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use validator::Validate;

use crate::modules::news::{
    crud::NewsCrud,
    model::NewsItem,
    schema::{
        AvailableDatesResponse, DateRangeResponse, MessageResponse, NewsItemResponse,
        NewsListResponse, SaveNewsRequest, SaveNewsResponse, SummarizeRequest, SummarizeResponse,
        TodayResponse,
    },
};
use crate::services::summarize::Headline;
use crate::AppState;

fn to_response(item: &NewsItem) -> NewsItemResponse {
    NewsItemResponse {
        id: item.id.map(|id| id.to_hex()).unwrap_or_default(),
        title: item.title.clone(),
        original_title: item.original_title.clone(),
        url: item.url.clone(),
        channel: item.channel.clone(),
        published_at: item.published_at.to_rfc3339(),
        fetch_date: item.fetch_date.clone(),
        fetch_time: item.fetch_time.clone(),
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
}

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse {
            message: e.to_string(),
        }),
    )
}

/// `^\d{4}-\d{2}-\d{2}$`, a format check only. Calendar-invalid
/// dates pass through and the store simply returns nothing for them.
fn is_valid_date_format(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Live fetch of all feeds, restricted to items published today;
/// persists the batch and attaches a headline summary.
pub async fn today_news(
    State(state): State<AppState>,
) -> Result<Json<TodayResponse>, (StatusCode, Json<MessageResponse>)> {
    let batch = state.aggregator.fetch_all().await;

    let today = Local::now().format("%Y-%m-%d").to_string();
    let items: Vec<NewsItem> = batch
        .items
        .into_iter()
        .filter(|item| {
            item.published_at
                .with_timezone(&Local)
                .format("%Y-%m-%d")
                .to_string()
                == today
        })
        .collect();

    let crud = NewsCrud::new(&state.db);
    let report = crud.save_many(&items).await;

    let headlines: Vec<Headline> = items
        .iter()
        .map(|item| Headline {
            title: item.title.clone(),
            channel: item.channel.clone(),
        })
        .collect();
    let summary = state.summarizer.summarize_headlines(&headlines).await;

    Ok(Json(TodayResponse {
        total: items.len(),
        data: items.iter().map(to_response).collect(),
        summary,
        report,
        sources_ok: batch.sources_ok,
        sources_failed: batch.sources_failed,
        earliest: batch.earliest.map(|t| t.to_rfc3339()),
        latest: batch.latest.map(|t| t.to_rfc3339()),
    }))
}

pub async fn save_news(
    State(state): State<AppState>,
    Json(payload): Json<SaveNewsRequest>,
) -> Result<Json<SaveNewsResponse>, (StatusCode, Json<MessageResponse>)> {
    if let Err(e) = payload.validate() {
        return Err(bad_request(&e.to_string()));
    }

    let items: Vec<NewsItem> = payload
        .items
        .into_iter()
        .map(|input| {
            let original_title = input.original_title.unwrap_or_else(|| input.title.clone());
            let published_at = input.published_at.unwrap_or_else(chrono::Utc::now);
            NewsItem::new(
                input.title,
                original_title,
                input.url,
                input.channel,
                published_at,
            )
        })
        .collect();

    let crud = NewsCrud::new(&state.db);
    let report = crud.save_many(&items).await;

    Ok(Json(SaveNewsResponse { report }))
}

pub async fn news_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<NewsListResponse>, (StatusCode, Json<MessageResponse>)> {
    if !is_valid_date_format(&date) {
        return Err(bad_request("Invalid date format, expected YYYY-MM-DD"));
    }

    let crud = NewsCrud::new(&state.db);
    let items = crud.find_by_date(&date).await.map_err(internal_error)?;

    Ok(Json(NewsListResponse {
        total: items.len(),
        data: items.iter().map(to_response).collect(),
    }))
}

pub async fn available_dates(
    State(state): State<AppState>,
) -> Result<Json<AvailableDatesResponse>, (StatusCode, Json<MessageResponse>)> {
    let crud = NewsCrud::new(&state.db);
    let dates = crud.available_dates().await.map_err(internal_error)?;

    Ok(Json(AvailableDatesResponse { dates }))
}

pub async fn date_range(
    State(state): State<AppState>,
) -> Result<Json<DateRangeResponse>, (StatusCode, Json<MessageResponse>)> {
    let crud = NewsCrud::new(&state.db);
    let range = crud.date_range().await.map_err(internal_error)?;

    let (oldest, newest) = match range {
        Some((oldest, newest)) => (Some(oldest.to_rfc3339()), Some(newest.to_rfc3339())),
        None => (None, None),
    };

    Ok(Json(DateRangeResponse { oldest, newest }))
}

/// Headline-set or single-article summarization. Article mode is
/// selected by a `url` field; otherwise a non-empty `headlines` array
/// is required.
pub async fn summarize(
    State(state): State<AppState>,
    Json(payload): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, (StatusCode, Json<MessageResponse>)> {
    if let Some(url) = payload.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        let title = payload.title.as_deref().unwrap_or_default();
        let summary = state.summarizer.summarize_article(url, title).await;
        return Ok(Json(SummarizeResponse { summary }));
    }

    let headlines = payload
        .headlines
        .filter(|h| !h.is_empty())
        .ok_or_else(|| bad_request("Missing headlines array"))?;

    let summary = state.summarizer.summarize_headlines(&headlines).await;
    Ok(Json(SummarizeResponse { summary }))
}
