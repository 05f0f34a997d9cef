use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::modules::captions::{
    model::CaptionSet,
    schema::{DownloadQuery, ErrorResponse, GenerateCaptionsRequest, GenerateCaptionsResponse},
    srt,
};
use crate::services::transcript::{self, TranscriptEntry};
use crate::AppState;

/// Captions are translated one entry at a time with a fixed pause to
/// stay under the free providers' rate limits.
const TRANSLATION_DELAY: Duration = Duration::from_millis(100);

const SOURCE_LANG: &str = "ru";
const TARGET_LANG: &str = "en";

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub async fn generate_captions(
    State(state): State<AppState>,
    Json(payload): Json<GenerateCaptionsRequest>,
) -> Result<Json<GenerateCaptionsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let url = payload
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "No URL provided"))?;

    let video_id = transcript::extract_video_id(url)
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "Invalid YouTube URL"))?;

    info!(video_id, "fetching transcript");
    let entries = state
        .transcripts
        .fetch(&video_id, SOURCE_LANG)
        .await
        .map_err(|e| {
            error(
                StatusCode::NOT_FOUND,
                format!("Could not fetch transcript: {}", e),
            )
        })?;

    let russian_srt = srt::to_srt(&entries);

    info!(video_id, count = entries.len(), "translating captions");
    let mut translated = Vec::with_capacity(entries.len());
    for entry in &entries {
        let text = state
            .translator
            .translate_chunked(&entry.text, SOURCE_LANG, TARGET_LANG)
            .await;
        translated.push(TranscriptEntry {
            offset_ms: entry.offset_ms,
            duration_ms: entry.duration_ms,
            text,
        });
        tokio::time::sleep(TRANSLATION_DELAY).await;
    }
    let english_srt = srt::to_srt(&translated);

    state.captions.insert(CaptionSet {
        video_id: video_id.clone(),
        russian_srt: russian_srt.clone(),
        english_srt: english_srt.clone(),
    });

    Ok(Json(GenerateCaptionsResponse {
        status: "success".to_string(),
        video_id,
        russian_srt,
        english_srt,
        transcript_count: entries.len(),
    }))
}

/// Serve captions generated earlier this process as a downloadable
/// SRT (single language) or TXT (both languages) file.
pub async fn download_captions(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let set = state.captions.get(&video_id).ok_or_else(|| {
        error(
            StatusCode::NOT_FOUND,
            "No captions generated for this video",
        )
    })?;

    let lang = query.lang.as_deref().unwrap_or("en");
    let (content, filename) = match lang {
        "en" => (set.english_srt, format!("english_captions_{}.srt", video_id)),
        "ru" => (set.russian_srt, format!("russian_captions_{}.srt", video_id)),
        "both" => (
            format!(
                "=== RUSSIAN ===\n\n{}\n\n=== ENGLISH ===\n\n{}",
                set.russian_srt, set.english_srt
            ),
            format!("both_captions_{}.txt", video_id),
        ),
        other => {
            return Err(error(
                StatusCode::BAD_REQUEST,
                format!("Unsupported caption language: {}", other),
            ))
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        content,
    )
        .into_response())
}
