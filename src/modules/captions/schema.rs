use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GenerateCaptionsRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateCaptionsResponse {
    pub status: String,
    pub video_id: String,
    pub russian_srt: String,
    pub english_srt: String,
    pub transcript_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
