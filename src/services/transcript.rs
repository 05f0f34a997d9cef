use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("no transcript available for video {video_id} in language '{lang}'")]
    NotFound { video_id: String, lang: String },
}

/// One caption line as delivered by the transcript source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub offset_ms: u64,
    pub duration_ms: u64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct TimedTextPayload {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

/// Client for YouTube's timedtext endpoint (json3 format).
#[derive(Clone)]
pub struct TranscriptClient {
    client: Client,
    base_url: String,
}

impl TranscriptClient {
    pub fn new() -> Self {
        let base_url = env::var("TIMEDTEXT_BASE_URL")
            .unwrap_or_else(|_| "https://video.google.com/timedtext".to_string());

        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Fetch the transcript for a video in the requested language.
    ///
    /// The endpoint answers an empty body when no track exists, which
    /// is reported as `NotFound` along with any non-2xx status.
    pub async fn fetch(
        &self,
        video_id: &str,
        lang: &str,
    ) -> Result<Vec<TranscriptEntry>, TranscriptError> {
        let not_found = || TranscriptError::NotFound {
            video_id: video_id.to_string(),
            lang: lang.to_string(),
        };

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("v", video_id), ("lang", lang), ("fmt", "json3")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(not_found());
        }

        let body = response.text().await?;
        let entries = entries_from_json(&body);
        if entries.is_empty() {
            return Err(not_found());
        }

        Ok(entries)
    }
}

impl Default for TranscriptClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a json3 timedtext body into transcript entries. Events
/// without caption text (timing markers) are skipped.
fn entries_from_json(body: &str) -> Vec<TranscriptEntry> {
    let payload: TimedTextPayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(_) => return Vec::new(),
    };

    payload
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event
                .segs
                .iter()
                .map(|seg| seg.utf8.as_str())
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptEntry {
                offset_ms: event.start_ms,
                duration_ms: event.duration_ms,
                text,
            })
        })
        .collect()
}

/// Pull the video id out of the common YouTube URL shapes:
/// `watch?v=`, `youtu.be/`, `/embed/` and `/v/`.
pub fn extract_video_id(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?;
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);

    let id = match host {
        "youtu.be" => parsed.path_segments()?.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => {
            let mut segments = parsed.path_segments()?;
            match segments.next()? {
                "watch" => parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                "embed" | "v" => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    };

    id.filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn extracts_id_from_short_embed_and_v_urls() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://m.youtube.com/v/dQw4w9WgXcQ?feature=share"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn rejects_non_youtube_urls() {
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/"), None);
    }

    #[test]
    fn parses_json3_events() {
        let body = r#"{
            "events": [
                {"tStartMs": 0, "dDurationMs": 1500, "segs": [{"utf8": "Привет"}, {"utf8": " мир"}]},
                {"tStartMs": 1500, "dDurationMs": 500},
                {"tStartMs": 2000, "dDurationMs": 1000, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 3000, "dDurationMs": 2000, "segs": [{"utf8": "ещё"}]}
            ]
        }"#;

        let entries = entries_from_json(body);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            TranscriptEntry {
                offset_ms: 0,
                duration_ms: 1500,
                text: "Привет мир".to_string(),
            }
        );
        assert_eq!(entries[1].offset_ms, 3000);
    }

    #[test]
    fn empty_or_invalid_body_yields_no_entries() {
        assert!(entries_from_json("").is_empty());
        assert!(entries_from_json("<transcript/>").is_empty());
        assert!(entries_from_json(r#"{"events": []}"#).is_empty());
    }
}
