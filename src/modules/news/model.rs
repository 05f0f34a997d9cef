use bson::oid::ObjectId;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// A single aggregated news item.
///
/// Uniqueness in the archive is (url, fetch_date): re-fetching the
/// same article on the same day is a duplicate, the same URL seen on
/// another day is a distinct record.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewsItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Display title, translated for Russian channels.
    pub title: String,
    pub original_title: String,
    pub url: String,
    pub channel: String,
    pub published_at: DateTime<Utc>,
    /// Local calendar date of the fetch, "YYYY-MM-DD".
    pub fetch_date: String,
    /// Local wall-clock time of the fetch, "HH:MM".
    pub fetch_time: String,
}

impl NewsItem {
    pub fn new(
        title: String,
        original_title: String,
        url: String,
        channel: String,
        published_at: DateTime<Utc>,
    ) -> Self {
        let now = Local::now();
        Self {
            id: None,
            title,
            original_title,
            url,
            channel,
            published_at,
            fetch_date: now.format("%Y-%m-%d").to_string(),
            fetch_time: now.format("%H:%M").to_string(),
        }
    }
}
