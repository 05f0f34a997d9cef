use chrono::{DateTime, Utc};
use feed_rs::parser;
use tracing::warn;

use crate::config::channels::Channel;
use crate::modules::news::model::NewsItem;
use crate::services::translate::TranslationService;

/// A feed entry that survived field validation but has not been
/// translated or stamped with fetch metadata yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
}

/// Parse one feed's raw markup into validated entries.
///
/// Unparsable markup yields an empty list so a broken feed never
/// aborts aggregation of the others. Entries without a title or a
/// resolvable link are dropped; the entry id stands in for a missing
/// link only when it is itself a URL (permalink guids).
pub fn parse_feed(raw: &str, channel_name: &str) -> Vec<ParsedEntry> {
    let feed = match parser::parse(raw.as_bytes()) {
        Ok(feed) => feed,
        Err(e) => {
            warn!(channel = channel_name, error = %e, "unparsable feed markup");
            return Vec::new();
        }
    };

    feed.entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .filter(|l| !l.is_empty())
                .or_else(|| {
                    let id = entry.id.trim();
                    id.starts_with("http").then(|| id.to_string())
                })?;
            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty())?;
            let published_at = entry.published.or(entry.updated).unwrap_or_else(Utc::now);

            Some(ParsedEntry {
                title,
                link,
                published_at,
            })
        })
        .collect()
}

/// Turn parsed entries into news items, translating titles for
/// channels flagged as Russian. A failed translation degrades to the
/// original title inside the chain, so this never drops an entry.
pub async fn to_news_items(
    entries: Vec<ParsedEntry>,
    channel: &Channel,
    translator: &TranslationService,
) -> Vec<NewsItem> {
    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let title = if channel.russian {
            translator.translate(&entry.title, "ru", "en").await
        } else {
            entry.title.clone()
        };
        items.push(NewsItem::new(
            title,
            entry.title,
            entry.link,
            channel.name.clone(),
            entry.published_at,
        ));
    }
    items
}
