use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::channels::{self, Channel};
use crate::modules::news::model::NewsItem;
use crate::modules::news::parser;
use crate::services::translate::TranslationService;

/// How long a fetched batch is served before feeds are re-fetched.
const FETCH_WINDOW: Duration = Duration::from_secs(300);

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
enum FeedError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("proxy response missing contents")]
    MissingContents,
}

#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    contents: Option<String>,
}

/// The merged result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct FetchBatch {
    /// All items across sources, sorted by publish time descending.
    pub items: Vec<NewsItem>,
    pub sources_ok: Vec<String>,
    pub sources_failed: Vec<String>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

struct CachedBatch {
    batch: FetchBatch,
    fetched_at: Instant,
}

/// Fetches all configured feeds through the CORS-bypass proxy,
/// merges and sorts their items, and memoizes the batch for the
/// fetch window. Archive queries never go through here.
pub struct NewsAggregator {
    client: Client,
    proxy_base: String,
    channels: Vec<Channel>,
    translator: Arc<TranslationService>,
    window: Duration,
    cache: Mutex<Option<CachedBatch>>,
}

impl NewsAggregator {
    pub fn new(translator: Arc<TranslationService>) -> Self {
        Self::with_config(
            channels::proxy_base(),
            channels::default_channels(),
            translator,
            FETCH_WINDOW,
        )
    }

    pub fn with_config(
        proxy_base: String,
        channels: Vec<Channel>,
        translator: Arc<TranslationService>,
        window: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            proxy_base,
            channels,
            translator,
            window,
            cache: Mutex::new(None),
        }
    }

    /// Fetch every configured source concurrently and merge the
    /// results. A failed source is skipped and tallied, never fatal.
    /// Within the fetch window the previous batch is returned as-is.
    pub async fn fetch_all(&self) -> FetchBatch {
        if let Some(batch) = self.cached() {
            return batch;
        }

        let fetches = self.channels.iter().map(|channel| self.fetch_channel(channel));
        let results = join_all(fetches).await;

        let mut batch = FetchBatch::default();
        for (channel, outcome) in self.channels.iter().zip(results) {
            match outcome {
                Ok(items) => {
                    batch.sources_ok.push(channel.name.clone());
                    batch.items.extend(items);
                }
                Err(e) => {
                    warn!(channel = %channel.name, error = %e, "skipping source");
                    batch.sources_failed.push(channel.name.clone());
                }
            }
        }

        batch.items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        batch.latest = batch.items.first().map(|item| item.published_at);
        batch.earliest = batch.items.last().map(|item| item.published_at);

        info!(
            items = batch.items.len(),
            ok = batch.sources_ok.len(),
            failed = batch.sources_failed.len(),
            "feed aggregation complete"
        );

        *self.cache.lock().unwrap() = Some(CachedBatch {
            batch: batch.clone(),
            fetched_at: Instant::now(),
        });

        batch
    }

    fn cached(&self) -> Option<FetchBatch> {
        let guard = self.cache.lock().unwrap();
        guard
            .as_ref()
            .filter(|cached| {
                !cached.batch.items.is_empty() && cached.fetched_at.elapsed() < self.window
            })
            .map(|cached| cached.batch.clone())
    }

    async fn fetch_channel(&self, channel: &Channel) -> Result<Vec<NewsItem>, FeedError> {
        // Cache-busting timestamp, mirrored from the proxy contract.
        let url = format!(
            "{}?url={}&t={}",
            self.proxy_base,
            urlencoding::encode(&channel.url),
            Utc::now().timestamp_millis()
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }

        let envelope: ProxyEnvelope = response.json().await?;
        let contents = envelope.contents.ok_or(FeedError::MissingContents)?;

        let entries = parser::parse_feed(&contents, &channel.name);
        Ok(parser::to_news_items(entries, channel, &self.translator).await)
    }
}
