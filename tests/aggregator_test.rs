use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use svodka::config::channels::Channel;
use svodka::modules::news::aggregator::NewsAggregator;
use svodka::services::translate::TranslationService;

fn rss(channel: &str, entries: &[(&str, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(title, date)| {
            format!(
                "<item><title>{title}</title>\
                 <link>https://example.com/{channel}/{title}</link>\
                 <pubDate>{date}</pubDate></item>"
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel>\
         <title>{channel}</title>{items}</channel></rss>"
    )
}

// Stands in for the CORS proxy: wraps the feed body in the
// "contents" envelope and counts upstream hits.
async fn spawn_proxy(calls: Arc<AtomicUsize>) -> String {
    let app = Router::new().route(
        "/get",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let target = params.get("url").cloned().unwrap_or_default();
                if target.contains("alpha") {
                    let body = rss(
                        "alpha",
                        &[
                            ("noon", "Mon, 01 Jan 2024 12:00:00 GMT"),
                            ("dawn", "Mon, 01 Jan 2024 08:00:00 GMT"),
                        ],
                    );
                    Json(json!({ "contents": body })).into_response()
                } else if target.contains("beta") {
                    let body = rss(
                        "beta",
                        &[
                            ("morning", "Mon, 01 Jan 2024 11:00:00 GMT"),
                            ("early", "Mon, 01 Jan 2024 09:00:00 GMT"),
                        ],
                    );
                    Json(json!({ "contents": body })).into_response()
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/get", addr)
}

fn test_channels() -> Vec<Channel> {
    vec![
        Channel {
            name: "Alpha".to_string(),
            url: "https://feeds.test/alpha.rss".to_string(),
            russian: true,
        },
        Channel {
            name: "Beta".to_string(),
            url: "https://feeds.test/beta.rss".to_string(),
            russian: false,
        },
        Channel {
            name: "Gamma".to_string(),
            url: "https://feeds.test/gamma.rss".to_string(),
            russian: false,
        },
    ]
}

#[tokio::test]
async fn test_merges_sources_and_skips_failures() {
    let calls = Arc::new(AtomicUsize::new(0));
    let proxy = spawn_proxy(calls.clone()).await;

    // No providers, so Russian titles pass through untranslated.
    let translator = Arc::new(TranslationService::with_providers(
        vec![],
        Duration::from_millis(10),
    ));
    let aggregator = NewsAggregator::with_config(
        proxy,
        test_channels(),
        translator,
        Duration::from_secs(300),
    );

    let batch = aggregator.fetch_all().await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(batch.sources_ok, vec!["Alpha", "Beta"]);
    assert_eq!(batch.sources_failed, vec!["Gamma"]);

    let titles: Vec<&str> = batch.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["noon", "morning", "early", "dawn"]);
    for pair in batch.items.windows(2) {
        assert!(pair[0].published_at >= pair[1].published_at);
    }

    assert_eq!(batch.latest, Some(batch.items[0].published_at));
    assert_eq!(batch.earliest, Some(batch.items[3].published_at));
}

#[tokio::test]
async fn test_serves_cached_batch_within_window() {
    let calls = Arc::new(AtomicUsize::new(0));
    let proxy = spawn_proxy(calls.clone()).await;

    let translator = Arc::new(TranslationService::with_providers(
        vec![],
        Duration::from_millis(10),
    ));
    let aggregator = NewsAggregator::with_config(
        proxy,
        test_channels(),
        translator,
        Duration::from_secs(300),
    );

    let first = aggregator.fetch_all().await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let second = aggregator.fetch_all().await;
    assert_eq!(calls.load(Ordering::SeqCst), 3, "cached batch must not refetch");
    assert_eq!(second.items.len(), first.items.len());
    assert_eq!(second.sources_failed, first.sources_failed);
}
