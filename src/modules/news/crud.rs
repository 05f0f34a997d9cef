use bson::doc;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use serde::Serialize;
use tracing::warn;

use crate::modules::news::model::NewsItem;

const COLLECTION_NAME: &str = "news_items";
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Per-item outcome tally of a batch save.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub saved: u64,
    pub duplicates: u64,
    pub errors: u64,
}

pub struct NewsCrud {
    collection: Collection<NewsItem>,
}

impl NewsCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_NAME),
        }
    }

    /// Create the unique (url, fetch_date) index that turns concurrent
    /// re-saves into tallied duplicates instead of extra records.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! { "url": 1, "fetch_date": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    /// Save each item independently; a duplicate-key violation counts
    /// as a duplicate, any other error is tallied, and neither stops
    /// the rest of the batch.
    pub async fn save_many(&self, items: &[NewsItem]) -> SaveReport {
        let mut report = SaveReport::default();
        for item in items {
            match self.collection.insert_one(item).await {
                Ok(_) => report.saved += 1,
                Err(e) if is_duplicate_key(&e) => report.duplicates += 1,
                Err(e) => {
                    warn!(url = %item.url, error = %e, "failed to store news item");
                    report.errors += 1;
                }
            }
        }
        report
    }

    pub async fn find_by_date(&self, date: &str) -> Result<Vec<NewsItem>, mongodb::error::Error> {
        let cursor = self
            .collection
            .find(doc! { "fetch_date": date })
            .sort(doc! { "published_at": -1 })
            .await?;

        cursor.try_collect().await
    }

    /// Distinct fetch dates with stored items, newest first.
    pub async fn available_dates(&self) -> Result<Vec<String>, mongodb::error::Error> {
        let values = self.collection.distinct("fetch_date", doc! {}).await?;

        let mut dates: Vec<String> = values
            .into_iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect();
        dates.sort_by(|a, b| b.cmp(a));
        Ok(dates)
    }

    /// Oldest and newest publish timestamps across the archive.
    pub async fn date_range(
        &self,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, mongodb::error::Error> {
        let oldest = self
            .collection
            .find_one(doc! {})
            .sort(doc! { "published_at": 1 })
            .await?;
        let newest = self
            .collection
            .find_one(doc! {})
            .sort(doc! { "published_at": -1 })
            .await?;

        Ok(oldest
            .zip(newest)
            .map(|(o, n)| (o.published_at, n.published_at)))
    }
}

pub fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match *error.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_write_errors_are_not_duplicates() {
        let error = mongodb::error::Error::custom("boom");
        assert!(!is_duplicate_key(&error));
    }
}
