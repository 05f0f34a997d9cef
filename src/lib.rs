use std::sync::Arc;

use mongodb::Database;

pub mod config;
pub mod modules;
pub mod services;

use modules::captions::model::CaptionStore;
use modules::news::aggregator::NewsAggregator;
use services::summarize::Summarizer;
use services::transcript::TranscriptClient;
use services::translate::TranslationService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub translator: Arc<TranslationService>,
    pub aggregator: Arc<NewsAggregator>,
    pub summarizer: Arc<Summarizer>,
    pub transcripts: Arc<TranscriptClient>,
    pub captions: Arc<CaptionStore>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let translator = Arc::new(TranslationService::new());
        Self {
            aggregator: Arc::new(NewsAggregator::new(translator.clone())),
            summarizer: Arc::new(Summarizer::new()),
            transcripts: Arc::new(TranscriptClient::new()),
            captions: Arc::new(CaptionStore::default()),
            translator,
            db,
        }
    }
}
