use std::collections::HashMap;
use std::sync::Mutex;

/// The rendered subtitle pair for one video.
#[derive(Debug, Clone)]
pub struct CaptionSet {
    pub video_id: String,
    pub russian_srt: String,
    pub english_srt: String,
}

/// Process-lifetime store of generated captions, backing the download
/// endpoint. Subtitle documents are derived data and never persisted.
#[derive(Default)]
pub struct CaptionStore {
    sets: Mutex<HashMap<String, CaptionSet>>,
}

impl CaptionStore {
    pub fn insert(&self, set: CaptionSet) {
        self.sets
            .lock()
            .unwrap()
            .insert(set.video_id.clone(), set);
    }

    pub fn get(&self, video_id: &str) -> Option<CaptionSet> {
        self.sets.lock().unwrap().get(video_id).cloned()
    }
}
