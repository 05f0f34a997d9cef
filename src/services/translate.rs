use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Free translation APIs reject silently: a 200 payload can still carry
/// a rate-limit banner instead of a translation.
const REJECT_MARKERS: &[&str] = &["ERROR", "LIMIT", "MYMEMORY WARNING"];

/// Provider request ceiling; longer text is split into chunks.
const CHUNK_CHARS: usize = 4500;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("provider returned no translation")]
    EmptyResponse,
}

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError>;
}

#[derive(Debug, Deserialize)]
struct ArgosResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

pub struct ArgosProvider {
    client: Client,
    base_url: String,
}

impl ArgosProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://translate.argosopentech.com/translate".to_string(),
        }
    }
}

#[async_trait]
impl TranslationProvider for ArgosProvider {
    fn name(&self) -> &'static str {
        "argos"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let body = serde_json::json!({ "q": text, "source": source, "target": target });
        let response = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: ArgosResponse = response.json().await?;
        payload.translated_text.ok_or(TranslateError::EmptyResponse)
    }
}

#[derive(Debug, Deserialize)]
struct LingvaResponse {
    translation: Option<String>,
}

pub struct LingvaProvider {
    client: Client,
    base_url: String,
}

impl LingvaProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://lingva.ml/api/v1".to_string(),
        }
    }
}

#[async_trait]
impl TranslationProvider for LingvaProvider {
    fn name(&self) -> &'static str {
        "lingva"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let url = format!(
            "{}/{}/{}/{}",
            self.base_url,
            source,
            target,
            urlencoding::encode(text)
        );
        let response = self.client.get(&url).send().await?.error_for_status()?;

        let payload: LingvaResponse = response.json().await?;
        payload.translation.ok_or(TranslateError::EmptyResponse)
    }
}

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: Option<MyMemoryData>,
}

#[derive(Debug, Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

pub struct MyMemoryProvider {
    client: Client,
    base_url: String,
}

impl MyMemoryProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://api.mymemory.translated.net/get".to_string(),
        }
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryProvider {
    fn name(&self) -> &'static str {
        "mymemory"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let langpair = format!("{}|{}", source, target);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", text), ("langpair", &langpair)])
            .send()
            .await?
            .error_for_status()?;

        let payload: MyMemoryResponse = response.json().await?;
        payload
            .response_data
            .and_then(|d| d.translated_text)
            .ok_or(TranslateError::EmptyResponse)
    }
}

/// Ordered fallback chain over interchangeable translation backends
/// with a process-lifetime memo of successful translations.
///
/// Translation is best-effort: when every provider times out, errors,
/// or returns a rejected payload, the original text comes back so
/// downstream processing never blocks on a translation failure.
pub struct TranslationService {
    providers: Vec<Box<dyn TranslationProvider>>,
    cache: Mutex<HashMap<String, String>>,
    timeout: Duration,
}

impl TranslationService {
    pub fn new() -> Self {
        let client = Client::new();
        let providers: Vec<Box<dyn TranslationProvider>> = vec![
            Box::new(ArgosProvider::new(client.clone())),
            Box::new(LingvaProvider::new(client.clone())),
            Box::new(MyMemoryProvider::new(client)),
        ];
        Self::with_providers(providers, PROVIDER_TIMEOUT)
    }

    pub fn with_providers(providers: Vec<Box<dyn TranslationProvider>>, timeout: Duration) -> Self {
        Self {
            providers,
            cache: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Translate `text`, trying each provider in order until one
    /// returns an acceptable result. Failures degrade to the original
    /// text. Successful results are cached by exact source text.
    pub async fn translate(&self, text: &str, source: &str, target: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        if let Some(hit) = self.cache.lock().unwrap().get(text) {
            return hit.clone();
        }

        for provider in &self.providers {
            let candidate =
                match tokio::time::timeout(self.timeout, provider.translate(text, source, target))
                    .await
                {
                    Err(_) => {
                        warn!(provider = provider.name(), "translation call timed out");
                        continue;
                    }
                    Ok(Err(e)) => {
                        warn!(provider = provider.name(), error = %e, "translation attempt failed");
                        continue;
                    }
                    Ok(Ok(translated)) => translated,
                };

            if is_acceptable(&candidate) {
                self.cache
                    .lock()
                    .unwrap()
                    .insert(text.to_string(), candidate.clone());
                return candidate;
            }
            warn!(
                provider = provider.name(),
                "translation rejected by response markers"
            );
        }

        text.to_string()
    }

    /// Translate text that may exceed the provider request ceiling by
    /// splitting it into char-boundary chunks and joining the results.
    pub async fn translate_chunked(&self, text: &str, source: &str, target: &str) -> String {
        if text.chars().count() <= CHUNK_CHARS {
            return self.translate(text, source, target).await;
        }

        let chars: Vec<char> = text.chars().collect();
        let mut parts = Vec::with_capacity(chars.len() / CHUNK_CHARS + 1);
        for chunk in chars.chunks(CHUNK_CHARS) {
            let piece: String = chunk.iter().collect();
            parts.push(self.translate(&piece, source, target).await);
        }
        parts.join(" ")
    }
}

impl Default for TranslationService {
    fn default() -> Self {
        Self::new()
    }
}

fn is_acceptable(candidate: &str) -> bool {
    !candidate.is_empty() && !REJECT_MARKERS.iter().any(|marker| candidate.contains(marker))
}
