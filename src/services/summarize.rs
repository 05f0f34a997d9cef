use std::collections::HashMap;
use std::env;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Character budget for extracted article text sent to the model.
const ARTICLE_CHAR_BUDGET: usize = 3000;

/// Extractions shorter than this are treated as failed.
const MIN_ARTICLE_CHARS: usize = 50;

const EXTRACTION_FAILED: &str = "Summary unavailable - could not extract article content.";
const GENERATION_FAILED: &str = "Summary unavailable - generation failed.";

/// Topic ranking ignores these along with any word of 4 chars or less.
const STOPWORDS: &[&str] = &[
    "about", "after", "against", "among", "because", "before", "between", "could", "during",
    "their", "there", "these", "those", "under", "where", "which", "while", "would", "should",
];

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Clone)]
struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    fn from_env() -> Result<Self, SummarizeError> {
        let api_key = env::var("OPENROUTER_API_KEY").map_err(|_| SummarizeError::MissingApiKey)?;
        if api_key.is_empty() {
            return Err(SummarizeError::MissingApiKey);
        }
        let base_url = env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());
        let model =
            env::var("SUMMARY_MODEL").unwrap_or_else(|_| "google/gemma-3-27b-it:free".to_string());

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String, SummarizeError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: 1000,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                return Err(SummarizeError::ApiError(error_response.error.message));
            }
            return Err(SummarizeError::ApiError(error_text));
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| SummarizeError::InvalidResponse("No choices in response".to_string()))
    }
}

/// A headline handed to the summarizer, carrying the source channel so
/// the fallback can count distinct sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    #[serde(default)]
    pub channel: String,
}

/// Headline and article summarization with graceful degradation.
///
/// The primary path is an LLM chat completion; when the backend is
/// unconfigured or fails, headline summaries fall back to a
/// deterministic keyword generator and article summaries to a fixed
/// unavailable message.
pub struct Summarizer {
    client: Client,
    chat: Option<ChatClient>,
    article_cache: Mutex<HashMap<String, String>>,
}

impl Summarizer {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            chat: ChatClient::from_env().ok(),
            article_cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn summarize_headlines(&self, headlines: &[Headline]) -> String {
        if let Some(chat) = &self.chat {
            match chat.complete(&headline_prompt(headlines)).await {
                Ok(summary) => return summary,
                Err(e) => {
                    warn!(error = %e, "headline summarization failed, using fallback");
                }
            }
        }
        fallback_summary(headlines)
    }

    /// Summarize a single article page. Always returns text: failures
    /// surface as fixed unavailable messages, never as errors.
    pub async fn summarize_article(&self, url: &str, title: &str) -> String {
        if let Some(hit) = self.article_cache.lock().unwrap().get(url) {
            return hit.clone();
        }

        let article_text = match self.fetch_article_text(url).await {
            Some(text) if text.chars().count() >= MIN_ARTICLE_CHARS => text,
            _ => return EXTRACTION_FAILED.to_string(),
        };

        let chat = match &self.chat {
            Some(chat) => chat,
            None => return GENERATION_FAILED.to_string(),
        };

        match chat.complete(&article_prompt(title, &article_text)).await {
            Ok(summary) => {
                self.article_cache
                    .lock()
                    .unwrap()
                    .insert(url.to_string(), summary.clone());
                summary
            }
            Err(e) => {
                warn!(url, error = %e, "article summarization failed");
                GENERATION_FAILED.to_string()
            }
        }
    }

    async fn fetch_article_text(&self, url: &str) -> Option<String> {
        let response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let html = response.text().await.ok()?;
        Some(extract_visible_text(&html))
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new()
    }
}

fn headline_prompt(headlines: &[Headline]) -> String {
    let mut prompt = String::from(
        "You are a news summarization assistant. The following are today's \
         Russian news headlines translated to English. Provide a concise 2-3 \
         sentence overview of the main themes.\n\n",
    );
    for headline in headlines {
        prompt.push_str("- ");
        prompt.push_str(&headline.title);
        prompt.push('\n');
    }
    prompt
}

fn article_prompt(title: &str, article_text: &str) -> String {
    format!(
        "You are a news summarization assistant. Translate the following \
         Russian news article to English and provide a concise 2-3 sentence \
         factual summary.\n\nTitle: {}\nArticle text:\n{}\n\nProvide ONLY the \
         translated summary, nothing else.",
        title, article_text
    )
}

/// Deterministic summary used when the generation backend is
/// unavailable: distinct channel count, word-frequency topics and the
/// leading titles in input order. Same input, same output.
pub fn fallback_summary(headlines: &[Headline]) -> String {
    if headlines.is_empty() {
        return "No headlines available to summarize.".to_string();
    }

    let mut channels: Vec<&str> = headlines
        .iter()
        .map(|h| h.channel.as_str())
        .filter(|c| !c.is_empty())
        .collect();
    channels.sort_unstable();
    channels.dedup();
    let channel_count = channels.len().max(1);

    let mut frequencies: HashMap<String, usize> = HashMap::new();
    for headline in headlines {
        for word in headline.title.split(|c: char| !c.is_alphanumeric()) {
            let word = word.to_lowercase();
            if word.chars().count() <= 4 || STOPWORDS.contains(&word.as_str()) {
                continue;
            }
            *frequencies.entry(word).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let topics: Vec<String> = ranked.into_iter().take(3).map(|(word, _)| word).collect();

    let leading: Vec<String> = headlines
        .iter()
        .take(3)
        .map(|h| format!("\"{}\"", h.title))
        .collect();

    let mut summary = format!(
        "{} headline{} from {} channel{}.",
        headlines.len(),
        if headlines.len() == 1 { "" } else { "s" },
        channel_count,
        if channel_count == 1 { "" } else { "s" },
    );
    if !topics.is_empty() {
        summary.push_str(&format!(" Recurring topics: {}.", topics.join(", ")));
    }
    summary.push_str(&format!(" Leading stories: {}.", leading.join("; ")));
    summary
}

static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "article",
        ".article-content",
        ".article-body",
        ".post-content",
        ".entry-content",
        "main",
        r#"[itemprop="articleBody"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("Failed to parse content selector"))
    .collect()
});

static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("Failed to parse paragraph selector"));

const SKIP_TAGS: &[&str] = &["script", "style", "nav", "footer", "aside"];
const SKIP_CLASSES: &[&str] = &["ad", "advertisement", "sidebar"];

/// Extract the readable text of an article page: prefer known
/// article-body containers, fall back to joined paragraph text, skip
/// chrome and ad elements, collapse whitespace and cap the length.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut content = String::new();
    for selector in CONTENT_SELECTORS.iter() {
        if let Some(element) = document.select(selector).next() {
            content = visible_text(element);
            break;
        }
    }

    if content.trim().len() < 100 {
        content = document
            .select(&PARAGRAPH_SELECTOR)
            .map(visible_text)
            .collect::<Vec<_>>()
            .join(" ");
    }

    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(ARTICLE_CHAR_BUDGET).collect()
}

fn visible_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) => {
                if SKIP_TAGS.contains(&el.name()) {
                    continue;
                }
                if el.attr("class").is_some_and(|classes| {
                    classes
                        .split_whitespace()
                        .any(|c| SKIP_CLASSES.contains(&c))
                }) {
                    continue;
                }
                if let Some(nested) = ElementRef::wrap(child) {
                    collect_text(nested, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headline(title: &str, channel: &str) -> Headline {
        Headline {
            title: title.to_string(),
            channel: channel.to_string(),
        }
    }

    #[test]
    fn fallback_summary_is_deterministic() {
        let headlines = vec![
            headline("Parliament debates budget amendments", "Vesti"),
            headline("Budget vote delayed until Thursday", "NTV"),
            headline("Weather warning issued for Siberia", "Vesti"),
        ];

        let first = fallback_summary(&headlines);
        let second = fallback_summary(&headlines);
        assert_eq!(first, second);
        assert!(first.starts_with("3 headlines from 2 channels."));
        assert!(first.contains("budget"));
        assert!(first.contains("\"Parliament debates budget amendments\""));
    }

    #[test]
    fn fallback_summary_skips_short_words_and_stopwords() {
        let headlines = vec![headline("There will be talks about grain exports", "RT")];
        let summary = fallback_summary(&headlines);
        // "there"/"about" are stopwords, "will"/"be" too short.
        assert!(summary.contains("Recurring topics: exports, grain, talks."));
    }

    #[test]
    fn fallback_summary_handles_empty_input() {
        assert_eq!(
            fallback_summary(&[]),
            "No headlines available to summarize."
        );
    }

    #[test]
    fn extracts_article_body_over_page_chrome() {
        let html = r#"
            <html><body>
            <nav>Site navigation</nav>
            <article>
                <script>var tracking = 1;</script>
                <div class="ad">Buy things</div>
                <p>First paragraph of the story.</p>
                <p>Second paragraph with details.</p>
                <div class="sidebar">Related links</div>
            </article>
            <footer>Copyright</footer>
            </body></html>
        "#;

        let text = extract_visible_text(html);
        assert!(text.contains("First paragraph of the story."));
        assert!(text.contains("Second paragraph with details."));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("Buy things"));
        assert!(!text.contains("Related links"));
        assert!(!text.contains("Site navigation"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn falls_back_to_paragraphs_without_known_containers() {
        let html = "<html><body>\
            <div><p>Standalone paragraph one with enough words to count for the extraction threshold check here.</p>\
            <p>Standalone paragraph two, also padded out with plenty of additional words to pass the length floor.</p></div>\
            </body></html>";

        let text = extract_visible_text(html);
        assert!(text.contains("Standalone paragraph one"));
        assert!(text.contains("Standalone paragraph two"));
    }

    #[test]
    fn extraction_is_capped_at_the_character_budget() {
        let body = "word ".repeat(2000);
        let html = format!("<html><body><article>{}</article></body></html>", body);
        let text = extract_visible_text(&html);
        assert_eq!(text.chars().count(), ARTICLE_CHAR_BUDGET);
    }
}
