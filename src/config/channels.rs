use std::env;

/// One configured RSS source.
#[derive(Debug, Clone)]
pub struct Channel {
    pub name: String,
    pub url: String,
    /// Titles from this source are Russian and get translated.
    pub russian: bool,
}

impl Channel {
    fn new(name: &str, url: &str, russian: bool) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            russian,
        }
    }
}

/// The default set of monitored Russian TV news feeds.
pub fn default_channels() -> Vec<Channel> {
    vec![
        Channel::new("RT (Russian)", "https://russian.rt.com/rss", true),
        Channel::new("Channel One", "https://www.1tv.ru/rss/", true),
        Channel::new("Vesti", "https://www.vesti.ru/vesti.rss", true),
        Channel::new("NTV", "https://www.ntv.ru/export/news.xml", true),
        Channel::new("Ren TV", "https://ren.tv/rss", true),
        Channel::new("Zvezda", "https://tvzvezda.ru/export/rss.xml", true),
        Channel::new("Mir TV", "https://mirtv.ru/rss/", true),
        Channel::new("TVC", "https://www.tvc.ru/rss/", true),
    ]
}

/// Base URL of the CORS-bypass proxy. The target feed URL is appended
/// as an encoded `url` query parameter.
pub fn proxy_base() -> String {
    env::var("PROXY_BASE").unwrap_or_else(|_| "https://api.allorigins.win/get".to_string())
}
