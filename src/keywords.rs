//! Keyword Sources
//!
//! Seeds the word list from a target's own vocabulary. The `KeywordSource`
//! trait is the seam; [`HttpKeywordSource`] fetches a page over HTTP and
//! ranks the words of its title and visible text by frequency.
//!
//! A failing source never stops a run: [`gather_keywords`] turns any error
//! into a warning and an empty list.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

use crate::error::KeywordError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Pages with less visible text than this are checked for block phrases in
/// the body, not just the title.
const SHORT_BODY_CHARS: usize = 500;

const BLOCK_PHRASES: &[&str] = &[
    "attention required",
    "access denied",
    "security check",
    "cloudflare",
    "captcha",
    "robot",
    "blocked",
    "forbidden",
    "just a moment",
    "wait a moment",
    "challenge",
    "pardon our interruption",
];

const STOP_WORDS: &[&str] = &[
    "para", "com", "não", "que", "dos", "são", "das", "uma", "mas", "por", "sobre", "entre",
    "seus", "muito", "this", "that", "with", "from", "your", "contact", "policy", "rights",
    "reserved", "privacy", "terms", "menu", "home", "cookie", "cookies", "site", "website",
    "copyright", "todos", "direitos", "reservados",
];

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static HIDDEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(head|script|style|noscript|template)\b[^>]*>.*?</(head|script|style|noscript|template)>")
        .unwrap()
});
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#x[0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

// =============================================================================
// CONFIG
// =============================================================================

/// Keyword extraction settings
#[derive(Debug, Clone)]
pub struct KeywordConfig {
    /// Words returned at most
    pub max_words: usize,
    /// Shorter words are dropped
    pub min_word_len: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            max_words: 100,
            min_word_len: 4,
            timeout: Duration::from_secs(60),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// =============================================================================
// SOURCE TRAIT
// =============================================================================

/// Anything that can turn a target reference into seed words.
///
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait KeywordSource: Send + Sync {
    /// Candidate seed words for `target`, most relevant first.
    async fn fetch_keywords(&self, target: &str) -> Result<Vec<String>, KeywordError>;

    /// Short name used in diagnostics
    fn name(&self) -> &'static str;
}

/// Fetch keywords, degrading any failure to a warning and an empty list.
pub async fn gather_keywords(source: &dyn KeywordSource, target: &str) -> Vec<String> {
    match source.fetch_keywords(target).await {
        Ok(words) => {
            tracing::info!(source = source.name(), target = %target, count = words.len(), "Keywords gathered");
            words
        }
        Err(e) => {
            tracing::warn!(
                source = source.name(),
                target = %target,
                error = %e,
                "Keyword source failed, continuing with explicit words only"
            );
            Vec::new()
        }
    }
}

// =============================================================================
// HTTP SOURCE
// =============================================================================

/// Keyword source backed by a plain HTTP fetch of the target page
pub struct HttpKeywordSource {
    http: Client,
    config: KeywordConfig,
}

impl HttpKeywordSource {
    pub fn new(config: KeywordConfig) -> Result<Self, KeywordError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, config })
    }

    /// Use a preconfigured client (proxy settings, TLS roots).
    pub fn with_client(http: Client, config: KeywordConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &KeywordConfig {
        &self.config
    }
}

#[async_trait]
impl KeywordSource for HttpKeywordSource {
    async fn fetch_keywords(&self, target: &str) -> Result<Vec<String>, KeywordError> {
        let url = normalize_target(target)?;
        tracing::info!(url = %url, "Fetching keyword source page");

        let response = self
            .http
            .get(url.clone())
            .header(
                reqwest::header::ACCEPT_LANGUAGE,
                "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7",
            )
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeywordError::Status(status));
        }

        let html = response.text().await?;
        let (title, body) = visible_text(&html);
        if is_blocked(&title, &body) {
            return Err(KeywordError::Blocked(url.to_string()));
        }

        Ok(extract_keywords(&format!("{} {}", title, body), &self.config))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

// =============================================================================
// TEXT PROCESSING
// =============================================================================

/// Parse a target into an http(s) URL, assuming `https://` when no scheme is
/// given.
pub fn normalize_target(target: &str) -> Result<Url, KeywordError> {
    let target = target.trim();
    let candidate = if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("https://{}", target)
    };
    Url::parse(&candidate).map_err(|source| KeywordError::InvalidTarget {
        target: target.to_string(),
        source,
    })
}

/// Title and visible body text of an HTML document. Head, scripts, styles,
/// comments, tags and entities are removed.
pub fn visible_text(html: &str) -> (String, String) {
    let title = TITLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| collapse(&ENTITY_RE.replace_all(m.as_str(), " ")))
        .unwrap_or_default();

    let body = HIDDEN_RE.replace_all(html, " ");
    let body = COMMENT_RE.replace_all(&body, " ");
    let body = TAG_RE.replace_all(&body, " ");
    let body = ENTITY_RE.replace_all(&body, " ");

    (title, collapse(&body))
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when a page looks like a block, challenge or captcha page.
pub fn is_blocked(title: &str, body: &str) -> bool {
    let title = title.to_lowercase();
    let short_body = body.chars().count() < SHORT_BODY_CHARS;
    let body = body.to_lowercase();

    BLOCK_PHRASES
        .iter()
        .any(|phrase| title.contains(phrase) || (short_body && body.contains(phrase)))
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_SET.contains(word)
}

/// Rank the words of `text` by frequency (ties alphabetically) after
/// lowercasing and dropping short words and stop words.
pub fn extract_keywords(text: &str, config: &KeywordConfig) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let word = word.to_lowercase();
        if word.chars().count() < config.min_word_len || is_stop_word(&word) {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(config.max_words)
        .map(|(word, _)| word)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    struct FailingSource;

    #[async_trait]
    impl KeywordSource for FailingSource {
        async fn fetch_keywords(&self, target: &str) -> Result<Vec<String>, KeywordError> {
            Err(KeywordError::Blocked(target.to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn local_source() -> HttpKeywordSource {
        let http = Client::builder().no_proxy().build().unwrap();
        HttpKeywordSource::with_client(http, KeywordConfig::default())
    }

    /// Serve one canned HTML response on a local port.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[test]
    fn test_normalize_target() {
        assert_eq!(
            normalize_target("example.com").unwrap().as_str(),
            "https://example.com/"
        );
        assert_eq!(
            normalize_target("http://example.com/about").unwrap().as_str(),
            "http://example.com/about"
        );
        assert!(matches!(
            normalize_target(""),
            Err(KeywordError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_visible_text_strips_markup() {
        let html = r#"<html><head><title>Acme &amp; Sons</title><style>.x{}</style></head>
            <body><script>var hidden = "secretvar";</script><!-- note -->
            <h1>Welcome</h1><p>Acme builds rockets&nbsp;daily</p></body></html>"#;
        let (title, body) = visible_text(html);
        assert_eq!(title, "Acme Sons");
        assert_eq!(body, "Welcome Acme builds rockets daily");
    }

    #[test]
    fn test_is_blocked() {
        assert!(is_blocked("Attention Required! | Cloudflare", "lots of text"));
        assert!(is_blocked("Acme", "Please complete the captcha"));
        assert!(!is_blocked("Acme Rockets", "We build rockets"));
        // long bodies only trigger on the title
        let long_body = format!("{} robot", "word ".repeat(200));
        assert!(!is_blocked("Acme", &long_body));
    }

    #[test]
    fn test_extract_keywords_ranking() {
        let text = "Rockets rockets ROCKETS launch launch orbit the your privacy a Acme-Orbit";
        let words = extract_keywords(text, &KeywordConfig::default());
        assert_eq!(words, vec!["rockets", "launch", "orbit", "acme"]);
    }

    #[test]
    fn test_extract_keywords_limits() {
        let config = KeywordConfig {
            max_words: 2,
            min_word_len: 5,
            ..KeywordConfig::default()
        };
        let words = extract_keywords("alpha beta gamma delta epsilon", &config);
        assert_eq!(words, vec!["alpha", "delta"]);
    }

    #[test]
    fn test_extract_keywords_keeps_accented_words() {
        let words = extract_keywords("Promoção promoção não", &KeywordConfig::default());
        assert_eq!(words, vec!["promoção"]);
    }

    #[tokio::test]
    async fn test_gather_keywords_degrades_on_failure() {
        let words = gather_keywords(&FailingSource, "example.com").await;
        assert!(words.is_empty());
    }

    #[tokio::test]
    async fn test_http_source_fetches_and_ranks() {
        let url = serve_once(
            "200 OK",
            "<html><head><title>Acme Rockets</title></head><body><p>Rockets for orbit. Orbit daily with rockets.</p></body></html>",
        )
        .await;

        let source = local_source();
        let words = source.fetch_keywords(&url).await.unwrap();
        assert_eq!(words[0], "rockets");
        assert!(words.contains(&"orbit".to_string()));
        assert!(words.contains(&"acme".to_string()));
    }

    #[tokio::test]
    async fn test_http_source_reports_status() {
        let url = serve_once("503 Service Unavailable", "down").await;
        let source = local_source();
        assert!(matches!(
            source.fetch_keywords(&url).await,
            Err(KeywordError::Status(status)) if status.as_u16() == 503
        ));
    }

    #[tokio::test]
    async fn test_http_source_detects_block_page() {
        let url = serve_once(
            "200 OK",
            "<html><head><title>Just a moment...</title></head><body>Checking</body></html>",
        )
        .await;
        let source = local_source();
        assert!(matches!(
            source.fetch_keywords(&url).await,
            Err(KeywordError::Blocked(_))
        ));
    }
}
