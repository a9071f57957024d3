//! Article models - the NewsAPI wire format and our clean internal type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source block as returned by NewsAPI.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A raw article as returned by NewsAPI. Every field the API may omit or
/// null out is an `Option`; this payload is untrusted input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiArticle {
    pub source: Option<NewsApiSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub content: Option<String>,
}

/// Top-level NewsAPI response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(rename = "totalResults")]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

/// Clean internal article.
///
/// `url` is the article's identity: it keys both the summary cache and the
/// duplicate-tracking set in the cost controller.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Convert a raw NewsAPI article, dropping entries without a usable URL
    /// (no URL means no identity, so nothing to cache or dedup against).
    /// Empty-string text fields are normalized to `None` so downstream
    /// fallbacks (quality gate, prompt assembly) treat them as absent.
    pub fn from_newsapi(raw: NewsApiArticle) -> Option<Self> {
        let url = raw.url.filter(|u| !u.is_empty())?;
        Some(Self {
            title: raw.title.unwrap_or_default(),
            description: raw.description.filter(|d| !d.is_empty()),
            content: raw.content.filter(|c| !c.is_empty()),
            url,
            source: raw
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "unknown".to_string()),
            published_at: raw
                .published_at
                .as_deref()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.with_timezone(&Utc)),
        })
    }

    /// Text considered by the quality gate: content, falling back to the
    /// description when the API truncated the body away.
    pub fn usable_text(&self) -> &str {
        self.content
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }

    /// Title clipped for log lines.
    pub fn short_title(&self) -> String {
        self.title.chars().take(50).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: Option<&str>) -> NewsApiArticle {
        NewsApiArticle {
            source: Some(NewsApiSource {
                id: None,
                name: Some("Reuters".to_string()),
            }),
            author: None,
            title: Some("A headline".to_string()),
            description: Some("A description".to_string()),
            url: url.map(str::to_string),
            url_to_image: None,
            published_at: Some("2024-03-01T12:00:00Z".to_string()),
            content: None,
        }
    }

    #[test]
    fn test_conversion_extracts_source_name() {
        let article = Article::from_newsapi(raw(Some("https://example.com/a"))).unwrap();
        assert_eq!(article.source, "Reuters");
        assert_eq!(article.url, "https://example.com/a");
        assert!(article.published_at.is_some());
    }

    #[test]
    fn test_missing_url_is_dropped() {
        assert!(Article::from_newsapi(raw(None)).is_none());
        assert!(Article::from_newsapi(raw(Some(""))).is_none());
    }

    #[test]
    fn test_unparseable_timestamp_is_none() {
        let mut r = raw(Some("https://example.com/a"));
        r.published_at = Some("yesterday-ish".to_string());
        let article = Article::from_newsapi(r).unwrap();
        assert!(article.published_at.is_none());
    }

    #[test]
    fn test_empty_content_falls_back_to_description() {
        let mut r = raw(Some("https://example.com/a"));
        r.content = Some(String::new());
        r.description = Some("d".repeat(300));
        let article = Article::from_newsapi(r).unwrap();
        // An empty content field is absent, not a 0-length body; the
        // description carries the quality gate.
        assert!(article.content.is_none());
        assert_eq!(article.usable_text().len(), 300);

        let mut r = raw(Some("https://example.com/b"));
        r.description = Some(String::new());
        let article = Article::from_newsapi(r).unwrap();
        assert!(article.description.is_none());
        assert_eq!(article.usable_text(), "");
    }

    #[test]
    fn test_usable_text_prefers_content() {
        let mut article = Article::from_newsapi(raw(Some("https://example.com/a"))).unwrap();
        assert_eq!(article.usable_text(), "A description");
        article.content = Some("Full body".to_string());
        assert_eq!(article.usable_text(), "Full body");
    }
}
