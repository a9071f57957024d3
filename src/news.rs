//! NewsAPI client.
//!
//! Fetches raw articles for a topic and converts them to the internal
//! format. Upstream failures never propagate: the route serving a topic
//! should answer with an empty digest rather than a 500.

use std::time::Duration;

use tracing::{error, info};

use crate::models::{Article, NewsApiResponse};

const PAGE_SIZE: u32 = 10;
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct NewsFetcher {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NewsFetcher {
    pub fn new(api_key: String, base_url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    /// Fetch articles for a topic. Any failure degrades to an empty list.
    pub async fn fetch_articles(&self, topic: &str) -> Vec<Article> {
        info!("fetching news for topic: {topic}");
        match self.try_fetch(topic).await {
            Ok(articles) => {
                info!("fetched and converted {} articles", articles.len());
                articles
            }
            Err(err) => {
                error!("news fetch failed for topic {topic}: {err:#}");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, topic: &str) -> anyhow::Result<Vec<Article>> {
        let page_size = PAGE_SIZE.to_string();
        let response = self
            .client
            .get(format!("{}/everything", self.base_url))
            .query(&[
                ("q", topic),
                ("apiKey", self.api_key.as_str()),
                ("pageSize", page_size.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let payload: NewsApiResponse = response.json().await?;
        Ok(payload
            .articles
            .into_iter()
            .filter_map(Article::from_newsapi)
            .collect())
    }
}
