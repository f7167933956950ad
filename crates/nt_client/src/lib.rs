use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use url::Url;

use nt_core::{
    AnalysisResult, Article, ArticleId, ArticleListResponse, ArticleSource, ClientConfig, FilterCriteria,
    RemoteError, Result,
};

/// HTTP client for the news service.
#[derive(Clone)]
pub struct RemoteArticleClient {
    client: Arc<Client>,
    config: ClientConfig,
}

impl RemoteArticleClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| nt_core::Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// The `/articles` URL for the criteria. Shares its query string with
    /// the shareable address.
    pub fn articles_url(&self, criteria: &FilterCriteria) -> Url {
        let mut url = self.config.endpoint("articles");
        let query = criteria.encode();
        url.set_query(if query.is_empty() { None } else { Some(&query) });
        url
    }

    pub fn article_url(&self, id: ArticleId) -> Url {
        self.config.endpoint(&format!("articles/{}", id))
    }

    pub fn analysis_url(&self, article_id: ArticleId) -> Url {
        self.config.endpoint(&format!("analyses/{}", article_id))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> std::result::Result<T, RemoteError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::warn!("Request to {} failed: {}", url, e);
            RemoteError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!("GET {} -> {}", url, status);

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Reading error body from {} failed: {}", url, e);
                    format!("<unreadable body: {}>", e)
                }
            };
            tracing::warn!("Request to {} returned {}: {}", url, status.as_u16(), body);
            return Err(RemoteError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!("Reading response from {} failed: {}", url, e);
            RemoteError::Unreachable(e.to_string())
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!("Response from {} did not decode: {}", url, e);
            RemoteError::MalformedResponse(e.to_string())
        })
    }
}

impl fmt::Debug for RemoteArticleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteArticleClient")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.config.base_url.as_str())
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

#[async_trait]
impl ArticleSource for RemoteArticleClient {
    async fn list_articles(&self, criteria: &FilterCriteria) -> std::result::Result<Vec<Article>, RemoteError> {
        let response: ArticleListResponse = self.get_json(self.articles_url(criteria)).await?;
        tracing::debug!("Received {} articles for '{}'", response.items.len(), criteria.key());
        Ok(response.items)
    }

    async fn get_article(&self, id: ArticleId) -> std::result::Result<Article, RemoteError> {
        self.get_json(self.article_url(id)).await
    }

    async fn get_analysis(&self, article_id: ArticleId) -> std::result::Result<AnalysisResult, RemoteError> {
        self.get_json(self.analysis_url(article_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_core::{Sentiment, SortOrder};

    fn client() -> RemoteArticleClient {
        RemoteArticleClient::new(ClientConfig::new("http://localhost:8000").unwrap()).unwrap()
    }

    #[test]
    fn test_articles_url_uses_canonical_encoding() {
        let criteria = FilterCriteria {
            sentiment: Sentiment::Positive,
            sort: SortOrder::ScoreDesc,
            ..Default::default()
        };
        assert_eq!(
            client().articles_url(&criteria).as_str(),
            "http://localhost:8000/articles?sentiment=positive&sort=score_desc"
        );
    }

    #[test]
    fn test_articles_url_omits_empty_fields() {
        let url = client().articles_url(&FilterCriteria::default());
        let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(keys, vec!["sort"]);
    }

    #[test]
    fn test_detail_urls() {
        let client = client();
        assert_eq!(client.article_url(ArticleId(12)).as_str(), "http://localhost:8000/articles/12");
        assert_eq!(client.analysis_url(ArticleId(12)).as_str(), "http://localhost:8000/analyses/12");
    }

    #[test]
    fn test_debug_hides_client_internals() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("localhost:8000"));
        assert!(debug.contains("<reqwest::Client>"));
    }
}
