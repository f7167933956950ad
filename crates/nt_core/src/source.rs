use async_trait::async_trait;

use crate::error::RemoteError;
use crate::filter::FilterCriteria;
use crate::types::{AnalysisResult, Article, ArticleId};

/// Read-only access to the article/analysis collaborator.
///
/// Every call is exactly one request. Implementations do not retry and do
/// not cache; de-duplication belongs to the view layer.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Articles matching the criteria, in the order the service returned them.
    async fn list_articles(&self, criteria: &FilterCriteria) -> Result<Vec<Article>, RemoteError>;

    async fn get_article(&self, id: ArticleId) -> Result<Article, RemoteError>;

    /// The analysis for an article, keyed by the article id.
    async fn get_analysis(&self, article_id: ArticleId) -> Result<AnalysisResult, RemoteError>;
}
