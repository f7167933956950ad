use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use nt_core::{AnalysisResult, Article, ArticleId, ArticleSource, FilterCriteria, RemoteError};

/// An in-memory `ArticleSource` with scripted responses.
///
/// Every call is recorded (`list:<key>`, `article:<id>`, `analysis:<id>`).
/// A call can be held open with [`ScriptedSource::hold`] until
/// [`ScriptedSource::release`] is called with the same label, which lets
/// tests decide the order responses arrive in.
#[derive(Default)]
pub struct ScriptedSource {
    lists: Mutex<HashMap<String, Result<Vec<Article>, RemoteError>>>,
    articles: Mutex<HashMap<ArticleId, Result<Article, RemoteError>>>,
    analyses: Mutex<HashMap<ArticleId, Result<AnalysisResult, RemoteError>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_label(criteria: &FilterCriteria) -> String {
        format!("list:{}", criteria.key())
    }

    pub fn set_list(&self, criteria: &FilterCriteria, response: Result<Vec<Article>, RemoteError>) {
        self.lists.lock().unwrap().insert(criteria.key().to_string(), response);
    }

    pub fn set_article(&self, id: ArticleId, response: Result<Article, RemoteError>) {
        self.articles.lock().unwrap().insert(id, response);
    }

    pub fn set_analysis(&self, id: ArticleId, response: Result<AnalysisResult, RemoteError>) {
        self.analyses.lock().unwrap().insert(id, response);
    }

    /// Makes calls with this label wait for [`ScriptedSource::release`].
    pub fn hold(&self, label: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(label.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, label: &str) {
        if let Some(gate) = self.gates.lock().unwrap().remove(label) {
            gate.notify_waiters();
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self, criteria: &FilterCriteria) -> usize {
        let label = Self::list_label(criteria);
        self.calls.lock().unwrap().iter().filter(|c| **c == label).count()
    }

    async fn enter(&self, label: String) {
        self.calls.lock().unwrap().push(label.clone());
        let gate = self.gates.lock().unwrap().get(&label).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl ArticleSource for ScriptedSource {
    async fn list_articles(&self, criteria: &FilterCriteria) -> Result<Vec<Article>, RemoteError> {
        self.enter(Self::list_label(criteria)).await;
        self.lists
            .lock()
            .unwrap()
            .get(criteria.key().as_str())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_article(&self, id: ArticleId) -> Result<Article, RemoteError> {
        self.enter(format!("article:{}", id)).await;
        self.articles
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| {
                Err(RemoteError::RequestFailed {
                    status: 404,
                    body: "{\"detail\":\"Article not found\"}".to_string(),
                })
            })
    }

    async fn get_analysis(&self, article_id: ArticleId) -> Result<AnalysisResult, RemoteError> {
        self.enter(format!("analysis:{}", article_id)).await;
        self.analyses
            .lock()
            .unwrap()
            .get(&article_id)
            .cloned()
            .unwrap_or_else(|| {
                Err(RemoteError::RequestFailed {
                    status: 404,
                    body: "{\"detail\":\"Analysis not found\"}".to_string(),
                })
            })
    }
}

/// An article with only the required fields set.
pub fn sample_article(id: u64, title: &str) -> Article {
    Article {
        id: ArticleId(id),
        source_id: None,
        title: title.to_string(),
        link: format!("https://news.example.com/{}", id),
        published_at: None,
        summary: None,
        sentiment_label: None,
        sentiment_score: None,
        keywords: None,
    }
}

pub fn sample_analysis(article_id: u64) -> AnalysisResult {
    AnalysisResult {
        id: 1000 + article_id,
        article_id: ArticleId(article_id),
        summary: Some("Summary from the analysis model.".to_string()),
        sentiment_label: Some(nt_core::SentimentLabel::Positive),
        sentiment_score: Some(0.6),
        keywords: Some(vec!["economy".to_string()]),
        model_name: Some("test-model".to_string()),
        created_at: None,
        metadata: None,
    }
}
