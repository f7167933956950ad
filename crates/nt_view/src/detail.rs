use futures::FutureExt;
use std::sync::Arc;

use nt_core::{AnalysisResult, Article, ArticleId, ArticleSource};

use crate::inflight::{FetchOutcome, FetchTicket, InFlightRequests};
use crate::render::{AnalysisPanel, AnalysisRender, ArticleCard, DetailRender};
use crate::state::{FetchState, ViewError};

pub type ArticleTicket = FetchTicket<ArticleId, Article>;
pub type AnalysisTicket = FetchTicket<ArticleId, AnalysisResult>;

/// Detail page for a single article, with its analysis loaded on demand.
pub struct ArticleDetailView {
    source: Arc<dyn ArticleSource>,
    article_id: Option<ArticleId>,
    article: FetchState<Article>,
    analysis: FetchState<AnalysisResult>,
    generation: u64,
    articles_in_flight: InFlightRequests<ArticleId, Article>,
    analyses_in_flight: InFlightRequests<ArticleId, AnalysisResult>,
}

impl ArticleDetailView {
    pub fn new(source: Arc<dyn ArticleSource>) -> Self {
        Self {
            source,
            article_id: None,
            article: FetchState::Idle,
            analysis: FetchState::Idle,
            generation: 0,
            articles_in_flight: InFlightRequests::new(),
            analyses_in_flight: InFlightRequests::new(),
        }
    }

    /// Shows the article with `id`. Reopening the article already shown is
    /// a no-op.
    pub fn open(&mut self, id: ArticleId) -> Option<ArticleTicket> {
        if self.article_id == Some(id) {
            return None;
        }
        self.article_id = Some(id);
        self.generation += 1;
        self.article = FetchState::Loading;
        self.analysis = FetchState::Idle;

        let source = Arc::clone(&self.source);
        let (response, _) = self.articles_in_flight.get_or_start(id, move || {
            async move { source.get_article(id).await.map(Arc::new) }.boxed()
        });
        tracing::debug!("Opening article {} (generation {})", id, self.generation);
        Some(FetchTicket::new(self.generation, id, response))
    }

    /// Requests the analysis of the open article, unless it is already
    /// loading or loaded.
    pub fn load_analysis(&mut self) -> Option<AnalysisTicket> {
        let id = self.article_id?;
        if matches!(self.analysis, FetchState::Loading | FetchState::Success(_)) {
            return None;
        }
        self.analysis = FetchState::Loading;

        let source = Arc::clone(&self.source);
        let (response, _) = self.analyses_in_flight.get_or_start(id, move || {
            async move { source.get_analysis(id).await.map(Arc::new) }.boxed()
        });
        Some(FetchTicket::new(self.generation, id, response))
    }

    pub fn complete_article(&mut self, outcome: FetchOutcome<ArticleId, Article>) -> bool {
        self.articles_in_flight.prune();
        if !self.is_current(outcome.generation, outcome.key) {
            tracing::debug!("Discarding stale article {}", outcome.key);
            return false;
        }
        self.article = match outcome.result {
            Ok(article) => FetchState::Success(article),
            Err(e) => FetchState::Failure(ViewError::Remote(e)),
        };
        true
    }

    pub fn complete_analysis(&mut self, outcome: FetchOutcome<ArticleId, AnalysisResult>) -> bool {
        self.analyses_in_flight.prune();
        if !self.is_current(outcome.generation, outcome.key) {
            tracing::debug!("Discarding stale analysis for article {}", outcome.key);
            return false;
        }
        self.analysis = match outcome.result {
            Ok(analysis) => FetchState::Success(analysis),
            Err(e) => FetchState::Failure(ViewError::Remote(e)),
        };
        true
    }

    /// Leaves the page. Results still in flight are discarded on arrival.
    pub fn close(&mut self) {
        self.article_id = None;
        self.generation += 1;
        self.article = FetchState::Idle;
        self.analysis = FetchState::Idle;
    }

    pub async fn load(&mut self, id: ArticleId) -> bool {
        match self.open(id) {
            Some(ticket) => {
                let outcome = ticket.resolve().await;
                self.complete_article(outcome)
            }
            None => false,
        }
    }

    pub async fn load_analysis_now(&mut self) -> bool {
        match self.load_analysis() {
            Some(ticket) => {
                let outcome = ticket.resolve().await;
                self.complete_analysis(outcome)
            }
            None => false,
        }
    }

    fn is_current(&self, generation: u64, id: ArticleId) -> bool {
        generation == self.generation && self.article_id == Some(id)
    }

    pub fn article_id(&self) -> Option<ArticleId> {
        self.article_id
    }

    pub fn article(&self) -> &FetchState<Article> {
        &self.article
    }

    pub fn analysis(&self) -> &FetchState<AnalysisResult> {
        &self.analysis
    }

    pub fn is_open(&self) -> bool {
        self.article_id.is_some()
    }

    pub fn render(&self) -> DetailRender {
        match &self.article {
            FetchState::Idle => DetailRender::Empty,
            FetchState::Loading => DetailRender::Loading,
            FetchState::Failure(e) => DetailRender::Error {
                message: e.message(),
                status: e.status(),
            },
            FetchState::Success(article) => DetailRender::Article {
                card: ArticleCard::from_article(article),
                analysis: match &self.analysis {
                    FetchState::Idle => AnalysisRender::NotRequested,
                    FetchState::Loading => AnalysisRender::Loading,
                    FetchState::Failure(e) => AnalysisRender::Unavailable(e.message()),
                    FetchState::Success(analysis) => AnalysisRender::Ready(AnalysisPanel::from_analysis(analysis)),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_analysis, sample_article, ScriptedSource};
    use nt_core::RemoteError;

    #[tokio::test]
    async fn test_open_and_render_article() {
        let source = Arc::new(ScriptedSource::new());
        source.set_article(ArticleId(3), Ok(sample_article(3, "Three")));
        let mut view = ArticleDetailView::new(source.clone());

        assert_eq!(view.render(), DetailRender::Empty);
        assert!(view.load(ArticleId(3)).await);

        match view.render() {
            DetailRender::Article { card, analysis } => {
                assert_eq!(card.title, "Three");
                assert_eq!(analysis, AnalysisRender::NotRequested);
            }
            other => panic!("unexpected render: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_analysis_keeps_article_visible() {
        let source = Arc::new(ScriptedSource::new());
        source.set_article(ArticleId(4), Ok(sample_article(4, "Four")));
        source.set_analysis(
            ArticleId(4),
            Err(RemoteError::RequestFailed {
                status: 404,
                body: "Analysis not found".to_string(),
            }),
        );
        let mut view = ArticleDetailView::new(source.clone());
        view.load(ArticleId(4)).await;
        assert!(view.load_analysis_now().await);

        match view.render() {
            DetailRender::Article { card, analysis } => {
                assert_eq!(card.title, "Four");
                assert!(matches!(analysis, AnalysisRender::Unavailable(ref m) if m.contains("404")));
            }
            other => panic!("unexpected render: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_analysis_loaded_once() {
        let source = Arc::new(ScriptedSource::new());
        source.set_article(ArticleId(5), Ok(sample_article(5, "Five")));
        source.set_analysis(ArticleId(5), Ok(sample_analysis(5)));
        let mut view = ArticleDetailView::new(source.clone());
        view.load(ArticleId(5)).await;

        assert!(view.load_analysis_now().await);
        assert!(view.load_analysis().is_none());
        assert_eq!(source.calls(), vec!["article:5", "analysis:5"]);
    }

    #[tokio::test]
    async fn test_result_for_previous_article_is_discarded() {
        let source = Arc::new(ScriptedSource::new());
        source.set_article(ArticleId(1), Ok(sample_article(1, "One")));
        source.set_article(ArticleId(2), Ok(sample_article(2, "Two")));
        let mut view = ArticleDetailView::new(source.clone());

        let first = view.open(ArticleId(1)).unwrap();
        let second = view.open(ArticleId(2)).unwrap();
        let second = second.resolve().await;
        let first = first.resolve().await;

        assert!(view.complete_article(second));
        assert!(!view.complete_article(first));
        assert_eq!(view.article().data().unwrap().title, "Two");
    }

    #[tokio::test]
    async fn test_close_discards_pending_result() {
        let source = Arc::new(ScriptedSource::new());
        let mut view = ArticleDetailView::new(source.clone());
        let ticket = view.open(ArticleId(8)).unwrap();
        view.close();

        assert!(!view.complete_article(ticket.resolve().await));
        assert!(!view.is_open());
        assert_eq!(view.render(), DetailRender::Empty);
    }
}
