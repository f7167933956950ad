use futures::FutureExt;
use std::sync::Arc;

use nt_core::{Article, ArticleSource, CriteriaKey, FilterCriteria};

use crate::inflight::{FetchOutcome, FetchTicket, InFlightRequests};
use crate::render::{ArticleCard, ListRender};
use crate::state::{FetchState, ViewError};

/// Placeholder cards shown while loading, independent of the expected size.
pub const SKELETON_COUNT: usize = 3;

pub type ListTicket = FetchTicket<CriteriaKey, Vec<Article>>;
pub type ListOutcome = FetchOutcome<CriteriaKey, Vec<Article>>;

/// The article list page.
///
/// Moves `Idle -> Loading -> Success | Failure` and back into `Loading` each
/// time the observed criteria key changes. Every fetch carries the generation
/// it was issued under; only an outcome from the latest generation is ever
/// committed, whatever order responses arrive in.
pub struct ArticleListView {
    source: Arc<dyn ArticleSource>,
    state: FetchState<Vec<Article>>,
    criteria: Option<FilterCriteria>,
    key: Option<CriteriaKey>,
    generation: u64,
    in_flight: InFlightRequests<CriteriaKey, Vec<Article>>,
}

impl ArticleListView {
    pub fn new(source: Arc<dyn ArticleSource>) -> Self {
        Self {
            source,
            state: FetchState::Idle,
            criteria: None,
            key: None,
            generation: 0,
            in_flight: InFlightRequests::new(),
        }
    }

    /// Reacts to the committed criteria. Starts a fetch when the canonical
    /// key differs from the one currently shown; an unchanged key is a no-op.
    pub fn observe(&mut self, criteria: &FilterCriteria) -> Option<ListTicket> {
        let key = criteria.key();
        if self.key.as_ref() == Some(&key) {
            return None;
        }
        self.criteria = Some(criteria.clone());
        self.key = Some(key);
        self.issue()
    }

    /// Fetches the current criteria again. Only ever user-initiated.
    pub fn refresh(&mut self) -> Option<ListTicket> {
        self.criteria.as_ref()?;
        self.issue()
    }

    fn issue(&mut self) -> Option<ListTicket> {
        let (criteria, key) = match (&self.criteria, &self.key) {
            (Some(criteria), Some(key)) => (criteria.clone(), key.clone()),
            _ => return None,
        };

        // Any fetch still running belongs to an older generation from here on.
        self.generation += 1;

        if let Err(e) = criteria.validate() {
            tracing::debug!("Not fetching invalid criteria '{}': {}", key, e);
            self.state = FetchState::Failure(ViewError::Validation(e));
            return None;
        }

        self.state = FetchState::Loading;
        let source = Arc::clone(&self.source);
        let (response, joined) = self.in_flight.get_or_start(key.clone(), move || {
            async move { source.list_articles(&criteria).await.map(Arc::new) }.boxed()
        });
        if joined {
            tracing::debug!("Joined in-flight request for '{}'", key);
        } else {
            tracing::debug!("Fetching articles for '{}' (generation {})", key, self.generation);
        }

        Some(FetchTicket::new(self.generation, key, response))
    }

    /// Commits a resolved fetch. Returns false when the outcome is stale and
    /// was discarded.
    pub fn complete(&mut self, outcome: ListOutcome) -> bool {
        self.in_flight.prune();

        if outcome.generation != self.generation {
            tracing::debug!(
                "Discarding stale result for '{}' (generation {}, current {})",
                outcome.key,
                outcome.generation,
                self.generation
            );
            return false;
        }

        self.state = match outcome.result {
            Ok(items) => FetchState::Success(items),
            Err(e) => {
                tracing::warn!("Loading articles for '{}' failed: {}", outcome.key, e);
                FetchState::Failure(ViewError::Remote(e))
            }
        };
        true
    }

    /// Observes, waits for the response and commits it.
    pub async fn load(&mut self, criteria: &FilterCriteria) -> bool {
        match self.observe(criteria) {
            Some(ticket) => {
                let outcome = ticket.resolve().await;
                self.complete(outcome)
            }
            None => false,
        }
    }

    pub fn state(&self) -> &FetchState<Vec<Article>> {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn articles(&self) -> &[Article] {
        self.state.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_pending(&self, key: &CriteriaKey) -> bool {
        self.in_flight.is_pending(key)
    }

    /// Error replaces content: a failure never shows the previous list.
    pub fn render(&self) -> ListRender {
        match &self.state {
            FetchState::Idle | FetchState::Loading => ListRender::Skeletons(SKELETON_COUNT),
            FetchState::Failure(e) => ListRender::Error {
                message: e.message(),
                status: e.status(),
            },
            FetchState::Success(items) if items.is_empty() => ListRender::NoResults,
            FetchState::Success(items) => ListRender::Cards(items.iter().map(ArticleCard::from_article).collect()),
        }
    }
}
