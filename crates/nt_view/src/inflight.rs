use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use nt_core::RemoteError;

pub type FetchResult<T> = Result<Arc<T>, RemoteError>;
pub type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

/// Requests that have been issued and not yet resolved, by key.
///
/// Only weak handles are kept: once every ticket for a request is dropped
/// the request future is dropped with them, which closes its connection.
pub struct InFlightRequests<K, T> {
    entries: HashMap<K, WeakShared<BoxFuture<'static, FetchResult<T>>>>,
}

impl<K, T> InFlightRequests<K, T>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Joins the pending request for `key`, or starts one with `start`.
    /// Returns the shared response and whether an existing request was joined.
    pub fn get_or_start<F>(&mut self, key: K, start: F) -> (SharedFetch<T>, bool)
    where
        F: FnOnce() -> BoxFuture<'static, FetchResult<T>>,
    {
        self.prune();

        if let Some(pending) = self.entries.get(&key).and_then(WeakShared::upgrade) {
            return (pending, true);
        }

        let shared = start().shared();
        if let Some(weak) = shared.downgrade() {
            self.entries.insert(key, weak);
        }
        (shared, false)
    }

    /// Forgets requests that resolved or that nobody is waiting for anymore.
    pub fn prune(&mut self) {
        self.entries.retain(|_, weak| match weak.upgrade() {
            Some(shared) => shared.peek().is_none(),
            None => false,
        });
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .and_then(WeakShared::upgrade)
            .map(|shared| shared.peek().is_none())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, T> Default for InFlightRequests<K, T>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A started fetch. Await [`FetchTicket::resolve`] and hand the outcome back
/// to the view that issued it.
pub struct FetchTicket<K, T> {
    pub generation: u64,
    pub key: K,
    response: SharedFetch<T>,
}

impl<K, T> FetchTicket<K, T> {
    pub(crate) fn new(generation: u64, key: K, response: SharedFetch<T>) -> Self {
        Self {
            generation,
            key,
            response,
        }
    }

    pub async fn resolve(self) -> FetchOutcome<K, T> {
        let result = self.response.await;
        FetchOutcome {
            generation: self.generation,
            key: self.key,
            result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome<K, T> {
    pub generation: u64,
    pub key: K,
    pub result: FetchResult<T>,
}
