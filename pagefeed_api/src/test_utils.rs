//! Scripted [`PageSource`] implementations for tests and examples.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::{Page, PageRequest, PageSource, Result, SourceError};

/// Serves a fixed sequence of pages, chained with index-valued cursors
/// (`"1"`, `"2"`, ...). A request carrying a cursor this source never
/// issued fails with [`SourceError::Malformed`].
pub struct InMemorySource<E> {
    pages: Vec<Vec<E>>,
}

impl<E> InMemorySource<E> {
    pub fn new(pages: Vec<Vec<E>>) -> Self {
        Self { pages }
    }
}

#[async_trait::async_trait]
impl<E> PageSource for InMemorySource<E>
where
    E: Clone + Send + Sync,
{
    type Entry = E;

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<E>> {
        let index = match &request.cursor {
            None => 0,
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| SourceError::Malformed(format!("unknown cursor {cursor:?}")))?,
        };
        let Some(entries) = self.pages.get(index) else {
            return Err(SourceError::Malformed(format!(
                "cursor {index} past the last page"
            )));
        };
        let next_cursor = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(Page {
            entries: entries.clone(),
            next_cursor,
        })
    }
}

/// A source whose responses resolve only when the test says so.
///
/// Every `fetch_page` call records its request immediately, then parks on
/// a gate until [`GateHandle::release`] grants a permit and the next
/// scripted response is popped. A caller aborted while parked consumes
/// neither a permit nor a response.
pub struct GatedSource<E> {
    inner: Arc<GateInner<E>>,
}

/// Test-side control over a [`GatedSource`].
pub struct GateHandle<E> {
    inner: Arc<GateInner<E>>,
}

struct GateInner<E> {
    responses: Mutex<VecDeque<Result<Page<E>>>>,
    requests: Mutex<Vec<PageRequest>>,
    gate: Semaphore,
}

impl<E> GatedSource<E> {
    pub fn new() -> (Self, GateHandle<E>) {
        let inner = Arc::new(GateInner {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: Semaphore::new(0),
        });
        (
            Self {
                inner: inner.clone(),
            },
            GateHandle { inner },
        )
    }
}

impl<E> GateHandle<E> {
    /// Queue the response handed to the next released fetch.
    pub fn push(&self, response: Result<Page<E>>) {
        self.inner.responses.lock().push_back(response);
    }

    /// Let one parked fetch proceed.
    pub fn release(&self) {
        self.inner.gate.add_permits(1);
    }

    /// Number of fetches issued so far, parked ones included.
    pub fn calls(&self) -> usize {
        self.inner.requests.lock().len()
    }

    /// Every request seen so far, in arrival order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.inner.requests.lock().clone()
    }
}

impl<E> Clone for GateHandle<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[async_trait::async_trait]
impl<E> PageSource for GatedSource<E>
where
    E: Send + Sync,
{
    type Entry = E;

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<E>> {
        self.inner.requests.lock().push(request);
        let permit = self.inner.gate.acquire().await.expect("gate closed");
        permit.forget();
        self.inner
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(SourceError::Malformed("response script exhausted".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(cursor: Option<&str>) -> PageRequest {
        PageRequest {
            auth_token: "token".into(),
            resource_id: "resource".into(),
            cursor: cursor.map(String::from),
        }
    }

    #[tokio::test]
    async fn in_memory_source_chains_cursors() {
        let source = InMemorySource::new(vec![vec!["a", "b"], vec!["c"]]);

        let first = source.fetch_page(request(None)).await.unwrap();
        assert_eq!(first, Page::new(vec!["a", "b"], "1"));

        let second = source.fetch_page(request(Some("1"))).await.unwrap();
        assert_eq!(second, Page::last(vec!["c"]));
    }

    #[tokio::test]
    async fn in_memory_source_rejects_unknown_cursors() {
        let source = InMemorySource::new(vec![vec!["a"]]);

        let err = source.fetch_page(request(Some("nope"))).await.unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));

        let err = source.fetch_page(request(Some("7"))).await.unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[tokio::test]
    async fn gated_source_parks_until_released() {
        let (source, gate) = GatedSource::new();
        gate.push(Ok(Page::last(vec!["a"])));
        gate.release();

        let page = source.fetch_page(request(None)).await.unwrap();
        assert_eq!(page.entries, vec!["a"]);
        assert_eq!(gate.calls(), 1);
        assert_eq!(gate.requests()[0].cursor, None);
    }

    #[tokio::test]
    async fn gated_source_errors_when_script_runs_dry() {
        let (source, gate) = GatedSource::<&str>::new();
        gate.release();

        let err = source.fetch_page(request(None)).await.unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }
}
