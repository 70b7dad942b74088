//! The feed loader state machine.
//!
//! One loader drives one paged listing. Lifecycle start resets the
//! listing and loads the first page, an end-of-list signal loads the
//! next page when one exists, pull-to-refresh restarts from scratch,
//! and lifecycle stop cancels whatever is in flight. At most one fetch
//! runs at a time; a newer trigger supersedes an older fetch.

use std::sync::Arc;

use pagefeed_api::{PageRequest, PageSource};
use parking_lot::Mutex;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;

use crate::configuration::EVENT_CHANNEL_CAPACITY;
use crate::events::FeedEvent;
use crate::mapper::EntryMapper;

/// Accumulates mapped entries from a [`PageSource`], one page at a time.
///
/// The lifecycle operations are synchronous; the fetch itself runs on a
/// spawned task, so they must be called inside a tokio runtime. Getters
/// and [`FeedLoader::subscribe`] may be used from anywhere.
pub struct FeedLoader<S, M>
where
    S: PageSource,
    M: EntryMapper<S::Entry>,
{
    source: Arc<S>,
    mapper: Arc<M>,
    auth_token: String,
    resource_id: String,
    shared: Arc<Shared<M::Item>>,
    events: broadcast::Sender<FeedEvent>,
}

struct Shared<I> {
    state: Mutex<LoaderState<I>>,
    /// Signalled whenever a fetch settles, for [`FeedLoader::wait_for_idle`].
    idle: Notify,
}

struct LoaderState<I> {
    items: Vec<I>,
    next_cursor: Option<String>,
    is_loading: bool,
    /// Handle of the one in-flight fetch task, if any.
    fetch: Option<JoinHandle<()>>,
    /// Generation counter, bumped whenever the in-flight fetch stops
    /// mattering. A fetch applies its result only while the epoch it
    /// captured at spawn time is still current, so a task that slips
    /// past its abort cannot publish a stale page.
    epoch: u64,
    stopped: bool,
}

impl<I> LoaderState<I> {
    fn should_load_more(&self) -> bool {
        !self.is_loading && self.next_cursor.is_some()
    }

    fn discard_fetch(&mut self) {
        self.epoch += 1;
        if let Some(handle) = self.fetch.take() {
            handle.abort();
        }
    }
}

impl<I> Default for LoaderState<I> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            is_loading: false,
            fetch: None,
            epoch: 0,
            stopped: false,
        }
    }
}

impl<S, M> FeedLoader<S, M>
where
    S: PageSource + Send + Sync + 'static,
    S::Entry: Send + 'static,
    M: EntryMapper<S::Entry> + Send + Sync + 'static,
    M::Item: Send + 'static,
{
    pub fn new(
        source: S,
        mapper: M,
        auth_token: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            source: Arc::new(source),
            mapper: Arc::new(mapper),
            auth_token: auth_token.into(),
            resource_id: resource_id.into(),
            shared: Arc::new(Shared {
                state: Mutex::new(LoaderState::default()),
                idle: Notify::new(),
            }),
            events: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
        }
    }

    /// Call when the owning screen becomes active. Resets the listing
    /// and loads the first page.
    pub fn on_start(&self) {
        self.on_refresh();
    }

    /// Call when the owning screen goes away. Cancels any in-flight
    /// fetch and turns every later operation into a no-op. Items and
    /// cursor are left as they are; the instance is being discarded.
    pub fn on_stop(&self) {
        let mut state = self.shared.state.lock();
        if state.stopped {
            return;
        }
        state.stopped = true;
        state.discard_fetch();
        if state.is_loading {
            state.is_loading = false;
            let _ = self.events.send(FeedEvent::LoadingChanged(false));
        }
        drop(state);
        self.shared.idle.notify_waiters();
        tracing::debug!(resource_id = %self.resource_id, "feed loader stopped");
    }

    /// Restart the listing from scratch: cancel whatever is in flight,
    /// clear the items and the cursor, then fetch the first page.
    /// Unconditional, unlike the end-of-list trigger.
    #[tracing::instrument(level = "debug", skip_all, fields(resource_id = %self.resource_id))]
    pub fn on_refresh(&self) {
        let mut state = self.shared.state.lock();
        if state.stopped {
            return;
        }
        state.discard_fetch();
        state.items.clear();
        state.next_cursor = None;
        let _ = self.events.send(FeedEvent::Cleared);
        self.start_fetch(&mut state);
    }

    /// Signal that the user scrolled near the end of the visible items.
    /// Loads the next page unless a fetch is already running or the
    /// listing is exhausted. `visible_count` is whatever the caller
    /// currently renders; it is logged but does not gate the decision.
    pub fn on_end_of_list_reached(&self, visible_count: usize) {
        let mut state = self.shared.state.lock();
        if state.stopped {
            return;
        }
        if !state.should_load_more() {
            tracing::trace!(
                visible_count,
                is_loading = state.is_loading,
                has_more = state.next_cursor.is_some(),
                "load-more skipped"
            );
            return;
        }
        tracing::debug!(
            resource_id = %self.resource_id,
            visible_count,
            "end of list reached, fetching next page"
        );
        self.start_fetch(&mut state);
    }

    /// The single place a fetch starts. Runs entirely under the state
    /// lock: the previous fetch is discarded, the loading flag raised,
    /// and the new task's handle stored before the task can touch the
    /// state, since applying a result needs this same lock.
    fn start_fetch(&self, state: &mut LoaderState<M::Item>) {
        state.discard_fetch();
        let epoch = state.epoch;
        if !state.is_loading {
            state.is_loading = true;
            let _ = self.events.send(FeedEvent::LoadingChanged(true));
        }

        let request = PageRequest {
            auth_token: self.auth_token.clone(),
            resource_id: self.resource_id.clone(),
            cursor: state.next_cursor.clone(),
        };
        let source = self.source.clone();
        let mapper = self.mapper.clone();
        let shared = self.shared.clone();
        let events = self.events.clone();

        state.fetch = Some(tokio::spawn(async move {
            let result = source.fetch_page(request).await;

            let mut state = shared.state.lock();
            if state.epoch != epoch {
                // Superseded while fetching; the canceller owns the
                // flags now.
                tracing::debug!("dropping the result of a superseded fetch");
                return;
            }
            state.fetch = None;
            state.is_loading = false;
            match result {
                Ok(page) => {
                    let count = page.entries.len();
                    state.items.extend(
                        page.entries
                            .into_iter()
                            .map(|entry| mapper.map_entry(entry)),
                    );
                    state.next_cursor = page.next_cursor;
                    tracing::debug!(
                        appended = count,
                        total = state.items.len(),
                        has_more = state.next_cursor.is_some(),
                        "page applied"
                    );
                    let _ = events.send(FeedEvent::Appended { count });
                }
                Err(error) => {
                    // A failed page advances nothing; the user retries
                    // via refresh or another end-of-list signal.
                    tracing::error!(%error, "page fetch failed");
                }
            }
            drop(state);
            let _ = events.send(FeedEvent::LoadingChanged(false));
            shared.idle.notify_waiters();
        }));
    }
}

impl<S, M> FeedLoader<S, M>
where
    S: PageSource,
    M: EntryMapper<S::Entry>,
{
    /// Snapshot of the visible items, in insertion order.
    pub fn items(&self) -> Vec<M::Item>
    where
        M::Item: Clone,
    {
        self.shared.state.lock().items.clone()
    }

    pub fn item_count(&self) -> usize {
        self.shared.state.lock().items.len()
    }

    /// True strictly between the start and the settling of a fetch.
    pub fn is_loading(&self) -> bool {
        self.shared.state.lock().is_loading
    }

    /// Continuation cursor for the next page. `None` both before the
    /// first page arrives and once the listing is exhausted.
    pub fn next_cursor(&self) -> Option<String> {
        self.shared.state.lock().next_cursor.clone()
    }

    pub fn has_more(&self) -> bool {
        self.shared.state.lock().next_cursor.is_some()
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Subscribe to state-change events. See [`FeedEvent`] for what is
    /// published and [`crate::StreamEvents`] for a stream adapter.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Wait until no fetch is in flight. Returns immediately when idle.
    pub async fn wait_for_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.shared.state.lock().is_loading {
                return;
            }
            notified.await;
        }
    }
}
