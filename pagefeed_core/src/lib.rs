#![warn(clippy::unwrap_used)]
//! Cursor-paged list loading for long-lived view state.
//!
//! The central type is [`FeedLoader`]: it owns the visible items of one
//! paged listing, fetches pages from a [`pagefeed_api::PageSource`] on a
//! spawned task, and maps raw entries through an [`EntryMapper`] before
//! appending them. Lifecycle hooks (`on_start`, `on_stop`, `on_refresh`,
//! `on_end_of_list_reached`) mirror the way a screen drives such a list:
//! start loads the first page, scrolling near the end loads the next one,
//! pull-to-refresh restarts from scratch, and stop cancels whatever is in
//! flight.
//!
//! At most one fetch runs at a time. A newer trigger supersedes an older
//! fetch; superseded fetches are aborted and their results discarded, so
//! stale pages never land in the list. Observers either poll the getters
//! or subscribe to the [`FeedEvent`] broadcast.

pub mod configuration;
mod events;
mod loader;
mod mapper;

#[cfg(test)]
mod test_utils;

pub use events::{FeedEvent, StreamEvents};
pub use loader::FeedLoader;
pub use mapper::EntryMapper;
