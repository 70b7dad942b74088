//! Contract between a paged feed and the endpoint serving it.
//!
//! A feed endpoint hands out a listing in pages: each response carries a
//! batch of entries plus an opaque continuation cursor, with `None`
//! signalling that the listing is exhausted. [`PageSource`]
//! implementations adapt a concrete transport (HTTP, gRPC, a fixture) to
//! this contract; everything above the trait treats entries and cursors
//! as opaque values.

use async_trait::async_trait;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub type Result<T> = std::result::Result<T, SourceError>;

/// One page of a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<E> {
    /// Entries in the order the endpoint returned them.
    pub entries: Vec<E>,
    /// Continuation token for the page after this one; `None` when the
    /// listing ends here.
    pub next_cursor: Option<String>,
}

impl<E> Page<E> {
    pub fn new(entries: Vec<E>, next_cursor: impl Into<String>) -> Self {
        Self {
            entries,
            next_cursor: Some(next_cursor.into()),
        }
    }

    /// A page with nothing after it.
    pub fn last(entries: Vec<E>) -> Self {
        Self {
            entries,
            next_cursor: None,
        }
    }
}

/// Parameters of a single page fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub auth_token: String,
    pub resource_id: String,
    /// Cursor returned by the previous page, or `None` for the first page.
    pub cursor: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("endpoint returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed page payload: {0}")]
    Malformed(String),
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// An endpoint that serves a listing one page at a time.
///
/// An in-flight call is cancelled by dropping its future; implementations
/// must not leave caller-visible side effects behind when that happens.
/// Failures surface as [`SourceError`] values distinguishable from
/// cancellation, never as panics.
#[async_trait]
pub trait PageSource {
    /// Raw listing record, opaque to callers.
    type Entry;

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<Self::Entry>>;
}
