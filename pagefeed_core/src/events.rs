use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

/// State changes broadcast to everyone observing a loader.
///
/// Events say *what* changed; subscribers re-read the loader's getters
/// for current values. A failed fetch surfaces only as
/// `LoadingChanged(false)` with no `Appended`: the loader logs the cause
/// instead of publishing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedEvent {
    /// The loading flag flipped.
    LoadingChanged(bool),
    /// A page was applied and `count` items were appended.
    Appended { count: usize },
    /// A refresh cleared the visible items and the cursor.
    Cleared,
}

/// Adapts a raw event receiver into a stream, skipping over any gap a
/// slow subscriber opened.
pub trait StreamEvents {
    fn stream_events(self) -> impl Stream<Item = FeedEvent>;
}

impl StreamEvents for broadcast::Receiver<FeedEvent> {
    fn stream_events(self) -> impl Stream<Item = FeedEvent> {
        BroadcastStream::new(self).filter_map(|event| async {
            match event {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "feed event subscriber lagged");
                    None
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stream_yields_events_in_send_order() {
        let (tx, rx) = broadcast::channel(8);
        tx.send(FeedEvent::Cleared).expect("subscriber alive");
        tx.send(FeedEvent::LoadingChanged(true)).expect("subscriber alive");
        tx.send(FeedEvent::Appended { count: 3 }).expect("subscriber alive");
        drop(tx);

        let events: Vec<_> = rx.stream_events().collect().await;
        assert_eq!(
            events,
            vec![
                FeedEvent::Cleared,
                FeedEvent::LoadingChanged(true),
                FeedEvent::Appended { count: 3 },
            ]
        );
    }

    #[tokio::test]
    async fn stream_skips_lagged_gap_and_resumes() {
        let (tx, rx) = broadcast::channel(2);
        tx.send(FeedEvent::Cleared).expect("subscriber alive");
        tx.send(FeedEvent::Appended { count: 1 }).expect("subscriber alive");
        // Capacity is 2, so this pushes `Cleared` out of the backlog.
        tx.send(FeedEvent::Appended { count: 2 }).expect("subscriber alive");
        drop(tx);

        let events: Vec<_> = rx.stream_events().collect().await;
        assert_eq!(
            events,
            vec![FeedEvent::Appended { count: 1 }, FeedEvent::Appended { count: 2 }]
        );
    }
}
