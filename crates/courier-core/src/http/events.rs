//! Effective-status broadcast channel
//!
//! Every normalized response publishes its effective status here so
//! out-of-band observers (session guards, telemetry) can react to
//! authentication failures without threading state through call sites.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

/// Receive-only stream of effective status codes
pub type StatusStream = broadcast::Receiver<u16>;

/// Broadcast fan-out for effective status codes
///
/// Cloning shares the underlying channel; `close` takes effect across all
/// clones at once.
#[derive(Clone, Debug)]
pub struct StatusEvents {
    sender: Arc<RwLock<Option<broadcast::Sender<u16>>>>,
}

impl StatusEvents {
    /// Create a channel that buffers up to `capacity` unread statuses per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(RwLock::new(Some(tx))),
        }
    }

    /// Subscribe to statuses emitted after this call.
    ///
    /// A subscription taken after `close` yields no items and reports the
    /// channel as closed on the first `recv`.
    pub fn subscribe(&self) -> StatusStream {
        if let Ok(guard) = self.sender.read() {
            if let Some(tx) = guard.as_ref() {
                return tx.subscribe();
            }
        }
        closed_stream()
    }

    /// Publish one effective status to all current subscribers.
    ///
    /// Emission is best-effort; lagged subscribers are handled by `broadcast`.
    /// Publishing after `close` is a bug in the caller: it trips a debug
    /// assertion and is ignored in release builds.
    pub fn emit(&self, status: u16) {
        if let Ok(guard) = self.sender.read() {
            match guard.as_ref() {
                Some(tx) => {
                    let _ = tx.send(status);
                }
                None => debug_assert!(false, "status {status} published after close"),
            }
        }
    }

    /// Drop the sender so all subscribers observe end-of-stream.
    pub fn close(&self) {
        if let Ok(mut guard) = self.sender.write() {
            guard.take();
        }
    }

    /// True once `close` has run.
    pub fn is_closed(&self) -> bool {
        self.sender
            .read()
            .map(|guard| guard.is_none())
            .unwrap_or(true)
    }
}

fn closed_stream() -> StatusStream {
    // Sender is dropped immediately, so the receiver reports Closed.
    broadcast::channel(1).1
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::error::RecvError;

    use super::*;

    #[tokio::test]
    async fn fans_out_statuses_to_all_subscribers() {
        let events = StatusEvents::new(8);
        let mut a = events.subscribe();
        let mut b = events.subscribe();

        events.emit(401);

        assert_eq!(a.recv().await, Ok(401));
        assert_eq!(b.recv().await, Ok(401));
    }

    #[tokio::test]
    async fn statuses_arrive_in_emit_order() {
        let events = StatusEvents::new(8);
        let mut stream = events.subscribe();

        events.emit(200);
        events.emit(401);
        events.emit(503);

        assert_eq!(stream.recv().await, Ok(200));
        assert_eq!(stream.recv().await, Ok(401));
        assert_eq!(stream.recv().await, Ok(503));
    }

    #[tokio::test]
    async fn close_ends_existing_subscriptions_after_buffered_items() {
        let events = StatusEvents::new(4);
        let mut stream = events.subscribe();

        events.emit(200);
        events.close();

        assert_eq!(stream.recv().await, Ok(200));
        assert!(matches!(stream.recv().await, Err(RecvError::Closed)));
    }

    #[tokio::test]
    async fn subscription_after_close_reports_closed() {
        let events = StatusEvents::new(4);
        events.close();

        let mut stream = events.subscribe();
        assert!(matches!(stream.recv().await, Err(RecvError::Closed)));
    }

    #[test]
    fn emit_without_subscribers_is_a_noop() {
        let events = StatusEvents::new(4);
        events.emit(500);
        assert!(!events.is_closed());
    }

    #[test]
    fn clones_share_close_state() {
        let events = StatusEvents::new(4);
        let clone = events.clone();

        events.close();
        assert!(clone.is_closed());
    }

    #[test]
    #[should_panic(expected = "published after close")]
    fn emit_after_close_trips_debug_assertion() {
        let events = StatusEvents::new(4);
        events.close();
        events.emit(200);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let events = StatusEvents::new(0);
        let mut stream = events.subscribe();
        events.emit(204);
        assert_eq!(stream.try_recv(), Ok(204));
    }
}
