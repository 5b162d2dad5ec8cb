//! Low-Memory Listener
//!
//! Delivers host low-memory notifications to shared caches, which respond by
//! dropping all of their entries.

use tokio::runtime::Handle;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::error::Result;

// == Low-Memory Notifier ==
/// Broadcasts low-memory notifications to every subscribed cache.
///
/// Clones share the same channel. Once every clone is dropped, listeners
/// stop on their own.
#[derive(Debug, Clone)]
pub struct LowMemoryNotifier {
    sender: broadcast::Sender<()>,
}

impl LowMemoryNotifier {
    /// Creates a notifier buffering up to `capacity` pending notifications
    /// per listener. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends a low-memory notification. Returns how many listeners will see it.
    pub fn notify(&self) -> usize {
        self.sender.send(()).unwrap_or(0)
    }

    /// Number of live listeners.
    pub fn listeners(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Spawns a listener that flushes `cache` on every notification.
    ///
    /// The listener runs on the current Tokio runtime and holds the cache's
    /// write lock only while flushing. Dropping the returned subscription
    /// stops it.
    ///
    /// # Example
    /// ```ignore
    /// let cache = MemoryCache::new().shared();
    /// let notifier = LowMemoryNotifier::new(16);
    /// let subscription = notifier.subscribe(cache.clone())?;
    /// notifier.notify();
    /// // Later, during shutdown:
    /// subscription.unsubscribe();
    /// ```
    pub fn subscribe(&self, cache: SharedCache) -> Result<LowMemorySubscription> {
        let runtime = Handle::try_current()?;
        let mut receiver = self.sender.subscribe();

        let handle = runtime.spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(()) => {}
                    // Missed notifications all ask for the same thing; flush once
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Coalescing lagged low-memory notifications");
                    }
                    Err(RecvError::Closed) => break,
                }

                cache.write().await.on_low_memory();
            }

            debug!("Low-memory notifier closed, listener exiting");
        });

        info!("Cache subscribed to low-memory notifications");
        Ok(LowMemorySubscription {
            handle: Some(handle),
        })
    }
}

impl Default for LowMemoryNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

// == Low-Memory Subscription ==
/// A running low-memory listener.
///
/// The listener is stopped exactly once, by [`LowMemorySubscription::unsubscribe`]
/// or on drop, whichever comes first.
#[derive(Debug)]
pub struct LowMemorySubscription {
    handle: Option<JoinHandle<()>>,
}

impl LowMemorySubscription {
    /// Stops the listener.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Returns true while the listener task is still running.
    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Cache unsubscribed from low-memory notifications");
        }
    }
}

impl Drop for LowMemorySubscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use std::time::Duration;

    /// Polls until the cache is empty or the timeout elapses.
    async fn wait_for_flush(cache: &SharedCache) -> bool {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if cache.read().await.is_empty() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .is_ok()
    }

    fn filled_cache() -> SharedCache {
        let mut cache = MemoryCache::new();
        cache.set("a", 1);
        cache.set(2_u8, "b");
        cache.shared()
    }

    #[tokio::test]
    async fn test_notification_flushes_cache() {
        let cache = filled_cache();
        let notifier = LowMemoryNotifier::new(4);
        let subscription = notifier.subscribe(cache.clone()).unwrap();

        assert_eq!(notifier.notify(), 1);
        assert!(wait_for_flush(&cache).await, "Cache should have been flushed");

        let stats = cache.read().await.stats();
        assert_eq!(stats.low_memory_flushes, 1);

        subscription.unsubscribe();
    }

    #[tokio::test]
    async fn test_every_subscriber_is_flushed() {
        let first = filled_cache();
        let second = filled_cache();
        let notifier = LowMemoryNotifier::new(4);
        let _a = notifier.subscribe(first.clone()).unwrap();
        let _b = notifier.subscribe(second.clone()).unwrap();

        assert_eq!(notifier.listeners(), 2);
        assert_eq!(notifier.notify(), 2);

        assert!(wait_for_flush(&first).await);
        assert!(wait_for_flush(&second).await);
    }

    #[tokio::test]
    async fn test_notify_without_listeners() {
        let notifier = LowMemoryNotifier::default();
        assert_eq!(notifier.listeners(), 0);
        assert_eq!(notifier.notify(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribed_cache_is_left_alone() {
        let cache = filled_cache();
        let notifier = LowMemoryNotifier::new(4);

        let subscription = notifier.subscribe(cache.clone()).unwrap();
        drop(subscription);

        // Give the aborted task a chance to wind down
        tokio::time::sleep(Duration::from_millis(50)).await;
        notifier.notify();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.read().await.count(), 2);
        assert_eq!(notifier.listeners(), 0);
    }

    #[tokio::test]
    async fn test_subscription_ends_when_notifier_dropped() {
        let cache = filled_cache();
        let notifier = LowMemoryNotifier::new(4);
        let subscription = notifier.subscribe(cache.clone()).unwrap();
        assert!(subscription.is_active());

        drop(notifier);

        let finished = tokio::time::timeout(Duration::from_secs(2), async {
            while subscription.is_active() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(finished.is_ok(), "Listener should exit once the notifier is gone");
        // Closing is not a low-memory event
        assert_eq!(cache.read().await.count(), 2);
    }

    #[tokio::test]
    async fn test_lagged_notifications_still_flush() {
        let cache = filled_cache();
        let notifier = LowMemoryNotifier::new(1);
        let _subscription = notifier.subscribe(cache.clone()).unwrap();

        // Overflow the single-slot buffer before the listener runs
        notifier.notify();
        notifier.notify();
        notifier.notify();

        assert!(wait_for_flush(&cache).await);
    }

    #[test]
    fn test_subscribe_outside_runtime_fails() {
        let notifier = LowMemoryNotifier::new(4);
        let result = notifier.subscribe(MemoryCache::new().shared());
        assert!(result.is_err());
    }
}
