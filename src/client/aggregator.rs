use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;
use crate::notification::Notification;

use super::api::NotificationApi;
use super::bus::EventBus;
use super::cache::{CachedNotifications, NotificationCache};
use super::live::ClientEvent;

/// UI-facing view of notification state, merged from three sources of
/// differing authority: REST fetches (authoritative), live pushes
/// (optimistic), and the file cache (fallback when fetches fail).
#[derive(Debug, Clone, Default)]
pub struct AggregatorSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
    /// Set while the view is served from cache after a failed fetch.
    pub degraded: bool,
}

pub struct NotificationAggregator {
    api: Arc<dyn NotificationApi>,
    cache: NotificationCache,
    page_size: u32,
    state: Arc<StdMutex<AggregatorSnapshot>>,
}

impl NotificationAggregator {
    pub fn new(api: Arc<dyn NotificationApi>, cache: NotificationCache, page_size: u32) -> Self {
        Self {
            api,
            cache,
            page_size,
            state: Arc::new(StdMutex::new(AggregatorSnapshot::default())),
        }
    }

    pub fn snapshot(&self) -> AggregatorSnapshot {
        self.state.lock().unwrap().clone()
    }

    /// Fetch the first page and the authoritative unread count. On success
    /// the local state is overwritten and mirrored into the cache; on
    /// failure the last-known data is served with the degraded flag set.
    pub async fn refresh(&self) -> AggregatorSnapshot {
        match self.api.fetch_page(1, self.page_size).await {
            Ok(page) => {
                let snapshot = {
                    let mut state = self.state.lock().unwrap();
                    state.notifications = page.data;
                    state.unread_count = page.unread_count;
                    state.degraded = false;
                    state.clone()
                };

                let mut cached = self.cache.load().unwrap_or_default();
                cached.notifications = snapshot.notifications.clone();
                cached.unread_count = snapshot.unread_count;
                cached.saved_at = Some(Utc::now());
                if let Err(e) = self.cache.store(&cached) {
                    warn!("Failed to mirror notifications into cache: {e}");
                }

                snapshot
            }
            Err(e) => {
                warn!("Notification fetch failed, serving cached data: {e}");

                let mut state = self.state.lock().unwrap();
                if state.notifications.is_empty() {
                    match self.cache.load() {
                        Ok(cached) => {
                            state.notifications = cached.notifications;
                            state.unread_count = cached.unread_count;
                        }
                        Err(e) => warn!("Notification cache unreadable: {e}"),
                    }
                }
                state.degraded = true;
                state.clone()
            }
        }
    }

    /// Feed live pushes into the view. The updates are optimistic and are
    /// superseded by the next successful `refresh`.
    pub fn attach(&self, bus: &EventBus<ClientEvent>) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ClientEvent::Push(notification)) => apply_push(&state, notification),
                    // Connection state is the live client's concern.
                    Ok(ClientEvent::Disconnected) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Notification bus lagged by {skipped} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Optimistic local mutation followed by the REST call. A failed call
    /// is returned to the caller; the local state is left as mutated and
    /// re-synchronized by the next refresh.
    pub async fn mark_read(&self, id: Uuid) -> Result<()> {
        {
            let mut guard = self.state.lock().unwrap();
            let state = &mut *guard;
            if let Some(notification) = state.notifications.iter_mut().find(|n| n.id == id) {
                if !notification.is_seen {
                    notification.is_seen = true;
                    state.unread_count = (state.unread_count - 1).max(0);
                }
            }
        }

        self.api.mark_read(id).await
    }

    pub async fn mark_all_read(&self) -> Result<u64> {
        {
            let mut guard = self.state.lock().unwrap();
            let state = &mut *guard;
            for notification in state.notifications.iter_mut() {
                notification.is_seen = true;
            }
            state.unread_count = 0;
        }

        self.api.mark_all_read().await
    }
}

fn apply_push(state: &StdMutex<AggregatorSnapshot>, notification: Notification) {
    let mut state = state.lock().unwrap();
    if !notification.is_seen {
        state.unread_count += 1;
    }
    state.notifications.insert(0, notification);
}
