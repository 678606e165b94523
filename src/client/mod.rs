//! Embeddable client for the notification pipeline: a live SSE consumer
//! with bounded reconnection, a typed event bus, and an aggregator that
//! reconciles pushed, fetched, and cached notification state.

pub mod aggregator;
pub mod api;
pub mod bus;
pub mod cache;
pub mod live;
pub mod sse;
pub mod transport;

pub use aggregator::{AggregatorSnapshot, NotificationAggregator};
pub use api::{NotificationApi, RestNotificationApi};
pub use bus::EventBus;
pub use cache::{CachedNotifications, NotificationCache};
pub use live::{
    ClientEvent, LiveClientConfig, LiveNotificationClient, StaticTokenProvider, StreamState,
    TokenProvider,
};
pub use transport::{FrameStream, HttpStreamTransport, StreamTransport};
