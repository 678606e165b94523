use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::sse::{Event, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::{IntervalStream, UnboundedReceiverStream};
use uuid::Uuid;

use crate::{
    auth::{jwt::user_id_from_claims, verify_jwt},
    error::Result,
    notification::notification_store::NotificationStore,
    state::AppState,
};

use super::{
    frames::StreamFrame,
    registry::{ConnectionId, ConnectionRegistry},
};

/// Idle proxies tend to cut streams after 60s of silence.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// The browser `EventSource` API cannot set headers, so the bearer token
/// rides in the query string for this one endpoint.
#[derive(Deserialize)]
pub struct StreamQuery {
    token: String,
}

struct ConnectionGuard {
    registry: ConnectionRegistry,
    user_id: Uuid,
    connection_id: ConnectionId,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.deregister(self.user_id, self.connection_id);
    }
}

/// Subscribe to real-time notifications via Server-Sent Events
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    params(
        ("token" = String, Query, description = "Bearer token")
    ),
    responses(
        (status = 200, description = "SSE stream of notification frames"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications"
)]
pub async fn notification_stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let claims = verify_jwt(&query.token, &state.config.jwt_secret)?;
    let user_id = user_id_from_claims(&claims)?;

    let (connection_id, rx) = state.registry.register(user_id);
    // Deregisters when the stream is dropped: client disconnect, write
    // failure, or server shutdown.
    let guard = ConnectionGuard {
        registry: state.registry.clone(),
        user_id,
        connection_id,
    };

    let unread_count = state.notification_repository.unread_count(user_id).await?;

    let handshake = stream::iter(vec![
        StreamFrame::Connected,
        StreamFrame::Initial { unread_count },
    ]);
    let pushed = UnboundedReceiverStream::new(rx);
    let heartbeats = IntervalStream::new(tokio::time::interval_at(
        tokio::time::Instant::now() + HEARTBEAT_INTERVAL,
        HEARTBEAT_INTERVAL,
    ))
    .map(|_| StreamFrame::Heartbeat);

    let stream = handshake
        .chain(stream::select(pushed, heartbeats))
        .map(move |frame| {
            let _keep = &guard;
            frame_event(&frame)
        })
        .filter_map(|event| futures::future::ready(event.map(Ok)));

    Ok(Sse::new(stream))
}

fn frame_event(frame: &StreamFrame) -> Option<Event> {
    match serde_json::to_string(frame) {
        Ok(json) => Some(Event::default().data(json)),
        Err(e) => {
            tracing::error!("Failed to encode stream frame: {e}");
            None
        }
    }
}
