use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::notification::Notification;
use crate::sse::StreamFrame;

use super::bus::EventBus;
use super::transport::StreamTransport;

/// Events republished to the rest of the process.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A notification pushed over the live stream.
    Push(Notification),
    /// Reconnection attempts are exhausted; a manual or auth-triggered
    /// `connect()` is required from here.
    Disconnected,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamState {
    pub connected: bool,
    /// Advisory; corrected by `initial` frames and authoritative REST fetches.
    pub unread_count: u64,
    pub reconnect_attempt: u32,
}

#[derive(Debug, Clone)]
pub struct LiveClientConfig {
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
    pub max_reconnect_attempts: u32,
    /// Delay between the forced disconnect and the fresh connect on an
    /// auth change, so token storage has settled.
    pub auth_reconnect_delay_ms: u64,
}

impl Default for LiveClientConfig {
    fn default() -> Self {
        Self {
            backoff_base_ms: 1_000,
            backoff_cap_ms: 30_000,
            max_reconnect_attempts: 5,
            auth_reconnect_delay_ms: 500,
        }
    }
}

/// `min(base * 2^attempt, cap)` for the 1-based attempt counter.
pub fn backoff_delay(config: &LiveClientConfig, attempt: u32) -> Duration {
    let exp = 2u64.saturating_pow(attempt);
    Duration::from_millis(
        config
            .backoff_base_ms
            .saturating_mul(exp)
            .min(config.backoff_cap_ms),
    )
}

/// Where the client finds its bearer token. Backed by whatever local
/// storage the embedding frontend uses.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

pub struct StaticTokenProvider(pub String);

impl TokenProvider for StaticTokenProvider {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// The one reader task and the one pending reconnect timer. Never more
/// than one of each.
#[derive(Default)]
struct TaskSlots {
    reader: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
    attempt: u32,
}

struct Shared {
    transport: Arc<dyn StreamTransport>,
    tokens: Arc<dyn TokenProvider>,
    config: LiveClientConfig,
    bus: EventBus<ClientEvent>,
    state_tx: watch::Sender<StreamState>,
    tasks: StdMutex<TaskSlots>,
}

/// Cheaply cloneable handle to the per-process live stream client. All
/// clones share one connection and one reconnect schedule; lifecycle
/// operations are idempotent.
#[derive(Clone)]
pub struct LiveNotificationClient {
    shared: Arc<Shared>,
}

impl LiveNotificationClient {
    pub fn new(
        transport: Arc<dyn StreamTransport>,
        tokens: Arc<dyn TokenProvider>,
        config: LiveClientConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(StreamState::default());
        Self {
            shared: Arc::new(Shared {
                transport,
                tokens,
                config,
                bus: EventBus::new(64),
                state_tx,
                tasks: StdMutex::new(TaskSlots::default()),
            }),
        }
    }

    pub fn events(&self) -> &EventBus<ClientEvent> {
        &self.shared.bus
    }

    pub fn state(&self) -> watch::Receiver<StreamState> {
        self.shared.state_tx.subscribe()
    }

    /// Open (or re-open) the stream. Any pending reconnect timer and any
    /// existing reader are cancelled first, so there is never more than one
    /// connection attempt in flight.
    pub fn connect(&self) {
        let mut slots = self.shared.tasks.lock().unwrap();
        if let Some(timer) = slots.reconnect.take() {
            timer.abort();
        }
        if let Some(reader) = slots.reader.take() {
            reader.abort();
        }

        let this = self.clone();
        slots.reader = Some(tokio::spawn(async move { this.run_reader().await }));
    }

    /// Close the stream and cancel any pending reconnect. Safe to call when
    /// already disconnected.
    pub fn disconnect(&self) {
        {
            let mut slots = self.shared.tasks.lock().unwrap();
            if let Some(timer) = slots.reconnect.take() {
                timer.abort();
            }
            if let Some(reader) = slots.reader.take() {
                reader.abort();
            }
        }

        self.shared
            .state_tx
            .send_modify(|state| state.connected = false);
    }

    /// Logout/login cycle: tear the stream down and come back shortly with
    /// whatever token storage then holds.
    pub fn auth_changed(&self) {
        self.disconnect();

        let delay = Duration::from_millis(self.shared.config.auth_reconnect_delay_ms);
        let this = self.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.shared.tasks.lock().unwrap().attempt = 0;
            this.connect();
        });

        self.shared.tasks.lock().unwrap().reconnect = Some(timer);
    }

    async fn run_reader(self) {
        let Some(token) = self.shared.tokens.token() else {
            warn!("No auth token available, staying disconnected");
            self.shared.bus.publish(ClientEvent::Disconnected);
            return;
        };

        match self.shared.transport.open(&token).await {
            Ok(mut frames) => {
                self.shared.tasks.lock().unwrap().attempt = 0;
                self.shared.state_tx.send_modify(|state| {
                    state.connected = true;
                    state.reconnect_attempt = 0;
                });
                debug!("Notification stream open");

                while let Some(item) = frames.next().await {
                    match item {
                        Ok(frame) => self.handle_frame(frame),
                        Err(e) => {
                            warn!("Notification stream error: {e}");
                            break;
                        }
                    }
                }

                self.schedule_reconnect();
            }
            Err(e) => {
                warn!("Failed to open notification stream: {e}");
                self.schedule_reconnect();
            }
        }
    }

    fn handle_frame(&self, frame: StreamFrame) {
        match frame {
            StreamFrame::Connected => debug!("Stream handshake complete"),
            StreamFrame::Initial { unread_count } => {
                self.shared
                    .state_tx
                    .send_modify(|state| state.unread_count = unread_count.max(0) as u64);
            }
            StreamFrame::NewNotification { data } => {
                if !data.is_seen {
                    self.shared
                        .state_tx
                        .send_modify(|state| state.unread_count += 1);
                }
                self.shared.bus.publish(ClientEvent::Push(data));
            }
            StreamFrame::Heartbeat => {}
        }
    }

    fn schedule_reconnect(&self) {
        self.shared
            .state_tx
            .send_modify(|state| state.connected = false);

        let mut slots = self.shared.tasks.lock().unwrap();
        if slots.attempt >= self.shared.config.max_reconnect_attempts {
            warn!(
                "Giving up after {} reconnect attempts",
                self.shared.config.max_reconnect_attempts
            );
            drop(slots);
            self.shared.bus.publish(ClientEvent::Disconnected);
            return;
        }

        slots.attempt += 1;
        let attempt = slots.attempt;
        let delay = backoff_delay(&self.shared.config, attempt);
        self.shared
            .state_tx
            .send_modify(|state| state.reconnect_attempt = attempt);
        debug!("Reconnecting in {:?} (attempt {attempt})", delay);

        let this = self.clone();
        slots.reconnect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.connect();
        }));
    }
}
