//! Connection lifecycle: connect, handshake, receive loop and the single send path

use crate::config::ConnectionConfig;
use crate::world::WorldStore;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{
    decode, encode_handshake, encode_intent, EncodeError, HandshakeInfo, InboundMessage, Intent,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;
type WsReader = SplitStream<WsStream>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Connecting,
    Handshaking,
    Active,
    Closed,
}

/// How an active session came to an end without a transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// A `Disconnect` intent was sent
    ClientQuit,
    /// Every session handle was dropped
    Abandoned,
    ServerClosed,
    EndOfStream,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
    #[error("failed to send message: {0}")]
    Send(#[source] tungstenite::Error),
    #[error("connection error: {0}")]
    Receive(#[source] tungstenite::Error),
    #[error("server did not answer a ping within {0:?}")]
    KeepAliveTimeout(Duration),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("session is not connected yet")]
    NotConnected,
    #[error("session is closed")]
    SessionClosed,
}

/// Cheap, cloneable view of a session for the frame loop
#[derive(Debug, Clone)]
pub struct SessionHandle {
    intents: mpsc::UnboundedSender<Intent>,
    status: watch::Receiver<SessionStatus>,
    decode_errors: Arc<AtomicU64>,
}

impl SessionHandle {
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Number of inbound messages skipped because they failed to decode
    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }

    /// Queues an intent for the network task. Never blocks.
    pub fn send_intent(&self, intent: Intent) -> Result<(), SendError> {
        match self.status() {
            SessionStatus::Active => self
                .intents
                .send(intent)
                .map_err(|_| SendError::SessionClosed),
            SessionStatus::Closed => Err(SendError::SessionClosed),
            SessionStatus::Idle | SessionStatus::Connecting | SessionStatus::Handshaking => {
                Err(SendError::NotConnected)
            }
        }
    }

    /// Resolves once the session reaches `target`. Returns false if the
    /// session ended without ever reaching it.
    pub async fn wait_for_status(&mut self, target: SessionStatus) -> bool {
        loop {
            let current = *self.status.borrow_and_update();
            if current == target {
                return true;
            }
            if current == SessionStatus::Closed || self.status.changed().await.is_err() {
                return *self.status.borrow() == target;
            }
        }
    }
}

/// Owns the socket and is the only writer of the world store
pub struct Synchronizer {
    config: ConnectionConfig,
    store: WorldStore,
    intents: mpsc::UnboundedReceiver<Intent>,
    status: watch::Sender<SessionStatus>,
    decode_errors: Arc<AtomicU64>,
}

impl Synchronizer {
    pub fn new(config: ConnectionConfig, store: WorldStore) -> (Self, SessionHandle) {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SessionStatus::Idle);
        let decode_errors = Arc::new(AtomicU64::new(0));

        let handle = SessionHandle {
            intents: intent_tx,
            status: status_rx,
            decode_errors: Arc::clone(&decode_errors),
        };

        let synchronizer = Synchronizer {
            config,
            store,
            intents: intent_rx,
            status: status_tx,
            decode_errors,
        };

        (synchronizer, handle)
    }

    /// Runs one session to completion. The status is `Closed` on return,
    /// whatever the outcome.
    pub async fn run(mut self) -> Result<SessionEnd, TransportError> {
        let result = self.connect_and_drive().await;
        self.set_status(SessionStatus::Closed);

        match &result {
            Ok(end) => info!("Session closed: {:?}", end),
            Err(e) => error!("Session failed: {}", e),
        }
        result
    }

    async fn connect_and_drive(&mut self) -> Result<SessionEnd, TransportError> {
        self.set_status(SessionStatus::Connecting);

        let url = self.config.url();
        info!("Connecting to {}", url);
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|source| TransportError::Connect { url, source })?;

        let (mut write, mut read) = ws_stream.split();
        let result = self.drive(&mut write, &mut read).await;

        // Nothing queued from here on would ever be sent.
        self.intents.close();
        self.set_status(SessionStatus::Closed);

        // Release the socket on every exit path.
        if let Err(e) = write.close().await {
            debug!("Error while closing connection: {}", e);
        }

        result
    }

    async fn drive(
        &mut self,
        write: &mut WsWriter,
        read: &mut WsReader,
    ) -> Result<SessionEnd, TransportError> {
        self.set_status(SessionStatus::Handshaking);
        let hello = encode_handshake(&HandshakeInfo {
            nickname: self.config.nickname.clone(),
            client_version: self.config.client_version.clone(),
        })?;
        write
            .send(Message::Text(hello))
            .await
            .map_err(TransportError::Send)?;
        info!("Handshake sent as {}", self.config.nickname);
        self.set_status(SessionStatus::Active);

        let ping_interval = self.config.ping_interval;
        let ping_timeout = self.config.ping_timeout;
        let mut keep_alive = interval_at(Instant::now() + ping_interval, ping_interval);
        keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Set while a ping is outstanding; any inbound frame clears it.
        let mut pong_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                frame = read.next() => {
                    if let Some(Ok(_)) = &frame {
                        pong_deadline = None;
                    }
                    match frame {
                        Some(Ok(Message::Text(text))) => self.handle_text(&text),
                        Some(Ok(Message::Close(frame))) => {
                            info!("Server closed connection: {:?}", frame);
                            return Ok(SessionEnd::ServerClosed);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(TransportError::Receive(e)),
                        None => return Ok(SessionEnd::EndOfStream),
                    }
                },

                _ = keep_alive.tick(), if pong_deadline.is_none() => {
                    debug!("Sending keep-alive ping");
                    write
                        .send(Message::Ping(Vec::new()))
                        .await
                        .map_err(TransportError::Send)?;
                    pong_deadline = Some(Instant::now() + ping_timeout);
                },

                _ = sleep_until(pong_deadline.unwrap_or_else(Instant::now)), if pong_deadline.is_some() => {
                    warn!("No answer to keep-alive ping in {:?}", ping_timeout);
                    return Err(TransportError::KeepAliveTimeout(ping_timeout));
                },

                intent = self.intents.recv() => match intent {
                    Some(Intent::Disconnect) => {
                        Self::send(write, &Intent::Disconnect).await?;
                        info!("Disconnect notice sent");
                        return Ok(SessionEnd::ClientQuit);
                    }
                    Some(intent) => Self::send(write, &intent).await?,
                    None => {
                        Self::send(write, &Intent::Disconnect).await?;
                        return Ok(SessionEnd::Abandoned);
                    }
                },
            }
        }
    }

    async fn send(write: &mut WsWriter, intent: &Intent) -> Result<(), TransportError> {
        let text = encode_intent(intent)?;
        debug!("Sending {}", text);
        write
            .send(Message::Text(text))
            .await
            .map_err(TransportError::Send)
    }

    /// Decodes and applies one inbound frame. A bad frame costs only itself.
    fn handle_text(&self, text: &str) {
        match decode(text) {
            Ok(message) => apply_message(&self.store, &self.config.nickname, message),
            Err(e) => {
                self.decode_errors.fetch_add(1, Ordering::Relaxed);
                warn!("Skipping server message: {}", e);
            }
        }
    }

    fn set_status(&self, status: SessionStatus) {
        let previous = self.status.send_replace(status);
        if previous != status {
            info!("Session status: {:?} -> {:?}", previous, status);
        }
    }
}

pub fn apply_message(store: &WorldStore, nickname: &str, message: InboundMessage) {
    match message {
        InboundMessage::WorldUpdate(update) => store.apply_world_update(&update),
        InboundMessage::ChatMessage(chat) => store.append_chat(&chat.sender, &chat.message),
        InboundMessage::EventNotification(event) => {
            debug!("Ignoring event notification: {:?}", event.payload);
        }
        InboundMessage::ConnectionAck(ack) => {
            let id = ack.your_id.unwrap_or_else(|| nickname.to_string());
            info!("Connection acknowledged as {}", id);
            store.ack_connection(&id);
        }
    }
}

/// Runs the synchronizer on its own thread and runtime so the frame loop
/// never waits on network I/O.
pub fn spawn(config: ConnectionConfig, store: WorldStore) -> std::io::Result<SessionHandle> {
    let (synchronizer, handle) = Synchronizer::new(config, store);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("network".to_string())
        .spawn(move || {
            // Errors are already logged by `run`.
            let _ = runtime.block_on(synchronizer.run());
        })?;

    Ok(handle)
}

#[cfg(test)]
pub(crate) fn test_session(
    status: SessionStatus,
) -> (
    SessionHandle,
    mpsc::UnboundedReceiver<Intent>,
    watch::Sender<SessionStatus>,
) {
    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(status);
    let handle = SessionHandle {
        intents: intent_tx,
        status: status_rx,
        decode_errors: Arc::new(AtomicU64::new(0)),
    };
    (handle, intent_rx, status_tx)
}
