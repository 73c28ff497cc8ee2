//! Realtime websocket client
//!
//! 1. Connect to the realtime endpoint
//! 2. Join one channel per table (`postgres_changes` config)
//! 3. Heartbeat on a fixed interval
//! 4. Decode change frames into the broadcast feed
//! 5. Reconnect with exponential backoff on disconnect

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::{SinkExt, StreamExt};
use shared::ChangeEvent;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::frame::Frame;
use super::{ChangeFeed, ChangeSubscription, FEED_CAPACITY};
use crate::ClientConfig;
use crate::http::TokenSlot;

/// Initial reconnect delay
const INITIAL_RETRY_DELAY_SECS: u64 = 1;
/// Max reconnect delay
const MAX_RECONNECT_DELAY_SECS: u64 = 60;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// Websocket change feed
///
/// Owns one background task; the task stops on [`RealtimeSocket::shutdown`] or
/// when the socket is dropped.
///
/// Update events carry the previous row only as far as the table's replica
/// identity allows. Tables whose consumers diff old against new (`shipments`)
/// need `ALTER TABLE .. REPLICA IDENTITY FULL` on the backend.
pub struct RealtimeSocket {
    events: broadcast::Sender<ChangeEvent>,
    status: watch::Receiver<SocketStatus>,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RealtimeSocket {
    /// Spawn the socket worker for `tables`
    pub fn spawn(config: &ClientConfig, token: TokenSlot, tables: &[&str]) -> Self {
        let (events, _) = broadcast::channel(FEED_CAPACITY);
        let (status_tx, status) = watch::channel(SocketStatus::Connecting);
        let shutdown = CancellationToken::new();

        let worker = SocketWorker {
            url: config.realtime_url(),
            tables: tables.iter().map(|t| t.to_string()).collect(),
            token,
            heartbeat: config.heartbeat_interval(),
            events: events.clone(),
            status: status_tx,
            shutdown: shutdown.clone(),
            refs: Arc::new(AtomicU64::new(1)),
        };
        let handle = tokio::spawn(worker.run());

        Self {
            events,
            status,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn status(&self) -> SocketStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<SocketStatus> {
        self.status.clone()
    }

    /// Stop the worker and wait for it to exit
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl ChangeFeed for RealtimeSocket {
    fn subscribe(&self, table: &str) -> ChangeSubscription {
        ChangeSubscription::new(table, self.events.subscribe())
    }
}

impl Drop for RealtimeSocket {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct SocketWorker {
    url: String,
    tables: Vec<String>,
    token: TokenSlot,
    heartbeat: Duration,
    events: broadcast::Sender<ChangeEvent>,
    status: watch::Sender<SocketStatus>,
    shutdown: CancellationToken,
    refs: Arc<AtomicU64>,
}

impl SocketWorker {
    fn next_ref(&self) -> u64 {
        self.refs.fetch_add(1, Ordering::Relaxed)
    }

    /// Main run loop: connect, run the session, reconnect on failure
    async fn run(self) {
        tracing::info!(tables = ?self.tables, "realtime socket started");
        let mut reconnect_delay = Duration::from_secs(INITIAL_RETRY_DELAY_SECS);

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            let _ = self.status.send(SocketStatus::Connecting);

            let connected = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = tokio_tungstenite::connect_async(self.url.as_str()) => result,
            };
            match connected {
                Ok((ws, _response)) => {
                    reconnect_delay = Duration::from_secs(INITIAL_RETRY_DELAY_SECS);
                    let _ = self.status.send(SocketStatus::Connected);
                    self.run_session(ws).await;
                }
                Err(e) => {
                    tracing::warn!(
                        delay_secs = reconnect_delay.as_secs(),
                        "realtime connection failed: {e}"
                    );
                }
            }
            let _ = self.status.send(SocketStatus::Disconnected);

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(reconnect_delay) => {},
            }
            reconnect_delay =
                (reconnect_delay * 2).min(Duration::from_secs(MAX_RECONNECT_DELAY_SECS));
        }

        let _ = self.status.send(SocketStatus::Disconnected);
        tracing::info!("realtime socket stopped");
    }

    /// Run one connection until disconnect or shutdown
    async fn run_session<S>(&self, ws: S)
    where
        S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
            + futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
            + Unpin,
    {
        let (mut ws_sink, mut ws_stream) = ws.split();

        let token = self.token.get();
        for table in &self.tables {
            let join = Frame::join(table, token.as_deref(), self.next_ref());
            if let Err(e) = send_frame(&mut ws_sink, &join).await {
                tracing::warn!(%table, "realtime join failed: {e}");
                return;
            }
        }
        let mut sent_token = token;

        let mut heartbeat = tokio::time::interval(self.heartbeat);
        heartbeat.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = ws_sink.close().await;
                    return;
                }

                _ = heartbeat.tick() => {
                    if send_frame(&mut ws_sink, &Frame::heartbeat(self.next_ref())).await.is_err() {
                        tracing::warn!("realtime heartbeat failed, disconnecting");
                        return;
                    }
                    // Forward a rotated access token to the joined channels
                    let current = self.token.get();
                    if current != sent_token {
                        if let Some(token) = current.as_deref() {
                            for table in &self.tables {
                                let frame = Frame::access_token(table, token, self.next_ref());
                                let _ = send_frame(&mut ws_sink, &frame).await;
                            }
                        }
                        sent_token = current;
                    }
                }

                msg = ws_stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => self.handle_text(text.as_str()),
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_sink.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("realtime socket closed by server");
                            return;
                        }
                        Some(Err(e)) => {
                            tracing::warn!("realtime socket error: {e}");
                            return;
                        }
                        None => {
                            tracing::info!("realtime stream ended");
                            return;
                        }
                        _ => {} // Binary, Pong
                    }
                }
            }
        }
    }

    fn handle_text(&self, text: &str) {
        let frame = match Frame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("{e}");
                return;
            }
        };
        if frame.is_channel_error() {
            tracing::warn!(topic = %frame.topic, payload = %frame.payload, "realtime channel error");
            return;
        }
        if let Some(event) = frame.change_event() {
            tracing::debug!(table = %event.table, kind = %event.kind, "realtime change");
            let _ = self.events.send(event);
        }
    }
}

async fn send_frame<S>(sink: &mut S, frame: &Frame) -> Result<(), String>
where
    S: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let text = frame.to_text().map_err(|e| e.to_string())?;
    sink.send(Message::Text(text.into()))
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_without_server() {
        // Nothing listens on port 9; the worker keeps retrying until cancelled
        let config = ClientConfig::new("http://127.0.0.1:9", "anon");
        let socket = RealtimeSocket::spawn(&config, TokenSlot::default(), &["shipments"]);
        let mut status = socket.watch_status();
        let _ = tokio::time::timeout(Duration::from_secs(2), status.changed()).await;
        assert_ne!(socket.status(), SocketStatus::Connected);
        tokio::time::timeout(Duration::from_secs(2), socket.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_zero_heartbeat_keeps_worker_alive() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            while let Some(Ok(msg)) = ws.next().await {
                if let Message::Text(text) = msg {
                    let _ = seen_tx.send(text.as_str().to_string());
                }
            }
        });

        let mut config = ClientConfig::new(format!("http://{addr}"), "anon");
        config.heartbeat_secs = 0;
        let socket = RealtimeSocket::spawn(&config, TokenSlot::default(), &["shipments"]);

        // join frame, then a heartbeat on the clamped one-second interval
        let heartbeat = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(text) = seen_rx.recv().await {
                if Frame::parse(&text).is_ok_and(|f| f.topic == "phoenix") {
                    return true;
                }
            }
            false
        })
        .await
        .unwrap();
        assert!(heartbeat);
        assert_eq!(socket.status(), SocketStatus::Connected);
        assert!(!socket.handle.as_ref().unwrap().is_finished());

        tokio::time::timeout(Duration::from_secs(2), socket.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_handle_text_publishes_changes() {
        let (events, mut rx) = broadcast::channel(8);
        let (status, _) = watch::channel(SocketStatus::Connected);
        let worker = SocketWorker {
            url: String::new(),
            tables: vec!["shipments".into()],
            token: TokenSlot::default(),
            heartbeat: Duration::from_secs(30),
            events,
            status,
            shutdown: CancellationToken::new(),
            refs: Arc::new(AtomicU64::new(1)),
        };
        worker.handle_text(
            r#"{"topic":"realtime:public:shipments","event":"postgres_changes","payload":{"data":{"table":"shipments","type":"INSERT","record":{"id":"s-9"}}},"ref":null}"#,
        );
        worker.handle_text("garbage");
        let event = rx.try_recv().unwrap();
        assert_eq!(event.field_str("id"), Some("s-9"));
        assert!(rx.try_recv().is_err());
    }
}
