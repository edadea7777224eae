use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{Connector, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shared::message::{ClientMessage, CommentEvent};
use shared::models::LeadId;

use crate::message::{PushConfig, PushError};
use crate::session::Session;

/// Push Client
///
/// WebSocket connection to the comment push server. A background task owns
/// the socket: it writes queued room messages, answers pings and fans comment
/// events out on a broadcast bus.
#[derive(Debug, Clone)]
pub struct PushClient {
    outgoing: mpsc::UnboundedSender<Message>,
    /// Kept only to hand out fresh receivers; the connection task owns the sender
    events: Arc<broadcast::Receiver<CommentEvent>>,
    connected: Arc<AtomicBool>,
    shutdown: CancellationToken,
    config: PushConfig,
}

impl PushClient {
    /// Connect using the push URL of a [`crate::ClientConfig`]
    pub async fn from_config(
        config: &crate::ClientConfig,
        push: PushConfig,
        session: &Session,
    ) -> Result<Self, PushError> {
        let url = config
            .push_url
            .as_deref()
            .ok_or_else(|| PushError::Connection("push url is not configured".into()))?;
        Self::connect(url, push, session).await
    }

    /// Open the WebSocket at `url` (`ws`, `wss`, `http` or `https`)
    ///
    /// The session's bearer token goes in the `Authorization` header of the
    /// upgrade request.
    pub async fn connect(url: &str, push: PushConfig, session: &Session) -> Result<Self, PushError> {
        let request = upgrade_request(url, &push, session)?;
        let connector = Connector::Rustls(Arc::new(tls_config()?));

        let connecting =
            tokio_tungstenite::connect_async_tls_with_config(request, None, false, Some(connector));
        let (ws, _response) = match tokio::time::timeout(push.connect_timeout, connecting).await {
            Ok(result) => result.map_err(|e| {
                if let tungstenite::Error::Http(ref resp) = e {
                    let status = resp.status().as_u16();
                    if status == 401 || status == 403 {
                        return PushError::Unauthorized(status);
                    }
                }
                PushError::WebSocket(e)
            })?,
            Err(_) => {
                return Err(PushError::Timeout(format!(
                    "no handshake from {url} within {:?}",
                    push.connect_timeout
                )));
            }
        };

        info!(url, "push channel connected");
        Ok(Self::from_stream(ws, push))
    }

    /// Wrap an already upgraded WebSocket
    pub fn from_stream<S>(ws: WebSocketStream<S>, config: PushConfig) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (event_tx, event_rx) = broadcast::channel(config.event_capacity);
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));
        let shutdown = CancellationToken::new();

        tokio::spawn(run_connection(
            ws,
            outgoing_rx,
            event_tx,
            shutdown.clone(),
            connected.clone(),
            config.ping_interval,
        ));

        Self {
            outgoing: outgoing_tx,
            events: Arc::new(event_rx),
            connected,
            shutdown,
            config,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// Subscribe to every comment event (events after this call only)
    pub fn subscribe(&self) -> broadcast::Receiver<CommentEvent> {
        self.events.resubscribe()
    }

    /// Queue a message as a JSON text frame
    pub fn send(&self, msg: &ClientMessage) -> Result<(), PushError> {
        if !self.is_connected() {
            return Err(PushError::Closed);
        }
        let json = serde_json::to_string(msg)?;
        self.outgoing
            .send(Message::Text(json.into()))
            .map_err(|_| PushError::Closed)
    }

    /// Join a lead's room
    ///
    /// The event receiver is created before the join is queued, so no event
    /// the server sends after handling the join can be missed.
    pub fn join_room(&self, lead_id: LeadId) -> Result<RoomSubscription, PushError> {
        let events = self.subscribe();
        self.send(&ClientMessage::join_room(lead_id))?;

        info!(lead_id, "joined comment room");
        Ok(RoomSubscription {
            lead_id,
            client: self.clone(),
            events,
            released: false,
        })
    }

    /// Leave a lead's room (fire and forget)
    pub fn leave_room(&self, lead_id: LeadId) -> Result<(), PushError> {
        self.send(&ClientMessage::leave_room(lead_id))?;
        info!(lead_id, "left comment room");
        Ok(())
    }

    /// Close the connection
    ///
    /// Messages queued before this call are still written.
    pub fn close(&self) {
        self.shutdown.cancel();
    }
}

fn upgrade_request(
    url: &str,
    push: &PushConfig,
    session: &Session,
) -> Result<tungstenite::http::Request<()>, PushError> {
    // The backend URL may be configured with its REST scheme
    let url = url
        .replacen("https://", "wss://", 1)
        .replacen("http://", "ws://", 1);

    let host = url
        .split("://")
        .nth(1)
        .and_then(|s| s.split('/').next())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| PushError::Connection(format!("invalid push url: {url}")))?;

    let mut builder = tungstenite::http::Request::builder()
        .uri(&url)
        .header("Host", host)
        .header("Connection", "Upgrade")
        .header("Upgrade", "websocket")
        .header("Sec-WebSocket-Version", "13")
        .header(
            "Sec-WebSocket-Key",
            tungstenite::handshake::client::generate_key(),
        )
        .header(
            "User-Agent",
            format!("{}/{}", push.client_name, env!("CARGO_PKG_VERSION")),
        );
    if let Some(token) = session.token() {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    builder
        .body(())
        .map_err(|e| PushError::Connection(format!("invalid push url {url}: {e}")))
}

/// Public roots for `wss` endpoints
fn tls_config() -> Result<rustls::ClientConfig, PushError> {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| PushError::Connection(format!("TLS setup failed: {e}")))?
    .with_root_certificates(roots)
    .with_no_client_auth();
    Ok(config)
}

async fn run_connection<S>(
    ws: WebSocketStream<S>,
    mut outgoing: mpsc::UnboundedReceiver<Message>,
    events: broadcast::Sender<CommentEvent>,
    shutdown: CancellationToken,
    connected: Arc<AtomicBool>,
    ping_interval: Duration,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut ws_sink, mut ws_stream) = ws.split();
    let mut ping = tokio::time::interval(ping_interval);
    ping.tick().await;

    loop {
        tokio::select! {
            // Queued room messages go out before a requested close
            biased;

            msg = outgoing.recv() => match msg {
                Some(msg) => {
                    if let Err(e) = ws_sink.send(msg).await {
                        warn!(error = %e, "push channel write failed");
                        break;
                    }
                }
                None => {
                    let _ = ws_sink.close().await;
                    break;
                }
            },

            _ = shutdown.cancelled() => {
                let _ = ws_sink.close().await;
                info!("push channel closed");
                break;
            }

            incoming = ws_stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => dispatch(text.as_str(), &events),
                Some(Ok(Message::Ping(data))) => {
                    let _ = ws_sink.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) => {
                    info!("push channel closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "push channel read error");
                    break;
                }
                None => {
                    info!("push channel stream ended");
                    break;
                }
            },

            _ = ping.tick() => {
                if let Err(e) = ws_sink.send(Message::Ping(vec![].into())).await {
                    warn!(error = %e, "push channel ping failed");
                    break;
                }
            }
        }
    }

    // Dropping `events` here wakes every subscriber with `Closed`
    connected.store(false, Ordering::SeqCst);
}

fn dispatch(text: &str, events: &broadcast::Sender<CommentEvent>) {
    match serde_json::from_str::<CommentEvent>(text) {
        Ok(event) => {
            if events.send(event).is_err() {
                debug!("no subscribers for push event");
            }
        }
        Err(e) => debug!(error = %e, "ignoring unrecognised push frame"),
    }
}

/// Membership in one lead's room
///
/// Call [`RoomSubscription::release`] when the lead view closes. An
/// unreleased subscription queues the leave from its `Drop`.
#[derive(Debug)]
pub struct RoomSubscription {
    lead_id: LeadId,
    client: PushClient,
    events: broadcast::Receiver<CommentEvent>,
    released: bool,
}

impl RoomSubscription {
    pub fn lead_id(&self) -> LeadId {
        self.lead_id
    }

    /// Next comment event for this room
    ///
    /// Events for other rooms are skipped. Returns `Closed` once the
    /// connection is gone.
    pub async fn recv(&mut self) -> Result<CommentEvent, PushError> {
        loop {
            match self.events.recv().await {
                Ok(event) if event.lead_id() == self.lead_id => return Ok(event),
                Ok(event) => {
                    debug!(
                        lead_id = self.lead_id,
                        other = event.lead_id(),
                        "ignoring event for another room"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(lead_id = self.lead_id, skipped = n, "comment events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(PushError::Closed),
            }
        }
    }

    /// Leave the room
    pub fn release(mut self) -> Result<(), PushError> {
        self.released = true;
        self.client.leave_room(self.lead_id)
    }
}

impl Drop for RoomSubscription {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.client.leave_room(self.lead_id) {
            debug!(lead_id = self.lead_id, error = %e, "leave on drop failed");
        }
    }
}
