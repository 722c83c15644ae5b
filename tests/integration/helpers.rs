//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use carehub_api::state::AppState;
use carehub_core::config::AppConfig;
use carehub_entity::identity::{Identity, UserRole};
use carehub_realtime::connection::authenticator::TokenAuthenticator;
use carehub_realtime::engine::RealtimeEngine;
use carehub_realtime::message::types::{ClientEvent, ServerEvent};
use carehub_store::{MemoryChatStore, MemoryMeetingStore};

/// A running server on an ephemeral port.
pub struct TestServer {
    /// Bound address.
    pub addr: SocketAddr,
    /// The state behind the router, for direct assertions.
    pub state: AppState,
}

impl TestServer {
    /// Start a server with the default test configuration (no token
    /// requirement, ring timeout disabled).
    pub async fn start() -> Self {
        let mut config = AppConfig::default();
        config.realtime.answer_timeout_seconds = 0;
        Self::start_with(config).await
    }

    /// Start a server with a specific configuration.
    pub async fn start_with(config: AppConfig) -> Self {
        let engine = Arc::new(RealtimeEngine::new(
            config.realtime.clone(),
            Arc::new(MemoryChatStore::new()),
            Arc::new(MemoryMeetingStore::new()),
        ));
        let authenticator = Arc::new(TokenAuthenticator::new(&config.auth));
        let state = AppState {
            config: Arc::new(config),
            engine,
            authenticator,
        };

        let router = carehub_api::router::build_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });

        Self { addr, state }
    }

    /// Build a router without binding, for request-level tests.
    pub fn router(&self) -> axum::Router {
        carehub_api::router::build_router(self.state.clone())
    }

    /// Open a WebSocket client against `/ws`.
    pub async fn client(&self) -> WsClient {
        WsClient::connect(&format!("ws://{}/ws", self.addr)).await
    }

    /// Open a WebSocket client with an access token.
    pub async fn client_with_token(&self, token: &str) -> WsClient {
        WsClient::connect(&format!("ws://{}/ws?token={token}", self.addr)).await
    }
}

/// A connected WebSocket test client.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Connect to a WebSocket URL.
    pub async fn connect(url: &str) -> Self {
        let (stream, _response) = connect_async(url).await.expect("WebSocket connect failed");
        Self { stream }
    }

    /// Send one client event as a text frame.
    pub async fn send(&mut self, event: &ClientEvent) {
        let json = serde_json::to_string(event).expect("serialize event");
        self.stream
            .send(Message::Text(json.into()))
            .await
            .expect("send frame");
    }

    /// Send a raw text frame (for malformed-payload tests).
    pub async fn raw_send(&mut self, text: &str) {
        self.stream
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("send frame");
    }

    /// Receive the next server event, failing after two seconds.
    pub async fn recv(&mut self) -> ServerEvent {
        timeout(Duration::from_secs(2), async {
            loop {
                match self.stream.next().await.expect("stream closed") {
                    Ok(Message::Text(text)) => {
                        return serde_json::from_str(&text).expect("parse server event")
                    }
                    Ok(_) => continue,
                    Err(e) => panic!("WebSocket error: {e}"),
                }
            }
        })
        .await
        .expect("timed out waiting for server event")
    }

    /// Assert no event arrives within 300 ms.
    pub async fn assert_silent(&mut self) {
        let got = timeout(Duration::from_millis(300), self.stream.next()).await;
        if let Ok(Some(Ok(Message::Text(text)))) = got {
            panic!("expected silence, got: {text}");
        }
    }

    /// Announce an identity and wait for the ack.
    pub async fn join(&mut self, user_id: &str, role: UserRole) -> Identity {
        let identity = Identity::new(user_id, role, user_id.to_uppercase());
        self.send(&ClientEvent::Join {
            identity: identity.clone(),
        })
        .await;
        match self.recv().await {
            ServerEvent::Joined { identity } => identity,
            other => panic!("expected joined ack, got: {other:?}"),
        }
    }

    /// Close the connection.
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
