//! Socket abstraction for the real-time channel.
//!
//! The session driver talks to a [`GameSocket`] rather than a concrete
//! WebSocket so that the full session flow can be driven by a scripted fake
//! in tests. Production uses [`WsSocket`], a tokio-tungstenite connection
//! negotiated with the STOMP sub-protocols.

use std::io;

use async_trait::async_trait;
use futures::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, client::IntoClientRequest, http::HeaderValue, protocol::Message},
};
use tracing::debug;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Inbound socket event, as the session driver sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// A text payload (STOMP frame data or heartbeat).
    Text(String),
    /// Socket-level failure.
    Failed(String),
    /// Peer closed the connection.
    Closed,
}

/// A bidirectional text socket carrying STOMP traffic.
#[async_trait]
pub trait GameSocket: Send {
    /// Send one text payload.
    async fn send(&mut self, text: String) -> io::Result<()>;

    /// Next inbound event; `None` once the stream has ended.
    async fn recv(&mut self) -> Option<SocketEvent>;

    /// Close the socket, best-effort.
    async fn close(&mut self);
}

/// STOMP sub-protocol versions offered during the WebSocket upgrade.
pub const STOMP_SUBPROTOCOLS: &str = "v12.stomp, v11.stomp, v10.stomp";

/// Production WebSocket over tokio-tungstenite.
pub struct WsSocket {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
}

impl WsSocket {
    /// Open a WebSocket to the realtime endpoint, negotiating the STOMP
    /// sub-protocols.
    pub async fn connect(url: &str) -> io::Result<Self> {
        let mut request = url.into_client_request().map_err(io::Error::other)?;
        request
            .headers_mut()
            .insert("sec-websocket-protocol", HeaderValue::from_static(STOMP_SUBPROTOCOLS));

        let (stream, response) = connect_async(request).await.map_err(io::Error::other)?;
        debug!(url, status = %response.status(), "websocket open");

        let (write, read) = stream.split();
        Ok(Self { write, read })
    }
}

#[async_trait]
impl GameSocket for WsSocket {
    async fn send(&mut self, text: String) -> io::Result<()> {
        self.write.send(Message::Text(text.into())).await.map_err(io::Error::other)
    }

    async fn recv(&mut self) -> Option<SocketEvent> {
        loop {
            match self.read.next().await {
                Some(Ok(Message::Text(text))) => return Some(SocketEvent::Text(text.to_string())),
                Some(Ok(Message::Close(_))) => return Some(SocketEvent::Closed),
                // Ping/pong are answered by tungstenite; binary is not part
                // of this protocol.
                Some(Ok(_)) => {},
                Some(Err(tungstenite::Error::ConnectionClosed)) | None => return None,
                Some(Err(err)) => return Some(SocketEvent::Failed(err.to_string())),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.write.close().await;
    }
}
