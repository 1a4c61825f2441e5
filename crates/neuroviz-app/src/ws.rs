//! WebSocket driver.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};

use crate::Driver;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Errors from the WebSocket driver.
#[derive(Error, Debug)]
pub enum WsError {
    /// Handshake or socket I/O failed.
    #[error("websocket error: {0}")]
    Socket(#[from] tungstenite::Error),

    /// Send attempted without an open socket.
    #[error("not connected")]
    NotConnected,
}

/// [`Driver`] over a single tokio-tungstenite WebSocket.
#[derive(Default)]
pub struct WsDriver {
    socket: Option<Socket>,
}

impl WsDriver {
    /// Driver with no socket.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for WsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsDriver").field("connected", &self.socket.is_some()).finish()
    }
}

impl Driver for WsDriver {
    type Error = WsError;

    async fn connect(&mut self, url: &str) -> Result<(), Self::Error> {
        let (socket, response) = connect_async(url).await?;
        tracing::debug!(%url, status = %response.status(), "websocket handshake complete");
        self.socket = Some(socket);
        Ok(())
    }

    async fn send_text(&mut self, text: String) -> Result<(), Self::Error> {
        let socket = self.socket.as_mut().ok_or(WsError::NotConnected)?;
        socket.send(Message::text(text)).await?;
        Ok(())
    }

    async fn recv_frame(&mut self) -> Option<Result<String, Self::Error>> {
        loop {
            let socket = self.socket.as_mut()?;
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text.as_str().to_owned())),
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "server closed websocket");
                    self.socket = None;
                    return None;
                },
                // Control and binary frames carry nothing for the session
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    self.socket = None;
                    return Some(Err(e.into()));
                },
                None => {
                    self.socket = None;
                    return None;
                },
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            if let Err(e) = socket.close(None).await {
                tracing::debug!(error = %e, "websocket close handshake failed");
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }
}
