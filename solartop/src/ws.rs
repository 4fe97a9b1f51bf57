//! Minimal WebSocket client helpers for talking to the charge controller server.

use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::warn;

use crate::types::Request;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Connect to the server and return the WS stream
pub async fn connect(url: &str) -> Result<WsStream, Error> {
    let (ws, _) = connect_async(url).await?;
    Ok(ws)
}

// Serialize and send one request frame. An encoding failure is logged and
// swallowed; only transport failures surface to the caller.
pub async fn send_request(ws: &mut WsStream, req: &Request) -> Result<(), Error> {
    let body = match serde_json::to_string(req) {
        Ok(body) => body,
        Err(e) => {
            warn!("failed to encode request {req:?}: {e}");
            return Ok(());
        }
    };
    ws.send(Message::Text(body)).await
}

// Re-export SinkExt for call sites
use futures_util::SinkExt;
