// WebSocket client utilities for testing

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// WebSocket test client
pub struct WebSocketClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketClient {
    /// Connect to a WebSocket endpoint, retrying until success or timeout.
    pub async fn connect_retry(
        url: &str,
        timeout: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let start = tokio::time::Instant::now();
        loop {
            match connect_async(url).await {
                Ok((stream, _)) => return Ok(Self { stream }),
                Err(err) => {
                    if start.elapsed() >= timeout {
                        return Err(Box::new(err));
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            }
        }
    }

    /// Send one client command as a JSON text frame.
    pub async fn send(&mut self, msg: &Value) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.send(Message::text(msg.to_string())).await?;
        Ok(())
    }

    /// Send a raw text frame (for malformed-payload tests).
    pub async fn send_raw(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.send(Message::text(text)).await?;
        Ok(())
    }

    /// Parse the next text frame as JSON, skipping control frames.
    /// Returns `None` once the connection closes.
    pub async fn recv_json_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Value>, Box<dyn std::error::Error>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let next = tokio::time::timeout(remaining, self.stream.next())
                .await
                .map_err(|_| "Timeout waiting for message")?;
            match next.transpose()? {
                Some(Message::Text(text)) => return Ok(Some(serde_json::from_str(&text)?)),
                Some(Message::Close(_)) | None => return Ok(None),
                Some(_) => continue,
            }
        }
    }

    /// Receive the next event and assert its `type` tag.
    pub async fn recv_event(
        &mut self,
        expected_type: &str,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        let msg = self
            .recv_json_timeout(Duration::from_secs(2))
            .await?
            .ok_or_else(|| format!("connection closed while waiting for {expected_type}"))?;
        if msg["type"] != expected_type {
            return Err(format!("expected {expected_type}, got {msg}").into());
        }
        Ok(msg)
    }

    /// Close the connection
    pub async fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.close(None).await?;
        Ok(())
    }
}
