use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::session::PageInfo;
use crate::error::{FingyError, Result};

type CdpSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A page target driven over its own CDP WebSocket
pub struct CdpPage {
    info: PageInfo,
    ws: Mutex<CdpSocket>,
    next_id: AtomicU64,
}

impl CdpPage {
    pub async fn attach(info: PageInfo) -> Result<Self> {
        let url = info.web_socket_debugger_url.clone().ok_or_else(|| {
            FingyError::CdpConnectionFailed(format!(
                "Page {} has no WebSocket debugger URL (already attached elsewhere?)",
                info.id
            ))
        })?;

        let (ws, _) = connect_async(url.as_str()).await.map_err(|e| {
            FingyError::CdpConnectionFailed(format!("Cannot connect to page at {}: {}", url, e))
        })?;

        Ok(Self {
            info,
            ws: Mutex::new(ws),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn info(&self) -> &PageInfo {
        &self.info
    }

    /// Send a CDP command and wait for the response carrying its id.
    ///
    /// Events arriving in between are skipped.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let msg = serde_json::json!({
            "id": id,
            "method": method,
            "params": params,
        });

        let mut ws = self.ws.lock().await;
        ws.send(Message::Text(msg.to_string().into()))
            .await
            .map_err(|e| FingyError::CdpConnectionFailed(format!("Send failed: {}", e)))?;

        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    let resp: Value = serde_json::from_str(text.as_str())?;
                    if resp.get("id").and_then(Value::as_u64) != Some(id) {
                        continue;
                    }
                    return command_result(resp);
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    return Err(FingyError::CdpConnectionFailed(format!(
                        "WebSocket error: {}",
                        e
                    )));
                }
            }
        }

        Err(FingyError::CdpConnectionFailed(format!(
            "Connection closed before {} returned",
            method
        )))
    }

    /// Evaluate an expression in the page, awaiting promises, and return its value
    pub async fn evaluate(&self, expression: &str) -> Result<Value> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                serde_json::json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;
        evaluation_value(result)
    }

    /// Poll `document.readyState` until the page has loaded
    pub async fn wait_for_load(&self, limit: Duration) -> Result<()> {
        let waited = tokio::time::timeout(limit, async {
            loop {
                let state = self.evaluate("document.readyState").await?;
                if state.as_str() == Some("complete") {
                    return Ok::<(), FingyError>(());
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
        .await;

        match waited {
            Ok(result) => result,
            Err(_) => Err(FingyError::Timeout(format!(
                "Page {} did not finish loading",
                self.info.url
            ))),
        }
    }

    /// Close the page WebSocket
    pub async fn detach(self) {
        let mut ws = self.ws.into_inner();
        if let Err(e) = ws.close(None).await {
            tracing::debug!("Closing page socket failed: {}", e);
        }
    }
}

fn command_result(resp: Value) -> Result<Value> {
    if let Some(error) = resp.get("error") {
        return Err(FingyError::CdpConnectionFailed(
            error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown CDP error")
                .to_string(),
        ));
    }
    Ok(resp.get("result").cloned().unwrap_or(Value::Null))
}

/// Pull the returned value out of a `Runtime.evaluate` result
fn evaluation_value(result: Value) -> Result<Value> {
    if let Some(exception) = result.get("exceptionDetails") {
        let msg = exception
            .get("exception")
            .and_then(|e| e.get("description"))
            .or_else(|| exception.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("JavaScript exception");
        return Err(FingyError::JavaScriptError(msg.to_string()));
    }

    Ok(result
        .get("result")
        .and_then(|r| r.get("value"))
        .cloned()
        .unwrap_or(Value::Null))
}
