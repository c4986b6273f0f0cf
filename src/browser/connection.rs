// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DevTools protocol connection
//!
//! JSON-RPC over a websocket: commands carry an increasing `id` and the
//! reply with the same `id` completes a oneshot; messages with a `method`
//! and no `id` are events and go to the event handler.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex as TokioMutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::{Error, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Callbacks = Mutex<HashMap<u64, oneshot::Sender<Result<Value>>>>;

/// Receives `(method, params)` for every protocol event
pub type EventHandler = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// An open DevTools session for one target
pub struct Connection {
    last_id: AtomicU64,
    callbacks: Arc<Callbacks>,
    sender: TokioMutex<SplitSink<WsStream, Message>>,
    reader: JoinHandle<()>,
    command_timeout: Duration,
}

impl Connection {
    /// Connect to a target's websocket debugger URL
    pub async fn connect(
        ws_url: &str,
        on_event: EventHandler,
        command_timeout: Duration,
    ) -> Result<Self> {
        let (stream, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| Error::Transport(format!("WebSocket connection failed: {}", e)))?;
        let (sender, mut receiver) = stream.split();

        let callbacks: Arc<Callbacks> = Arc::default();
        let pending = callbacks.clone();

        let reader = tokio::spawn(async move {
            while let Some(message) = receiver.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<Value>(&text) {
                        Ok(value) => dispatch(&pending, on_event.as_ref(), value),
                        Err(e) => tracing::warn!(error = %e, "Malformed DevTools message"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(error = %e, "DevTools socket error");
                        break;
                    }
                }
            }

            tracing::debug!("DevTools message loop ended");
            fail_pending(&pending);
        });

        tracing::debug!(url = ws_url, "DevTools session opened");

        Ok(Self {
            last_id: AtomicU64::new(0),
            callbacks,
            sender: TokioMutex::new(sender),
            reader,
            command_timeout,
        })
    }

    /// Send a command and wait for its result
    pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = oneshot::channel();
        self.callbacks.lock().insert(id, tx);

        let payload = json!({ "id": id, "method": method, "params": params });
        tracing::trace!(id, method, "DevTools command");

        let sent = self
            .sender
            .lock()
            .await
            .send(Message::Text(payload.to_string().into()))
            .await;
        if let Err(e) = sent {
            self.callbacks.lock().remove(&id);
            return Err(Error::Transport(format!("Failed to send {}: {}", method, e)));
        }

        match tokio::time::timeout(self.command_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::BrowserClosed),
            Err(_) => {
                self.callbacks.lock().remove(&id);
                Err(Error::timeout(
                    method,
                    self.command_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Whether the message loop is still running
    pub fn is_open(&self) -> bool {
        !self.reader.is_finished()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Route one decoded message to its pending command or to the event handler
fn dispatch(callbacks: &Callbacks, on_event: &(dyn Fn(&str, &Value) + Send + Sync), message: Value) {
    if let Some(id) = message.get("id").and_then(Value::as_u64) {
        let callback = match callbacks.lock().remove(&id) {
            Some(callback) => callback,
            None => {
                tracing::trace!(id, "Reply for unknown command");
                return;
            }
        };

        let result = match message.get("error") {
            Some(error) => Err(protocol_error(error)),
            None => Ok(message.get("result").cloned().unwrap_or(Value::Null)),
        };
        let _ = callback.send(result);
    } else if let Some(method) = message.get("method").and_then(Value::as_str) {
        let params = message.get("params").unwrap_or(&Value::Null);
        on_event(method, params);
    }
}

fn protocol_error(error: &Value) -> Error {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    match error.get("code").and_then(Value::as_i64) {
        Some(code) => Error::Protocol(format!("{} (code {})", message, code)),
        None => Error::Protocol(message.to_string()),
    }
}

fn fail_pending(callbacks: &Callbacks) {
    for (_, callback) in callbacks.lock().drain() {
        let _ = callback.send(Err(Error::BrowserClosed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_events() -> impl Fn(&str, &Value) + Send + Sync {
        |method: &str, _: &Value| panic!("unexpected event {}", method)
    }

    #[test]
    fn test_reply_completes_callback() {
        let callbacks = Callbacks::default();
        let (tx, mut rx) = oneshot::channel();
        callbacks.lock().insert(7, tx);

        dispatch(&callbacks, &no_events(), json!({ "id": 7, "result": { "frameId": "F1" } }));

        let value = rx.try_recv().unwrap().unwrap();
        assert_eq!(value["frameId"], "F1");
        assert!(callbacks.lock().is_empty());
    }

    #[test]
    fn test_error_reply() {
        let callbacks = Callbacks::default();
        let (tx, mut rx) = oneshot::channel();
        callbacks.lock().insert(1, tx);

        dispatch(
            &callbacks,
            &no_events(),
            json!({ "id": 1, "error": { "code": -32000, "message": "Cannot navigate" } }),
        );

        match rx.try_recv().unwrap() {
            Err(Error::Protocol(msg)) => {
                assert!(msg.contains("Cannot navigate"));
                assert!(msg.contains("-32000"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_reply_ignored() {
        let callbacks = Callbacks::default();
        dispatch(&callbacks, &no_events(), json!({ "id": 99, "result": {} }));
        assert!(callbacks.lock().is_empty());
    }

    #[test]
    fn test_event_routed_to_handler() {
        let callbacks = Callbacks::default();
        let seen = Mutex::new(Vec::new());
        let handler = |method: &str, params: &Value| {
            seen.lock().push((method.to_string(), params["requestId"].clone()));
        };

        dispatch(
            &callbacks,
            &handler,
            json!({ "method": "Network.loadingFinished", "params": { "requestId": "42.1" } }),
        );

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "Network.loadingFinished");
        assert_eq!(seen[0].1, "42.1");
    }

    #[test]
    fn test_fail_pending_on_close() {
        let callbacks = Callbacks::default();
        let (tx, mut rx) = oneshot::channel();
        callbacks.lock().insert(3, tx);

        fail_pending(&callbacks);

        assert!(matches!(rx.try_recv().unwrap(), Err(Error::BrowserClosed)));
    }
}
