//! Live update subscription.
//!
//! One long-lived streaming GET against the service's event endpoint for
//! the lifetime of the panel. Every `weatherUpdate` event payload is
//! forwarded as a complete [`WeatherSnapshot`]; there is no validation
//! against the previous value, no deduplication and no reconnect.
//!
//! Channel failures (connect, stream, malformed payload) are logged and
//! ignored; a dropped connection simply ends the stream.

use crate::{error::ChannelError, model::WeatherSnapshot};
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The one event name the panel subscribes to.
pub const UPDATE_EVENT: &str = "weatherUpdate";

const UPDATE_BUFFER: usize = 16;

/// Factory for push-channel subscriptions.
#[derive(Debug, Clone)]
pub struct UpdateChannel {
    http: Client,
    endpoint: String,
}

impl UpdateChannel {
    /// `endpoint` is the full URL of the event stream, usually
    /// [`Config::events_endpoint`](crate::Config::events_endpoint).
    pub fn new(endpoint: String) -> Self {
        Self { http: Client::new(), endpoint }
    }

    /// Open the push channel. Connection setup happens on the background
    /// task, so the returned [`Subscription`] exists (and can be closed)
    /// even if the connection is never established.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let token = CancellationToken::new();
        let task = tokio::spawn(run_stream(
            self.http.clone(),
            self.endpoint.clone(),
            token.clone(),
            tx,
        ));

        Subscription { updates: rx, token, task, closed: false }
    }
}

/// A live push-channel subscription.
///
/// Closing is exactly-once by construction: [`close`](Self::close)
/// consumes the handle, and dropping an unclosed subscription cancels
/// the stream on every other exit path.
#[derive(Debug)]
pub struct Subscription {
    updates: mpsc::Receiver<WeatherSnapshot>,
    token: CancellationToken,
    task: JoinHandle<()>,
    closed: bool,
}

impl Subscription {
    /// Next pushed snapshot, or `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<WeatherSnapshot> {
        self.updates.recv().await
    }

    /// Close the channel and wait for the background task to finish.
    pub async fn close(mut self) {
        self.closed = true;
        self.token.cancel();
        let _ = (&mut self.task).await;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.closed {
            self.token.cancel();
        }
    }
}

async fn run_stream(
    http: Client,
    endpoint: String,
    token: CancellationToken,
    tx: mpsc::Sender<WeatherSnapshot>,
) {
    let res = tokio::select! {
        _ = token.cancelled() => return,
        res = http.get(&endpoint).send() => res,
    };

    let mut res = match res {
        Ok(res) => res,
        Err(e) => {
            tracing::warn!(error = %ChannelError::Connect(e), "push channel unavailable");
            return;
        }
    };

    if !res.status().is_success() {
        tracing::warn!(status = %res.status(), "push channel rejected the subscription");
        return;
    }

    tracing::debug!(endpoint = %endpoint, "push channel established");

    let mut buf = FrameBuffer::default();
    loop {
        let chunk = tokio::select! {
            _ = token.cancelled() => return,
            chunk = res.chunk() => chunk,
        };

        match chunk {
            Ok(Some(bytes)) => {
                buf.extend(&bytes);
                while let Some(frame) = buf.next_frame() {
                    if let Some(snapshot) = snapshot_from_frame(&frame) {
                        if tx.send(snapshot).await.is_err() {
                            // Receiver gone, the panel is tearing down.
                            return;
                        }
                    }
                }
            }
            Ok(None) => {
                // Server closed the stream; no reconnect policy.
                tracing::debug!("push channel closed by server");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %ChannelError::Stream(e), "push channel dropped");
                return;
            }
        }
    }
}

/// Accumulates raw stream bytes and hands out complete frames.
///
/// Frames are split on the `\n\n` byte sequence and decoded only once
/// complete; a multi-byte character split across network chunks must
/// not be decoded piecewise.
#[derive(Debug, Default)]
struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn next_frame(&mut self) -> Option<String> {
        let end = self.buf.windows(2).position(|w| w == b"\n\n")?;
        let frame: Vec<u8> = self.buf.drain(..end + 2).collect();
        Some(String::from_utf8_lossy(&frame).into_owned())
    }
}

/// Parse one server-sent-event frame; returns the payload only for the
/// subscribed event name. Malformed payloads are logged and dropped.
fn snapshot_from_frame(frame: &str) -> Option<WeatherSnapshot> {
    let (event, data) = parse_frame(frame)?;
    if event != UPDATE_EVENT {
        return None;
    }

    match serde_json::from_str(&data) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!(error = %ChannelError::Payload(e), "ignoring malformed push payload");
            None
        }
    }
}

/// Split an SSE frame into its event name and joined data lines.
/// Frames without data (comments, keep-alives) yield `None`.
fn parse_frame(frame: &str) -> Option<(String, String)> {
    let mut event = "message".to_string();
    let mut data: Vec<&str> = Vec::new();

    for line in frame.lines() {
        let line = line.trim_end_matches('\r');
        if line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("event:") {
            event = value.trim_start_matches(' ').to_string();
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push(value.trim_start_matches(' '));
        }
    }

    if data.is_empty() {
        return None;
    }

    Some((event, data.join("\n")))
}
