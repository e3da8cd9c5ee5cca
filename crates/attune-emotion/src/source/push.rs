// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live samples pushed over a WebSocket by a headset bridge.
//!
//! Frames look like `{"emotion": "calm", "intensity": 0.4, ...}` plus any
//! device-specific fields. `poorSignalLevel: 200` means the headset is not
//! actually in contact and the frame carries no reading.

use std::time::Duration;

use async_trait::async_trait;
use attune_core::{EmotionSample, EmotionSource, EmotionVocabulary};
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

/// Device sentinel for "no signal". Bridges send it as `200` or `200.0`.
pub const POOR_SIGNAL_SENTINEL: f64 = 200.0;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outcome of decoding one text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Sample(EmotionSample),
    NotReady,
    Malformed(String),
}

/// Decodes a text frame against the active vocabulary.
pub fn parse_frame(raw: &str, vocabulary: EmotionVocabulary) -> Frame {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => return Frame::Malformed(format!("not JSON: {e}")),
    };

    if value.get("poorSignalLevel").and_then(|v| v.as_f64()) == Some(POOR_SIGNAL_SENTINEL) {
        return Frame::NotReady;
    }

    let Some(emotion) = value.get("emotion").and_then(|v| v.as_str()) else {
        return Frame::Malformed("missing `emotion`".into());
    };
    let Some(intensity) = value.get("intensity").and_then(|v| v.as_f64()) else {
        return Frame::Malformed("`intensity` is missing or not a number".into());
    };

    let sample = vocabulary
        .parse_label(emotion)
        .and_then(|label| EmotionSample::new(label, intensity));
    match sample {
        Ok(sample) => Frame::Sample(sample),
        Err(e) => Frame::Malformed(e.to_string()),
    }
}

/// Connects to a push channel and yields the samples it sends.
///
/// Never ends on its own. Closes, errors and timeouts on either the
/// handshake or a read drop the connection and reconnect after
/// `reconnect_delay`.
pub struct PushSource {
    url: String,
    vocabulary: EmotionVocabulary,
    read_timeout: Duration,
    reconnect_delay: Duration,
    stream: Option<WsStream>,
    signal_ready: bool,
}

impl PushSource {
    pub fn new(
        url: String,
        vocabulary: EmotionVocabulary,
        read_timeout: Duration,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            url,
            vocabulary,
            read_timeout,
            reconnect_delay,
            stream: None,
            signal_ready: true,
        }
    }

    async fn drop_connection(&mut self, reason: &str) {
        self.stream = None;
        warn!(url = %self.url, reason, "emotion channel dropped, reconnecting");
        tokio::time::sleep(self.reconnect_delay).await;
    }

    fn set_signal_ready(&mut self, ready: bool) {
        if self.signal_ready != ready {
            self.signal_ready = ready;
            if ready {
                info!(url = %self.url, "headset signal acquired");
            } else {
                warn!(url = %self.url, "headset reports poor signal, waiting");
            }
        }
    }
}

#[async_trait]
impl EmotionSource for PushSource {
    fn name(&self) -> &str {
        "push"
    }

    fn vocabulary(&self) -> EmotionVocabulary {
        self.vocabulary
    }

    async fn next_sample(&mut self) -> Option<EmotionSample> {
        loop {
            if self.stream.is_none() {
                let connecting = connect_async(self.url.as_str());
                match tokio::time::timeout(self.read_timeout, connecting).await {
                    Ok(Ok((stream, _))) => {
                        info!(url = %self.url, "emotion channel connected");
                        self.stream = Some(stream);
                    }
                    Ok(Err(e)) => {
                        self.drop_connection(&format!("connect failed: {e}")).await;
                        continue;
                    }
                    Err(_) => {
                        self.drop_connection("connect timed out").await;
                        continue;
                    }
                }
            }
            let Some(stream) = self.stream.as_mut() else {
                continue;
            };

            let text = match tokio::time::timeout(self.read_timeout, stream.next()).await {
                Err(_) => {
                    self.drop_connection("read timed out").await;
                    continue;
                }
                Ok(None) | Ok(Some(Ok(Message::Close(_)))) => {
                    self.drop_connection("closed by peer").await;
                    continue;
                }
                Ok(Some(Err(e))) => {
                    self.drop_connection(&e.to_string()).await;
                    continue;
                }
                Ok(Some(Ok(Message::Text(text)))) => text,
                Ok(Some(Ok(other))) => {
                    debug!(kind = ?other, "ignoring non-text frame");
                    continue;
                }
            };

            match parse_frame(text.as_str(), self.vocabulary) {
                Frame::Sample(sample) => {
                    self.set_signal_ready(true);
                    return Some(sample);
                }
                Frame::NotReady => self.set_signal_ready(false),
                Frame::Malformed(reason) => {
                    warn!(reason = %reason, "dropping malformed emotion frame");
                }
            }
        }
    }
}
