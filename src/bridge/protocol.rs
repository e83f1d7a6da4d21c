//! Wire protocol types and the newline-delimited JSON frame codec.
//!
//! One frame is one JSON object terminated by `\n`, for requests and responses
//! alike. `serde_json` escapes control characters inside string values, so the
//! delimiter can never appear unescaped in an encoded payload and arbitrary
//! text (embedded newlines included) survives framing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameter mapping attached to a request.
pub type CommandParams = Map<String, Value>;

/// One decoded command request.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Request {
    pub command: String,
    #[serde(default)]
    pub params: CommandParams,
}

/// One response frame. Exactly one is written per decoded request.
///
/// Serializes to the wire shape directly: `{"ok": true, "result": ...}` or
/// `{"ok": false, "error": ..., "traceback"?: ..., "available"?: [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,
}

impl Response {
    pub fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
            traceback: None,
            available: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(message.into()),
            traceback: None,
            available: None,
        }
    }

    pub fn failure_with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            traceback: Some(detail.into()),
            ..Self::failure(message)
        }
    }

    /// Unknown-command failure carrying every registered name so clients can
    /// discover what the bridge actually offers.
    pub fn unknown_command(name: &str, available: Vec<String>) -> Self {
        Self {
            available: Some(available),
            ..Self::failure(format!("Unknown command: '{name}'"))
        }
    }
}

/// Result of draining one frame out of the receive buffer.
#[derive(Debug)]
pub enum Frame {
    Request(Request),
    /// The line was delimited but did not parse as a request. Reported to the
    /// client as a failure for this frame only; the connection survives.
    Malformed(String),
}

/// Accumulates raw TCP segments and yields complete frames.
///
/// Decode is resumable: when no full line has arrived yet, `next_frame`
/// returns `None` and the buffered bytes are kept for the next read, so frame
/// boundaries are independent of how the transport fragments the stream.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly received bytes.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Drain the next complete frame, skipping whitespace-only lines.
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let pos = self.buf.iter().position(|&b| b == b'\n')?;
            let line: Vec<u8> = self.buf.drain(..=pos).take(pos).collect();
            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            return Some(match serde_json::from_slice::<Request>(&line) {
                Ok(request) => Frame::Request(request),
                Err(e) => Frame::Malformed(format!("Invalid JSON frame: {e}")),
            });
        }
    }

    /// Bytes buffered but not yet delimited.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}

/// Encode a response as one delimited frame.
pub fn encode_response(response: &Response) -> Vec<u8> {
    // Serializing a struct of plain fields cannot fail.
    let mut bytes = serde_json::to_vec(response).unwrap_or_else(|_| b"{\"ok\":false}".to_vec());
    bytes.push(b'\n');
    bytes
}
