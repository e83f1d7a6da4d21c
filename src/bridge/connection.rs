//! Per-connection handler: owns one client socket for its whole life.
//!
//! Reads chunks, feeds the frame buffer, dispatches each complete frame, and
//! writes exactly one response per frame before touching the next. That single
//! blocking loop is what guarantees per-connection FIFO between requests and
//! responses.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use crate::log_debug;

use super::gateway::DispatchGateway;
use super::protocol::{encode_response, Frame, FrameBuffer, Response};

/// Read size per `recv`. Matches the frame buffer's appetite, not any frame
/// boundary; partial frames are carried across reads.
pub(crate) const RECV_CHUNK: usize = 64 * 1024;

/// Service one client until it closes, errors, or the server goes away.
pub(crate) fn handle_connection(mut stream: TcpStream, gateway: Arc<DispatchGateway>) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    log_debug(&format!("connection open: {peer}"));

    let mut buffer = FrameBuffer::new();
    let mut chunk = vec![0u8; RECV_CHUNK];
    loop {
        let read = match stream.read(&mut chunk) {
            Ok(0) => {
                // Peer closed. No response owed.
                log_debug(&format!("connection closed by peer: {peer}"));
                return;
            }
            Ok(n) => n,
            Err(e) => {
                log_debug(&format!("connection read error ({peer}): {e}"));
                return;
            }
        };
        buffer.extend(&chunk[..read]);

        // Drain every complete frame before reading again, responding in
        // decode order.
        while let Some(frame) = buffer.next_frame() {
            let response = match frame {
                Frame::Request(request) => gateway.dispatch(request),
                Frame::Malformed(message) => Response::failure(message),
            };
            if let Err(e) = stream.write_all(&encode_response(&response)) {
                // Reset or broken pipe: drop the connection silently.
                log_debug(&format!("connection write error ({peer}): {e}"));
                return;
            }
        }
    }
}
