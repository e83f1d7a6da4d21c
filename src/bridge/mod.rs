//! TCP command bridge for a single-threaded host.
//!
//! An external controller connects over TCP, sends newline-delimited JSON
//! requests, and gets one response line per request. Handlers may only run on
//! the host's own logical thread, so the bridge's job is the handoff: decode
//! on the connection thread, execute on the host thread, wait with a deadline,
//! reply in order.
//!
//! Architecture:
//! - Accept thread: polls the listener, spawns one thread per connection
//! - Connection threads: accumulate bytes, drain frames, dispatch, write
//! - Dispatch gateway: schedules a work item on the host loop and blocks on a
//!   one-shot reply with a 60 s deadline
//! - Host loop: drains the work queue on the host's single thread
//!
//! Protocol:
//! - Request (client → host): `{"command": "...", "params": {...}}`
//! - Response (host → client): `{"ok": true, "result": ...}` or
//!   `{"ok": false, "error": "...", ...}`

pub mod connection;
pub mod gateway;
pub mod protocol;
pub mod registry;
pub mod server;


pub use gateway::{DispatchGateway, DISPATCH_DEADLINE};
pub use protocol::{CommandParams, Frame, FrameBuffer, Request, Response};
pub use registry::{CommandFailure, CommandRegistry, CommandResult};
pub use server::BridgeServer;
