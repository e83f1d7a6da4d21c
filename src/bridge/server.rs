//! Listener and server lifecycle.
//!
//! `start` binds with address reuse, then runs an accept loop on a dedicated
//! thread; every accepted connection gets its own handler thread. Expected
//! client count is small, so there is deliberately no connection pool limit.

use anyhow::{Context, Result};
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::log_debug;

use super::connection::handle_connection;
use super::gateway::DispatchGateway;

/// Accept poll interval. Short enough that `stop` is observed promptly
/// instead of parking forever in accept.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// A running bridge server. Dropping it stops the accept loop.
///
/// `stop` is idempotent; stopping an already-stopped server is a no-op.
/// In-flight connection threads are not interrupted on stop, they end when
/// their peers close.
pub struct BridgeServer {
    running: Arc<AtomicBool>,
    local_addr: SocketAddr,
    accept_thread: Option<JoinHandle<()>>,
}

impl BridgeServer {
    /// Bind `addr` and start accepting. Binding failure (port in use,
    /// permission denied) is fatal here and surfaced to the operator; it never
    /// reaches a client.
    pub fn start(addr: SocketAddr, gateway: Arc<DispatchGateway>) -> Result<Self> {
        let listener = bind_with_reuse(addr).with_context(|| format!("failed to bind {addr}"))?;
        listener
            .set_nonblocking(true)
            .context("failed to configure listener polling")?;
        let local_addr = listener
            .local_addr()
            .context("failed to read bound address")?;

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let accept_thread = thread::Builder::new()
            .name("bridge-accept".to_string())
            .spawn(move || accept_loop(listener, flag, gateway))
            .context("failed to spawn accept thread")?;

        log_debug(&format!("bridge listening on {local_addr}"));
        Ok(Self {
            running,
            local_addr,
            accept_thread: Some(accept_thread),
        })
    }

    /// The address actually bound. With port 0 this is where the ephemeral
    /// port shows up.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_listening(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Flip the running flag and wait for the accept loop to exit, closing
    /// the listening socket. Safe to call any number of times.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.accept_thread.take() {
            let _ = handle.join();
        }
        log_debug(&format!("bridge stopped on {}", self.local_addr));
    }
}

impl Drop for BridgeServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn accept_loop(listener: TcpListener, running: Arc<AtomicBool>, gateway: Arc<DispatchGateway>) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                // The listener polls non-blocking; connection threads block.
                let _ = stream.set_nonblocking(false);
                let gateway = Arc::clone(&gateway);
                let spawned = thread::Builder::new()
                    .name(format!("bridge-conn-{peer}"))
                    .spawn(move || handle_connection(stream, gateway));
                if let Err(e) = spawned {
                    log_debug(&format!("failed to spawn handler for {peer}: {e}"));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(e) => {
                log_debug(&format!("accept error: {e}"));
                thread::sleep(ACCEPT_POLL);
            }
        }
    }
    // Listener drops here, releasing the port for a later start.
}

/// Bind with SO_REUSEADDR so a stop/start cycle can rebind the same port
/// without waiting out TIME_WAIT.
#[cfg(unix)]
fn bind_with_reuse(addr: SocketAddr) -> io::Result<TcpListener> {
    use std::mem;
    use std::os::unix::io::FromRawFd;

    let SocketAddr::V4(v4) = addr else {
        // std does not expose the option pre-bind; v6 binds are rare enough
        // here to take the plain path.
        return TcpListener::bind(addr);
    };

    unsafe {
        let fd = libc::socket(libc::AF_INET, libc::SOCK_STREAM, 0);
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        let close_with = |err: io::Error| {
            libc::close(fd);
            Err(err)
        };

        let one: libc::c_int = 1;
        if libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            &one as *const libc::c_int as *const libc::c_void,
            mem::size_of::<libc::c_int>() as libc::socklen_t,
        ) != 0
        {
            return close_with(io::Error::last_os_error());
        }

        let mut sin: libc::sockaddr_in = mem::zeroed();
        sin.sin_family = libc::AF_INET as libc::sa_family_t;
        sin.sin_port = v4.port().to_be();
        sin.sin_addr = libc::in_addr {
            s_addr: u32::from_ne_bytes(v4.ip().octets()),
        };
        if libc::bind(
            fd,
            &sin as *const libc::sockaddr_in as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        ) != 0
        {
            return close_with(io::Error::last_os_error());
        }
        if libc::listen(fd, 128) != 0 {
            return close_with(io::Error::last_os_error());
        }

        Ok(TcpListener::from_raw_fd(fd))
    }
}

#[cfg(not(unix))]
fn bind_with_reuse(addr: SocketAddr) -> io::Result<TcpListener> {
    TcpListener::bind(addr)
}
