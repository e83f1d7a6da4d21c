//! scenebridged: the TCP command bridge wired to the in-memory scene document.
//!
//! The main thread plays the host's single logical thread; it drains the work
//! queue while the accept thread and per-connection threads feed it. Every
//! registered command therefore mutates scene state from exactly one thread.

use anyhow::{Context, Result};
use clap::Parser;
use std::panic;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use scenebridge::bridge::{BridgeServer, CommandRegistry, DispatchGateway};
use scenebridge::config::AppConfig;
use scenebridge::host::HostLoop;
use scenebridge::scene::{register_scene_commands, SceneDocument};
use scenebridge::{init_logging, init_tracing, log_debug, log_panic};

fn main() -> Result<()> {
    let config = AppConfig::parse();
    init_logging(&config);
    init_tracing(&config);
    panic::set_hook(Box::new(|info| log_panic(info)));

    let document = Arc::new(Mutex::new(SceneDocument::new()));
    let mut registry = CommandRegistry::new();
    register_scene_commands(&mut registry, Arc::clone(&document));
    let registry = Arc::new(registry);

    let (scheduler, host_loop) = HostLoop::new();
    let gateway = Arc::new(DispatchGateway::new(
        Arc::clone(&registry),
        Arc::new(scheduler),
    ));

    let addr = config.bind_addr()?;
    let mut server = BridgeServer::start(addr, gateway).context("bridge startup failed")?;
    eprintln!(
        "scenebridged listening on {} ({} commands)",
        server.local_addr(),
        registry.len()
    );
    log_debug(&format!("scenebridged ready on {}", server.local_addr()));

    // The daemon has no other work; park here as the host loop until killed.
    let stop = AtomicBool::new(false);
    host_loop.run_until_stopped(&stop);

    server.stop();
    Ok(())
}
