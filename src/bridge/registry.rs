//! Command registry: a fixed name-to-handler table built at startup.
//!
//! The registry is populated once, wrapped in an `Arc`, and only ever read
//! after that, so connection threads resolve names without locking.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::protocol::CommandParams;

/// A handler-level failure: message for the client plus optional diagnostic
/// detail (the wire `traceback` field).
#[derive(Debug, Clone, PartialEq)]
pub struct CommandFailure {
    pub message: String,
    pub detail: Option<String>,
}

impl CommandFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<String> for CommandFailure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for CommandFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// What a handler returns: a JSON-serializable value or a failure.
pub type CommandResult = Result<Value, CommandFailure>;

/// A registered command body. Runs only on the host thread.
pub type CommandFn = Box<dyn Fn(&CommandParams) -> CommandResult + Send + Sync>;

/// Immutable-after-startup mapping from command name to handler.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandFn>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a case-sensitive, unique name.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate name: two handlers claiming the same command is a
    /// programming error in startup wiring, not a runtime condition.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&CommandParams) -> CommandResult + Send + Sync + 'static,
    {
        if self
            .commands
            .insert(name.to_string(), Box::new(handler))
            .is_some()
        {
            panic!("duplicate command registration: '{name}'");
        }
    }

    /// Look up a handler by exact name.
    pub fn resolve(&self, name: &str) -> Option<&CommandFn> {
        self.commands.get(name)
    }

    /// All registered names, sorted.
    pub fn command_names(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.command_names())
            .finish()
    }
}
