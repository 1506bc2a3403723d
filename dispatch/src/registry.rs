//! Name → handler registry.
//!
//! There is exactly one [`CommandRegistry`] per process: the host constructs
//! it and hands `&mut` access to the plugin loader, then moves it into the
//! [`Dispatcher`](crate::Dispatcher). Plugin units never reach for a global;
//! their init functions receive the registry they register against.
//!
//! Registration is last-write-wins so that re-initializing a plugin unit
//! simply replaces its earlier entries.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::handler::CommandHandler;

/// Registry of command handlers keyed by name.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rcli_dispatch::{CommandRegistry, FnHandler};
///
/// let mut registry = CommandRegistry::new();
/// registry.register(Arc::new(FnHandler::new("deploy", |_, _| Ok(()))), None);
/// registry.register(Arc::new(FnHandler::new("x", |_, _| Ok(()))), Some("ship"));
///
/// assert!(registry.get("deploy").is_some());
/// assert!(registry.get("ship").is_some());
/// assert!(registry.get("x").is_none());
/// assert_eq!(registry.names(), vec!["deploy", "ship"]);
/// ```
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `handler` under `name`, or under [`CommandHandler::name`] when
    /// `name` is `None`. An existing entry with the same name is replaced.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>, name: Option<&str>) {
        let name = name.unwrap_or_else(|| handler.name()).to_string();
        debug!(command = %name, handler = handler.name(), "Registering command");
        if self.commands.insert(name.clone(), handler).is_some() {
            debug!(command = %name, "Replaced existing registration");
        }
    }

    /// Looks up the handler registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.commands.get(name).cloned()
    }

    /// Returns a copy of the name → handler mapping.
    ///
    /// Changes to the returned map do not affect the registry.
    pub fn all_commands(&self) -> HashMap<String, Arc<dyn CommandHandler>> {
        self.commands.clone()
    }

    /// Returns `true` if a handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
