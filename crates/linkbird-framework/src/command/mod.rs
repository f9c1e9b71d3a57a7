//! Command table and built-in commands.
//!
//! Commands are announced to the event stream when it is opened, so the
//! table is fixed before the engine starts. Each name maps to exactly one
//! handler; registering a name again replaces the earlier handler.

use std::collections::BTreeMap;

use tracing::debug;

use linkbird_core::CommandMetadata;

use crate::handler::BoxedCommandHandler;

pub mod isitdown;

pub use isitdown::IsItDown;

/// Name-keyed command handlers.
#[derive(Default, Clone)]
pub struct CommandTable {
    handlers: BTreeMap<String, BoxedCommandHandler>,
}

impl CommandTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding the built-in commands.
    pub fn with_builtins() -> Self {
        Self::new().with(IsItDown::handler())
    }

    /// Registers a handler under its metadata name.
    pub fn register(&mut self, handler: BoxedCommandHandler) {
        let name = handler.metadata().name;
        if self.handlers.insert(name.clone(), handler).is_some() {
            debug!(command = %name, "Replaced command handler");
        } else {
            debug!(command = %name, "Registered command");
        }
    }

    /// Registers a handler (builder pattern).
    pub fn with(mut self, handler: BoxedCommandHandler) -> Self {
        self.register(handler);
        self
    }

    /// Looks up the handler for a command name.
    pub fn get(&self, name: &str) -> Option<&BoxedCommandHandler> {
        self.handlers.get(name)
    }

    /// Metadata for every command, sorted by name.
    pub fn metadata(&self) -> Vec<CommandMetadata> {
        self.handlers.values().map(|h| h.metadata()).collect()
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no command is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::command_handler;

    fn named(name: &str, help: &str) -> BoxedCommandHandler {
        command_handler(CommandMetadata::new(name, help, help), |_, _| async {})
    }

    #[test]
    fn test_builtins_include_isitdown() {
        let table = CommandTable::with_builtins();
        let metadata = table.metadata();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].name, "isitdown");
        assert_eq!(metadata[0].short_help, "<website>");
    }

    #[test]
    fn test_reregistering_replaces() {
        let table = CommandTable::new()
            .with(named("ping", "old"))
            .with(named("ping", "new"));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("ping").unwrap().metadata().short_help, "new");
    }

    #[test]
    fn test_metadata_sorted_by_name() {
        let table = CommandTable::new()
            .with(named("zeta", ""))
            .with(named("alpha", ""));

        let names: Vec<_> = table.metadata().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(table.get("missing").is_none());
    }
}
