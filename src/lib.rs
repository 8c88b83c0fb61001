//! anvil - an extensible command-line dispatcher.
//!
//! Dynamic modules discovered in the plugin directory register commands
//! and typed flags at startup; the host parses the invocation in two
//! passes and dispatches to the selected command.

pub mod cli;
pub mod commands;
pub mod config;
pub mod plugins;
pub mod term;
