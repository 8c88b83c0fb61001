//! Dynamic module loading.
//!
//! Modules are discovered in the plugin directory at startup, loaded, and
//! given one chance to register commands and flags through their init
//! entry point. Loaded images are owned here and never released before
//! process exit.

mod api;
mod loader;

pub use api::{PluginInit, INIT_OK, INIT_SYMBOL};
pub use loader::{
    initialize_modules, load_plugins, DylibModule, LoadError, ModuleSource, PluginDir,
    PluginModule,
};
