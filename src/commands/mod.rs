//! Builtin commands shipped with the host.

mod exec;
mod plugins;

use std::path::PathBuf;

use crate::cli::{BoolCell, Registrar};

pub use exec::{run, run_in, NOT_FOUND_STATUS};

/// What builtin commands need from the host environment. Cheap to clone
/// into command closures.
#[derive(Clone)]
pub struct HostContext {
    /// Directory modules are discovered in and installed to.
    pub plugin_dir: PathBuf,
    /// The global `-yes` flag; read at prompt time, not registration time.
    pub assume_yes: BoolCell,
    /// Line-buffered confirmation prompts (config).
    pub buffered_input: bool,
}

pub fn register_builtins(registrar: &mut Registrar, ctx: &HostContext) {
    plugins::register(registrar, ctx.clone());
}
