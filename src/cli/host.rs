//! Registrar - the registration surface handed to builtins and modules.
//!
//! One registrar is constructed per run and passed by reference through
//! builtin registration, module init, parsing, and dispatch. There is no
//! ambient registry state, so tests can drive several independent
//! registrars in one process.

use crate::cli::flags::{FlagDef, FlagTable, Scope};
use crate::cli::registry::{CommandId, CommandRegistry, HelpFn, RunFn};

#[derive(Default)]
pub struct Registrar {
    commands: CommandRegistry,
    flags: FlagTable,
}

impl Registrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command. On overflow the registration is dropped with a
    /// warning and `None` is returned; use the underlying
    /// [`CommandRegistry`] directly to fail hard instead.
    pub fn register_command(&mut self, name: &str, help: &str, run: RunFn) -> Option<CommandId> {
        match self.commands.register(name, help, run) {
            Ok(id) => {
                tracing::debug!("registered command '{}' (id: {})", name, id.index());
                Some(id)
            }
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        }
    }

    /// Registers a flag owned by `owner`. Overflow drops the registration
    /// with a warning.
    pub fn register_flag(&mut self, owner: Scope, def: FlagDef) {
        let name = def.name.clone();
        match self.flags.register(owner, def) {
            Ok(()) => tracing::debug!("registered flag '{}'", name),
            Err(err) => tracing::warn!("{err}"),
        }
    }

    pub fn register_global_flag(&mut self, def: FlagDef) {
        self.register_flag(Scope::Global, def);
    }

    pub fn attach_help_extension(&mut self, id: CommandId, ext: HelpFn) {
        self.commands.attach_help_extension(id, ext);
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn flags(&self) -> &FlagTable {
        &self.flags
    }
}
