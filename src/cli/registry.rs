//! Command registry - single source of truth for all registered commands.

use thiserror::Error;

/// Maximum number of commands a process can register.
pub const COMMAND_CAPACITY: usize = 1024;

/// Identifier assigned at registration time; stable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(usize);

impl CommandId {
    /// Position of the command in its registry.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a command's run entry point produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Ordinary completion; the value becomes the process exit status.
    Status(i32),
    /// Ask the dispatcher to render this command's help instead.
    /// Consumed by the dispatcher, never propagated as an exit status.
    ShowHelp,
}

impl RunOutcome {
    pub fn success() -> Self {
        RunOutcome::Status(0)
    }
}

/// Run entry point: receives the residual arguments after the command name.
pub type RunFn = Box<dyn Fn(&[String]) -> RunOutcome>;

/// Help extension: invoked after the standard help rendering, returns a status.
pub type HelpFn = Box<dyn Fn(&[String]) -> i32>;

/// A registered command. Immutable once registered, except for the optional
/// help extension attached via [`CommandRegistry::attach_help_extension`].
pub struct CommandDef {
    name: String,
    help: String,
    run: RunFn,
    help_ext: Option<HelpFn>,
}

impl CommandDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub(crate) fn invoke(&self, args: &[String]) -> RunOutcome {
        (self.run)(args)
    }

    pub(crate) fn has_help_ext(&self) -> bool {
        self.help_ext.is_some()
    }

    /// Runs the help extension, if one is attached.
    pub(crate) fn invoke_help_ext(&self, args: &[String]) -> Option<i32> {
        self.help_ext.as_ref().map(|ext| ext(args))
    }
}

/// Insertion-ordered command table with a fixed capacity.
///
/// Duplicate names are not rejected: a later registration with a colliding
/// name occupies a slot but is shadowed by name lookup, which returns the
/// first match.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDef>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command and returns its identifier, or a capacity error.
    /// Existing entries are never disturbed by a rejected registration.
    pub fn register(
        &mut self,
        name: &str,
        help: &str,
        run: RunFn,
    ) -> Result<CommandId, RegistryError> {
        if self.commands.len() >= COMMAND_CAPACITY {
            return Err(RegistryError::CommandCapacity {
                name: name.to_string(),
                capacity: COMMAND_CAPACITY,
            });
        }

        let id = CommandId(self.commands.len());
        self.commands.push(CommandDef {
            name: name.to_string(),
            help: help.to_string(),
            run,
            help_ext: None,
        });
        Ok(id)
    }

    /// Attaches a help extension to an existing command. An identifier from
    /// a different registry that does not resolve here is ignored.
    pub fn attach_help_extension(&mut self, id: CommandId, ext: HelpFn) {
        if let Some(def) = self.commands.get_mut(id.0) {
            def.help_ext = Some(ext);
        }
    }

    /// First-match linear scan by name, in registration order.
    pub fn lookup_by_name(&self, name: &str) -> Option<CommandId> {
        self.commands
            .iter()
            .position(|def| def.name == name)
            .map(CommandId)
    }

    /// Name lookup plus descriptor access in one step.
    pub fn find(&self, name: &str) -> Option<(CommandId, &CommandDef)> {
        let id = self.lookup_by_name(name)?;
        Some((id, &self.commands[id.0]))
    }

    pub fn get(&self, id: CommandId) -> Option<&CommandDef> {
        self.commands.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDef> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Registration failures. Both tables report overflow as an error so the
/// caller decides between dropping the registration and failing hard.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("command table full ({capacity} entries), dropping '{name}'")]
    CommandCapacity { name: String, capacity: usize },

    #[error("flag table full ({capacity} entries), dropping '{name}'")]
    FlagCapacity { name: String, capacity: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> RunFn {
        Box::new(|_| RunOutcome::success())
    }

    #[test]
    fn ids_are_sequential_registration_indices() {
        let mut registry = CommandRegistry::new();
        let first = registry.register("first", "", noop()).unwrap();
        let second = registry.register("second", "", noop()).unwrap();

        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
    }

    #[test]
    fn duplicate_names_create_independent_entries() {
        let mut registry = CommandRegistry::new();
        let first = registry.register("status", "original", noop()).unwrap();
        let second = registry.register("status", "imposter", noop()).unwrap();

        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
        // Name resolution only ever reaches the first entry.
        assert_eq!(registry.lookup_by_name("status"), Some(first));
    }

    #[test]
    fn lookup_of_unknown_name_fails() {
        let registry = CommandRegistry::new();
        assert!(registry.lookup_by_name("missing").is_none());
    }

    #[test]
    fn help_extension_attaches_to_existing_command() {
        let mut registry = CommandRegistry::new();
        let id = registry.register("cmd", "", noop()).unwrap();

        registry.attach_help_extension(id, Box::new(|_| 7));

        let def = registry.get(id).unwrap();
        assert_eq!(def.invoke_help_ext(&[]), Some(7));
    }

    #[test]
    fn help_extension_for_foreign_id_is_ignored() {
        let mut other = CommandRegistry::new();
        for n in 0..3 {
            other.register(&format!("cmd{n}"), "", noop()).unwrap();
        }
        let foreign = other.register("cmd3", "", noop()).unwrap();

        let mut registry = CommandRegistry::new();
        let id = registry.register("only", "", noop()).unwrap();
        registry.attach_help_extension(foreign, Box::new(|_| 7));

        assert!(registry.get(id).unwrap().invoke_help_ext(&[]).is_none());
    }

    #[test]
    fn registration_beyond_capacity_is_rejected() {
        let mut registry = CommandRegistry::new();
        for n in 0..COMMAND_CAPACITY {
            registry.register(&format!("cmd{n}"), "", noop()).unwrap();
        }

        let err = registry.register("overflow", "", noop()).unwrap_err();
        assert!(matches!(err, RegistryError::CommandCapacity { .. }));

        // The table stays at exactly capacity and earlier entries survive.
        assert_eq!(registry.len(), COMMAND_CAPACITY);
        assert!(registry.lookup_by_name("cmd0").is_some());
        assert!(registry.lookup_by_name("overflow").is_none());
    }
}
