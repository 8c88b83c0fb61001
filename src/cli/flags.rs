//! Flag table - typed flag descriptors with scoped ownership.

use std::cell::{Cell, RefCell};
use std::fmt::Write as _;
use std::rc::Rc;

use crate::cli::registry::{CommandId, RegistryError};

/// Maximum number of flags a process can register.
pub const FLAG_CAPACITY: usize = 256;

/// Who owns a flag: the host itself, or one registered command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Command(CommandId),
}

/// Storage for a Bool flag. The registrant keeps one handle and reads it
/// after parsing; the flag table holds the other. Single-threaded by
/// contract, like everything in this core.
#[derive(Debug, Clone, Default)]
pub struct BoolCell(Rc<Cell<bool>>);

impl BoolCell {
    pub fn new(initial: bool) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn set(&self, value: bool) {
        self.0.set(value);
    }
}

/// Storage for a Text flag. Holds an owned copy of the supplied argument,
/// or the preset value when none was supplied.
#[derive(Debug, Clone, Default)]
pub struct TextCell(Rc<RefCell<Option<String>>>);

impl TextCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cell that already holds a value, for flags with a default.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(Some(value.into()))))
    }

    pub fn get(&self) -> Option<String> {
        self.0.borrow().clone()
    }

    pub(crate) fn set(&self, value: String) {
        *self.0.borrow_mut() = Some(value);
    }
}

/// Storage for a Choice flag: an index into the descriptor's option list.
/// Left untouched when no valid value is supplied.
#[derive(Debug, Clone, Default)]
pub struct ChoiceCell(Rc<Cell<usize>>);

impl ChoiceCell {
    pub fn new(initial: usize) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }

    pub(crate) fn set(&self, index: usize) {
        self.0.set(index);
    }
}

/// Typed storage bound to a flag, discriminated by flag kind. A descriptor
/// can never pair a kind with the wrong kind of storage.
#[derive(Debug, Clone)]
pub enum FlagBinding {
    /// On/off switch: `-name` sets true, `-no-name` sets false.
    Bool(BoolCell),
    /// Free-form value: inline `=value` or the following token.
    Text(TextCell),
    /// Closed set of accepted values; stores the matched option's index.
    Choice {
        options: Vec<String>,
        cell: ChoiceCell,
    },
}

/// A single flag definition.
#[derive(Debug, Clone)]
pub struct FlagDef {
    /// Primary name, matched after one or two leading dashes are stripped.
    pub name: String,
    /// Optional short alias (e.g. "v" for "verbose").
    pub alias: Option<String>,
    /// Human-readable description for listings.
    pub help: String,
    /// Label rendered after Text flags in listings (e.g. `-app <name>`).
    pub value_name: Option<String>,
    /// Typed storage written by the parser.
    pub binding: FlagBinding,
    owner: Scope,
}

impl FlagDef {
    pub fn boolean(name: impl Into<String>, help: impl Into<String>, cell: BoolCell) -> Self {
        Self::with_binding(name, help, FlagBinding::Bool(cell))
    }

    pub fn text(name: impl Into<String>, help: impl Into<String>, cell: TextCell) -> Self {
        Self::with_binding(name, help, FlagBinding::Text(cell))
    }

    pub fn choice(
        name: impl Into<String>,
        help: impl Into<String>,
        options: Vec<String>,
        cell: ChoiceCell,
    ) -> Self {
        Self::with_binding(name, help, FlagBinding::Choice { options, cell })
    }

    fn with_binding(name: impl Into<String>, help: impl Into<String>, binding: FlagBinding) -> Self {
        Self {
            name: name.into(),
            alias: None,
            help: help.into(),
            value_name: None,
            binding,
            owner: Scope::Global,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_value_name(mut self, label: impl Into<String>) -> Self {
        self.value_name = Some(label.into());
        self
    }

    /// The scope stamped at registration time.
    pub fn scope(&self) -> Scope {
        self.owner
    }

    fn matches(&self, name: &str) -> bool {
        self.name == name || self.alias.as_deref() == Some(name)
    }

    fn invocation(&self) -> String {
        let mut out = String::new();
        if let Some(alias) = &self.alias {
            let _ = write!(out, "-{alias} ");
        }
        let _ = write!(out, "-{}", self.name);

        match &self.binding {
            FlagBinding::Bool(_) => {}
            FlagBinding::Text(_) => {
                let label = self.value_name.as_deref().unwrap_or("value");
                let _ = write!(out, " <{label}>");
            }
            FlagBinding::Choice { options, .. } => {
                let _ = write!(out, " <{}>", options.join("|"));
            }
        }
        out
    }
}

/// Insertion-ordered flag table with a fixed capacity.
///
/// Lookup scans every flag regardless of owner, so a global flag and a
/// command-scoped flag sharing a name are both reachable by plain name with
/// first-registered precedence. Colliding names are shadowed, not rejected.
#[derive(Default)]
pub struct FlagTable {
    flags: Vec<FlagDef>,
}

impl FlagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the descriptor with its owner and appends it, or reports a
    /// capacity error. Existing entries are never disturbed by a rejected
    /// registration.
    pub fn register(&mut self, owner: Scope, mut def: FlagDef) -> Result<(), RegistryError> {
        if self.flags.len() >= FLAG_CAPACITY {
            return Err(RegistryError::FlagCapacity {
                name: def.name,
                capacity: FLAG_CAPACITY,
            });
        }
        def.owner = owner;
        self.flags.push(def);
        Ok(())
    }

    /// First-match linear scan in insertion order; per entry the primary
    /// name is checked before the alias.
    pub fn lookup(&self, name: &str) -> Option<&FlagDef> {
        self.flags.iter().find(|flag| flag.matches(name))
    }

    /// Listing of the flags belonging to exactly one owner, in registration
    /// order.
    pub fn render_for_scope(&self, scope: Scope) -> String {
        let mut out = String::from("Flags:\n");
        for flag in self.flags.iter().filter(|flag| flag.owner == scope) {
            let _ = writeln!(out, "  {:<20} {}", flag.invocation(), flag.help);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bool_flag(name: &str) -> FlagDef {
        FlagDef::boolean(name, format!("help for {name}"), BoolCell::new(false))
    }

    #[test]
    fn alias_and_primary_resolve_to_the_same_descriptor() {
        let mut table = FlagTable::new();
        table
            .register(Scope::Global, bool_flag("verbose").with_alias("v"))
            .unwrap();

        let by_name = table.lookup("verbose").unwrap();
        let by_alias = table.lookup("v").unwrap();
        assert_eq!(by_name.name, by_alias.name);
        assert_eq!(by_name.scope(), by_alias.scope());
    }

    #[test]
    fn first_registered_name_wins_across_scopes() {
        let mut registry = crate::cli::registry::CommandRegistry::new();
        let cmd = registry
            .register("cmd", "", Box::new(|_| crate::cli::registry::RunOutcome::success()))
            .unwrap();

        let mut table = FlagTable::new();
        table.register(Scope::Global, bool_flag("force")).unwrap();
        table
            .register(Scope::Command(cmd), bool_flag("force"))
            .unwrap();

        // Both entries occupy slots, but lookup only reaches the first.
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("force").unwrap().scope(), Scope::Global);
    }

    #[test]
    fn earlier_alias_beats_later_primary_name() {
        let mut table = FlagTable::new();
        table
            .register(Scope::Global, bool_flag("verbose").with_alias("v"))
            .unwrap();
        table.register(Scope::Global, bool_flag("v")).unwrap();

        assert_eq!(table.lookup("v").unwrap().name, "verbose");
    }

    #[test]
    fn registration_beyond_capacity_is_rejected() {
        let mut table = FlagTable::new();
        for n in 0..FLAG_CAPACITY {
            table
                .register(Scope::Global, bool_flag(&format!("flag{n}")))
                .unwrap();
        }

        let err = table.register(Scope::Global, bool_flag("overflow")).unwrap_err();
        assert!(matches!(err, RegistryError::FlagCapacity { .. }));
        assert_eq!(table.len(), FLAG_CAPACITY);
        assert!(table.lookup("flag0").is_some());
        assert!(table.lookup("overflow").is_none());
    }

    #[test]
    fn render_lists_only_the_requested_scope_in_registration_order() {
        let mut table = FlagTable::new();
        table
            .register(Scope::Global, bool_flag("verbose").with_alias("v"))
            .unwrap();
        table
            .register(
                Scope::Global,
                FlagDef::text("app", "The target application", TextCell::new())
                    .with_value_name("name"),
            )
            .unwrap();
        table
            .register(
                Scope::Global,
                FlagDef::choice(
                    "mode",
                    "Transfer mode",
                    vec!["fast".into(), "safe".into()],
                    ChoiceCell::new(0),
                ),
            )
            .unwrap();

        let listing = table.render_for_scope(Scope::Global);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines[0], "Flags:");
        assert!(lines[1].contains("-v -verbose"));
        assert!(lines[2].contains("-app <name>"));
        assert!(lines[3].contains("-mode <fast|safe>"));
    }

    #[test]
    fn text_cell_keeps_preset_until_overwritten() {
        let cell = TextCell::with_value("staging");
        assert_eq!(cell.get().as_deref(), Some("staging"));

        cell.set("production".to_string());
        assert_eq!(cell.get().as_deref(), Some("production"));
    }
}
