//! Plugin contract: what a module exports and what it calls back into.
//!
//! A plugin is a Rust cdylib built against this crate with the same
//! toolchain as the host. The loader resolves [`INIT_SYMBOL`] in every
//! module it can load; when present, the entry point is invoked once with
//! the host registrar and is expected to register its commands and flags
//! before returning:
//!
//! ```ignore
//! use anvil::cli::{BoolCell, FlagDef, Registrar, RunOutcome, Scope};
//!
//! #[no_mangle]
//! pub fn anvil_plugin_init(registrar: &mut Registrar) -> i32 {
//!     let dry_run = BoolCell::new(false);
//!     let flag = dry_run.clone();
//!
//!     let id = registrar.register_command(
//!         "example",
//!         "An example command",
//!         Box::new(move |_args| {
//!             println!("hello from a plugin (dry_run: {})", flag.get());
//!             RunOutcome::success()
//!         }),
//!     );
//!     if let Some(id) = id {
//!         registrar.register_flag(
//!             Scope::Command(id),
//!             FlagDef::boolean("dry-run", "Do not touch anything", dry_run),
//!         );
//!     }
//!     anvil::plugins::INIT_OK
//! }
//! ```

use crate::cli::Registrar;

/// Symbol the loader resolves in every loaded module.
pub const INIT_SYMBOL: &[u8] = b"anvil_plugin_init";

/// Init status for a module that registered successfully.
pub const INIT_OK: i32 = 0;

/// Module init entry point. Returns [`INIT_OK`] on success; any other
/// status is reported and the module is otherwise left alone.
///
/// The entry point is resolved from a dynamic library, so the caller must
/// uphold the same-toolchain contract; hence `unsafe`.
pub type PluginInit = unsafe fn(&mut Registrar) -> i32;
