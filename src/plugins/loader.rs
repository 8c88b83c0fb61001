//! Module discovery and initialization.
//!
//! One misbehaving module never prevents the rest from loading, nor aborts
//! the host: enumeration failures mean "no plugins", load failures skip the
//! candidate, and a failing init entry point is reported and ignored.

use std::env;
use std::fs;
use std::io;
use std::mem::ManuallyDrop;
use std::path::{Path, PathBuf};

use libloading::Library;
use scopeguard::defer;
use thiserror::Error;

use crate::cli::Registrar;
use crate::plugins::api::{PluginInit, INIT_OK, INIT_SYMBOL};

/// Errors from the loading seam.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to enumerate plugin directory '{dir}': {source}")]
    Enumerate {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load module '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: libloading::Error,
    },
}

/// Where modules come from. The platform-specific dynamic-loading
/// mechanism stays behind this seam.
pub trait ModuleSource {
    type Module: PluginModule;

    /// Direct entries of the source, one candidate per loadable module.
    fn enumerate(&self) -> Result<Vec<PathBuf>, LoadError>;

    fn load(&self, candidate: &Path) -> Result<Self::Module, LoadError>;
}

/// A loaded module whose init entry point may be resolved.
pub trait PluginModule {
    fn name(&self) -> &str;

    /// The well-known init entry point, when the module exports one. A
    /// module without one stays loaded but is never initialized.
    fn resolve_init(&self) -> Option<PluginInit>;
}

/// A dynamic library kept mapped for the life of the process. Registered
/// entry points may point into the module image, so unloading is never
/// attempted.
pub struct DylibModule {
    name: String,
    library: ManuallyDrop<Library>,
}

impl PluginModule for DylibModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve_init(&self) -> Option<PluginInit> {
        // SAFETY: the symbol type is fixed by the plugin contract, and the
        // library stays mapped for the life of the process, so the copied
        // fn pointer cannot dangle.
        unsafe {
            self.library
                .get::<PluginInit>(INIT_SYMBOL)
                .ok()
                .map(|symbol| *symbol)
        }
    }
}

/// Plugin directory source. Candidates are plain file names; loading
/// resolves them relative to the working directory, which the driver has
/// set to the plugin directory.
pub struct PluginDir {
    dir: PathBuf,
}

impl PluginDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ModuleSource for PluginDir {
    type Module = DylibModule;

    fn enumerate(&self) -> Result<Vec<PathBuf>, LoadError> {
        let map_err = |source| LoadError::Enumerate {
            dir: self.dir.clone(),
            source,
        };

        // read_dir already omits the `.`/`..` pseudo-entries.
        let mut candidates = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(map_err)? {
            candidates.push(PathBuf::from(entry.map_err(map_err)?.file_name()));
        }
        Ok(candidates)
    }

    fn load(&self, candidate: &Path) -> Result<DylibModule, LoadError> {
        let name = candidate.display().to_string();

        // The explicit `./` prefix keeps resolution in the working
        // directory instead of the system library search path.
        //
        // SAFETY: loading runs the module's constructors; the host does not
        // sandbox plugins, by contract.
        let library = unsafe { Library::new(Path::new(".").join(candidate)) }.map_err(|source| {
            LoadError::Load {
                name: name.clone(),
                source,
            }
        })?;

        Ok(DylibModule {
            name,
            library: ManuallyDrop::new(library),
        })
    }
}

/// Loads every candidate from `source` and runs each module's init entry
/// point against `registrar`. Failures are isolated per module.
pub fn initialize_modules<S: ModuleSource>(source: &S, registrar: &mut Registrar) -> Vec<S::Module> {
    let candidates = match source.enumerate() {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::debug!("{err}");
            return Vec::new();
        }
    };

    let mut modules = Vec::new();
    for candidate in candidates {
        tracing::debug!("loading module {}", candidate.display());

        let module = match source.load(&candidate) {
            Ok(module) => module,
            Err(err) => {
                tracing::debug!("{err}");
                continue;
            }
        };

        if let Some(init) = module.resolve_init() {
            // SAFETY: init is the module's declared entry point; the
            // same-toolchain contract makes the signature trustworthy.
            let status = unsafe { init(registrar) };
            if status != INIT_OK {
                tracing::warn!(
                    "module '{}' failed to initialize (status {status})",
                    module.name()
                );
            }
        } else {
            tracing::debug!("module '{}' exports no init entry point", module.name());
        }

        modules.push(module);
    }
    modules
}

/// Production entry point: load from the plugin directory with the working
/// directory set to it for the duration, restored unconditionally.
pub fn load_plugins(dir: &Path, registrar: &mut Registrar) -> Vec<DylibModule> {
    tracing::debug!("plugin directory: {}", dir.display());

    let prior = match env::current_dir() {
        Ok(prior) => prior,
        Err(err) => {
            tracing::warn!("cannot determine working directory: {err}");
            return Vec::new();
        }
    };
    if let Err(err) = env::set_current_dir(dir) {
        tracing::debug!("plugin directory {} unavailable: {err}", dir.display());
        return Vec::new();
    }
    defer! {
        let _ = env::set_current_dir(&prior);
    }

    initialize_modules(&PluginDir::new(dir), registrar)
}
