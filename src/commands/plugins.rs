//! Builtin `plugins` command: build and install plugin modules.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::cli::{Registrar, RunOutcome};
use crate::commands::exec;
use crate::commands::HostContext;
use crate::term;

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

const SUBCOMMAND_HELP: &str = "\
Subcommands:
  (none)                Open the plugin directory
  build <crate-dir>     Build a plugin crate and install the module
  install <file>        Copy a prebuilt module into the plugin directory
";

pub fn register(registrar: &mut Registrar, ctx: HostContext) {
    let run_ctx = ctx;
    let id = registrar.register_command(
        "plugins",
        "Commands for creating and managing plugins",
        Box::new(move |args| run(&run_ctx, args)),
    );
    if let Some(id) = id {
        registrar.attach_help_extension(
            id,
            Box::new(|_| {
                print!("{SUBCOMMAND_HELP}");
                0
            }),
        );
    }
}

fn run(ctx: &HostContext, args: &[String]) -> RunOutcome {
    let Some(first) = args.first() else {
        return reveal(ctx);
    };

    match first.as_str() {
        "build" => match args.get(1) {
            Some(crate_dir) => report(build_module(ctx, Path::new(crate_dir))),
            None => {
                eprintln!("ERROR: `plugins build <crate-dir>` expects a plugin crate directory");
                RunOutcome::ShowHelp
            }
        },
        "install" => match args.get(1) {
            Some(file) => report(install_file(ctx, Path::new(file))),
            None => {
                eprintln!("ERROR: `plugins install <file>` expects a module file");
                RunOutcome::ShowHelp
            }
        },
        // A bare file argument installs it.
        file => report(install_file(ctx, Path::new(file))),
    }
}

fn report(result: Result<PathBuf>) -> RunOutcome {
    match result {
        Ok(installed) => {
            println!("Installed {}", installed.display());
            RunOutcome::success()
        }
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            RunOutcome::Status(1)
        }
    }
}

/// Opens the plugin directory in the platform file browser.
fn reveal(ctx: &HostContext) -> RunOutcome {
    if let Err(err) = fs::create_dir_all(&ctx.plugin_dir) {
        eprintln!(
            "ERROR: cannot create plugin directory {}: {err}",
            ctx.plugin_dir.display()
        );
        return RunOutcome::Status(1);
    }
    RunOutcome::Status(exec::run(OPENER, [ctx.plugin_dir.as_os_str()]))
}

/// `cargo build --release` the plugin crate, then install the produced
/// dynamic library.
fn build_module(ctx: &HostContext, crate_dir: &Path) -> Result<PathBuf> {
    let status = exec::run_in("cargo", ["build", "--release"], crate_dir);
    if status != 0 {
        bail!("cargo build failed with status {status}");
    }

    let artifact = find_module_artifact(&crate_dir.join("target").join("release"))?;
    install_file(ctx, &artifact)
}

fn find_module_artifact(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("no build output under {}", dir.display()))?;

    for entry in entries.flatten() {
        let path = entry.path();
        if matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("so") | Some("dylib") | Some("dll")
        ) {
            return Ok(path);
        }
    }
    bail!(
        "no dynamic library under {}; is the crate a cdylib?",
        dir.display()
    )
}

fn install_file(ctx: &HostContext, file: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .with_context(|| format!("'{}' has no file name", file.display()))?;
    let target = ctx.plugin_dir.join(name);

    if target.exists() {
        let overwrite = term::confirm(
            &format!("Overwrite existing module {}?", target.display()),
            ctx.assume_yes.get(),
            ctx.buffered_input,
        );
        if !overwrite {
            bail!("aborted");
        }
    }

    fs::create_dir_all(&ctx.plugin_dir).with_context(|| {
        format!("cannot create plugin directory {}", ctx.plugin_dir.display())
    })?;
    fs::copy(file, &target).with_context(|| {
        format!("failed to copy {} to {}", file.display(), target.display())
    })?;
    Ok(target)
}
