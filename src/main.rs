use std::env;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use anvil::cli::{
    dispatch, parse_builtin, parse_main, render_usage, BoolCell, FlagDef, Registrar,
};
use anvil::commands::{register_builtins, HostContext};
use anvil::config::Config;
use anvil::plugins::load_plugins;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The host's own global flags, readable after either parse pass.
struct HostFlags {
    help: BoolCell,
    version: BoolCell,
    verbose: BoolCell,
    yes: BoolCell,
}

impl HostFlags {
    fn register(registrar: &mut Registrar) -> Self {
        let flags = Self {
            help: BoolCell::new(false),
            version: BoolCell::new(false),
            verbose: BoolCell::new(false),
            yes: BoolCell::new(false),
        };

        registrar.register_global_flag(
            FlagDef::boolean("help", "Prints help information", flags.help.clone())
                .with_alias("h"),
        );
        registrar.register_global_flag(FlagDef::boolean(
            "version",
            "Prints version information",
            flags.version.clone(),
        ));
        registrar.register_global_flag(
            FlagDef::boolean("verbose", "Enable verbose output", flags.verbose.clone())
                .with_alias("v"),
        );
        registrar.register_global_flag(
            FlagDef::boolean("yes", "Automatic 'yes' to all prompts", flags.yes.clone())
                .with_alias("y"),
        );

        flags
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "anvil=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let mut argv: Vec<String> = env::args().collect();
    let program = if argv.is_empty() {
        "anvil".to_string()
    } else {
        argv.remove(0)
    };

    let mut registrar = Registrar::new();
    let host_flags = HostFlags::register(&mut registrar);

    // Builtin pass: only the host's own global flags exist yet, so
    // -verbose and -yes can shape the loading phase below.
    for diagnostic in parse_builtin(&argv, registrar.flags()) {
        eprintln!("{diagnostic}");
    }

    init_tracing(host_flags.verbose.get());

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("{err}; using defaults");
            Config::default()
        }
    };

    let ctx = HostContext {
        plugin_dir: config.plugin_dir(),
        assume_yes: host_flags.yes.clone(),
        buffered_input: config.buffered_input,
    };
    register_builtins(&mut registrar, &ctx);

    // Module images stay mapped until process exit.
    let _modules = load_plugins(&ctx.plugin_dir, &mut registrar);

    let invocation = parse_main(&argv, registrar.flags());
    for diagnostic in &invocation.diagnostics {
        eprintln!("{diagnostic}");
    }

    if host_flags.version.get() {
        println!("{VERSION}");
        return ExitCode::SUCCESS;
    }

    let Some(command) = &invocation.command else {
        print!("{}", render_usage(&program, &registrar));
        return if host_flags.help.get() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    };

    let status = dispatch(&registrar, command, &invocation.args, host_flags.help.get());
    ExitCode::from(status.clamp(0, 255) as u8)
}
