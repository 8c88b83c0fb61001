//! Dispatch - resolve the selected command, then run it or document it.

use crate::cli::flags::Scope;
use crate::cli::host::Registrar;
use crate::cli::registry::{CommandDef, CommandId, RunOutcome};

/// Full usage screen: global flags plus every registered command.
pub fn render_usage(program: &str, registrar: &Registrar) -> String {
    let mut out = format!("Usage: {program} [flags] <command> <args>\n\n");
    out.push_str(&registrar.flags().render_for_scope(Scope::Global));

    let commands = registrar.commands();
    if !commands.is_empty() {
        out.push_str("\nCommands:\n");
        for def in commands.iter() {
            out.push_str(&format!("  {:<20} {}\n", def.name(), def.help()));
        }
    }
    out
}

/// Help screen for one command: its name, help text, and scoped flags.
pub fn render_command_help(registrar: &Registrar, id: CommandId, def: &CommandDef) -> String {
    format!(
        "{}: {}\n\n{}",
        def.name(),
        def.help(),
        registrar.flags().render_for_scope(Scope::Command(id))
    )
}

/// Resolves `command` and either runs it or renders its help. The returned
/// value is the process exit status: 1 for an unknown command, otherwise
/// the command's own status. The `ShowHelp` outcome is consumed here.
pub fn dispatch(
    registrar: &Registrar,
    command: &str,
    args: &[String],
    help_requested: bool,
) -> i32 {
    let Some((id, def)) = registrar.commands().find(command) else {
        eprintln!("Unknown command {command}");
        return 1;
    };

    if help_requested {
        return show_help(registrar, id, def, args);
    }

    match def.invoke(args) {
        RunOutcome::Status(status) => status,
        RunOutcome::ShowHelp => show_help(registrar, id, def, args),
    }
}

/// Help rendering never invokes the run entry point. The help extension,
/// when attached, decides the status; otherwise this is a success.
fn show_help(registrar: &Registrar, id: CommandId, def: &CommandDef, args: &[String]) -> i32 {
    print!("{}", render_command_help(registrar, id, def));

    if !def.has_help_ext() {
        return 0;
    }
    println!();
    def.invoke_help_ext(args).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::flags::{BoolCell, FlagDef};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unknown_command_fails_without_running_anything() {
        let ran = Rc::new(RefCell::new(false));
        let seen = ran.clone();

        let mut registrar = Registrar::new();
        registrar.register_command(
            "real",
            "",
            Box::new(move |_| {
                *seen.borrow_mut() = true;
                RunOutcome::success()
            }),
        );

        assert_eq!(dispatch(&registrar, "missing", &[], false), 1);
        assert!(!*ran.borrow());
    }

    #[test]
    fn run_status_becomes_the_exit_status() {
        let mut registrar = Registrar::new();
        registrar.register_command("fail", "", Box::new(|_| RunOutcome::Status(3)));

        assert_eq!(dispatch(&registrar, "fail", &[], false), 3);
    }

    #[test]
    fn residual_args_reach_the_run_entry_point() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();

        let mut registrar = Registrar::new();
        registrar.register_command(
            "echo",
            "",
            Box::new(move |args| {
                *sink.borrow_mut() = args.to_vec();
                RunOutcome::success()
            }),
        );

        dispatch(&registrar, "echo", &argv(&["--flag", "x", "extra"]), false);
        assert_eq!(*received.borrow(), argv(&["--flag", "x", "extra"]));
    }

    #[test]
    fn help_request_skips_the_run_entry_point() {
        let ran = Rc::new(RefCell::new(false));
        let seen = ran.clone();

        let mut registrar = Registrar::new();
        registrar.register_command(
            "cmd",
            "does things",
            Box::new(move |_| {
                *seen.borrow_mut() = true;
                RunOutcome::success()
            }),
        );

        assert_eq!(dispatch(&registrar, "cmd", &[], true), 0);
        assert!(!*ran.borrow());
    }

    #[test]
    fn help_extension_status_is_propagated() {
        let mut registrar = Registrar::new();
        let id = registrar
            .register_command("cmd", "", Box::new(|_| RunOutcome::success()))
            .unwrap();
        registrar.attach_help_extension(id, Box::new(|_| 5));

        assert_eq!(dispatch(&registrar, "cmd", &[], true), 5);
    }

    #[test]
    fn show_help_outcome_is_consumed_not_propagated() {
        let mut registrar = Registrar::new();
        registrar.register_command("cmd", "", Box::new(|_| RunOutcome::ShowHelp));

        // Help renders with success, not with the sentinel's raw value.
        assert_eq!(dispatch(&registrar, "cmd", &[], false), 0);
    }

    #[test]
    fn command_help_lists_only_its_own_flags() {
        let mut registrar = Registrar::new();
        let id = registrar
            .register_command("deploy", "Ship it", Box::new(|_| RunOutcome::success()))
            .unwrap();
        registrar.register_global_flag(FlagDef::boolean("verbose", "", BoolCell::new(false)));
        registrar.register_flag(
            crate::cli::flags::Scope::Command(id),
            FlagDef::boolean("force", "Skip checks", BoolCell::new(false)),
        );

        let def = registrar.commands().get(id).unwrap();
        let help = render_command_help(&registrar, id, def);
        assert!(help.starts_with("deploy: Ship it"));
        assert!(help.contains("-force"));
        assert!(!help.contains("-verbose"));
    }

    #[test]
    fn usage_lists_global_flags_and_all_commands() {
        let mut registrar = Registrar::new();
        registrar.register_global_flag(FlagDef::boolean(
            "verbose",
            "Enable verbose output",
            BoolCell::new(false),
        ));
        registrar.register_command("one", "First command", Box::new(|_| RunOutcome::success()));
        registrar.register_command("two", "Second command", Box::new(|_| RunOutcome::success()));

        let usage = render_usage("anvil", &registrar);
        assert!(usage.starts_with("Usage: anvil [flags] <command> <args>"));
        assert!(usage.contains("-verbose"));
        assert!(usage.contains("one"));
        assert!(usage.contains("two"));
    }

    #[test]
    fn usage_omits_the_command_section_when_nothing_is_registered() {
        let registrar = Registrar::new();
        let usage = render_usage("anvil", &registrar);
        assert!(!usage.contains("Commands:"));
    }
}
