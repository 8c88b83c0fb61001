//! Two-pass flag parser.
//!
//! The builtin pass runs before any module is loaded, when only the host's
//! own global flags are registered, so flags like `-verbose` and `-yes` can
//! affect the loading phase itself. The main pass runs after module init
//! and additionally extracts the selected command and its residual
//! arguments. Both passes share one scan and write bound flag storage in
//! place; every failure is a diagnostic plus continuation, never an abort.

use crate::cli::flags::{FlagBinding, FlagTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Unknown-flag diagnostics suppressed, command name not extracted.
    Builtin,
    Main,
}

/// What the main pass produced.
#[derive(Debug, Default)]
pub struct ParseReport {
    /// First non-flag token, if any.
    pub command: Option<String>,
    /// Everything after the command name, unparsed.
    pub args: Vec<String>,
    /// Diagnostics to print; parsing already continued past each of them.
    pub diagnostics: Vec<String>,
}

/// Builtin pass over `argv` (program name already stripped). Returns the
/// diagnostics to print; unknown flags are not reported since most flags
/// are not registered yet.
pub fn parse_builtin(argv: &[String], flags: &FlagTable) -> Vec<String> {
    scan(argv, flags, Pass::Builtin).diagnostics
}

/// Main pass over `argv` (program name already stripped).
pub fn parse_main(argv: &[String], flags: &FlagTable) -> ParseReport {
    scan(argv, flags, Pass::Main)
}

fn scan(argv: &[String], flags: &FlagTable, pass: Pass) -> ParseReport {
    let mut report = ParseReport::default();

    let mut i = 0;
    while i < argv.len() {
        let arg = &argv[i];
        if !arg.starts_with('-') {
            break;
        }

        // One or two leading dashes are accepted and treated identically.
        let mut name = &arg[1..];
        if let Some(stripped) = name.strip_prefix('-') {
            name = stripped;
        }

        let inverse = match name.strip_prefix("no-") {
            Some(stripped) => {
                name = stripped;
                true
            }
            None => false,
        };

        let (name, inline_value) = match name.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (name, None),
        };

        // Negation is only meaningful for Bool flags; an inverse request
        // against anything else falls through to the unknown-flag path.
        let resolved = flags.lookup(name).filter(|flag| {
            !inverse || matches!(flag.binding, FlagBinding::Bool(_))
        });
        let Some(flag) = resolved else {
            if pass == Pass::Main {
                report.diagnostics.push(format!("Unknown flag {arg}"));
            }
            i += 1;
            continue;
        };

        match &flag.binding {
            // An inline `=value` is accepted syntactically and ignored;
            // the `no-` prefix is the Bool value grammar.
            FlagBinding::Bool(cell) => cell.set(!inverse),

            FlagBinding::Text(cell) => {
                if let Some(value) = inline_value {
                    cell.set(value.to_string());
                } else if i + 1 < argv.len() {
                    i += 1;
                    cell.set(argv[i].clone());
                } else {
                    report
                        .diagnostics
                        .push(format!("No value argument after {arg}"));
                }
            }

            // A Choice value comes only from the following token; an inline
            // `=value` is ignored and the following token is still consumed.
            FlagBinding::Choice { options, cell } => {
                if i + 1 < argv.len() {
                    i += 1;
                    let value = &argv[i];
                    match options.iter().position(|option| option == value) {
                        Some(index) => cell.set(index),
                        None => report.diagnostics.push(format!(
                            "Invalid value {value} for {arg}. Expected ({})",
                            options.join("|")
                        )),
                    }
                } else {
                    report
                        .diagnostics
                        .push(format!("No value argument after {arg}"));
                }
            }
        }

        i += 1;
    }

    if pass == Pass::Main && i < argv.len() {
        report.command = Some(argv[i].clone());
        report.args = argv[i + 1..].to_vec();
    }

    report
}
