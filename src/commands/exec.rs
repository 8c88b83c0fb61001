//! Subprocess helper for builtin commands.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Command;

/// Exit status for a program that could not be found, mirroring the shell
/// convention. Reserved for exactly this meaning.
pub const NOT_FOUND_STATUS: i32 = 127;

/// Runs `program` with `args`, waits, and returns its exit status.
pub fn run<I, S>(program: &str, args: I) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    wait(Command::new(program).args(args), program)
}

/// Like [`run`], with the child's working directory set to `dir`.
pub fn run_in<I, S>(program: &str, args: I, dir: &Path) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    wait(Command::new(program).args(args).current_dir(dir), program)
}

fn wait(command: &mut Command, program: &str) -> i32 {
    match command.status() {
        // A child killed by a signal has no code; report plain failure.
        Ok(status) => status.code().unwrap_or(1),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            eprintln!("{program}: command not found");
            NOT_FOUND_STATUS
        }
        Err(err) => {
            eprintln!("failed to run {program}: {err}");
            1
        }
    }
}
