//! Confirmation prompts.

use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Asks `message` with a `y/[n]` prompt. `assume_yes` answers without
/// reading input (the global `-yes` flag); `buffered` reads a full line
/// instead of a single key.
pub fn confirm(message: &str, assume_yes: bool, buffered: bool) -> bool {
    print!("{message}\ny/[n] > ");
    let _ = io::stdout().flush();

    if assume_yes {
        println!("y");
        return true;
    }

    if buffered {
        read_line_answer()
    } else {
        read_key_answer()
    }
}

fn is_yes(answer: char) -> bool {
    matches!(answer, 'y' | 'Y' | '1')
}

fn read_line_answer() -> bool {
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    line.trim().chars().next().is_some_and(is_yes)
}

fn read_key_answer() -> bool {
    let guard = match RawModeGuard::enable() {
        Ok(guard) => guard,
        // No terminal to put into raw mode; a line read still works.
        Err(_) => return read_line_answer(),
    };

    let key = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Some(key.code),
            Ok(_) => continue,
            Err(_) => break None,
        }
    };
    drop(guard);

    match key {
        Some(KeyCode::Char(c)) => {
            println!("{c}");
            is_yes(c)
        }
        Some(_) => {
            println!();
            false
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_answers() {
        assert!(is_yes('y'));
        assert!(is_yes('Y'));
        assert!(is_yes('1'));
        assert!(!is_yes('n'));
        assert!(!is_yes('\n'));
    }
}
