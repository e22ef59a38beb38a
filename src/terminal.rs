//! The output a refresh driver draws on.
//!
//! [`Terminal`] is the seam between frame production and the actual device:
//! a byte sink plus the two questions the driver needs answered, how wide the
//! screen is and whether it is a terminal at all.

use std::io::{self, IsTerminal, Stderr, Stdout, Write};

/// A writable output that can report its geometry.
pub trait Terminal: Write + Send {
    /// Current width in columns, if it can be measured.
    fn columns(&self) -> Option<usize>;

    /// Whether the output is an interactive terminal. Live frames are only
    /// drawn on terminals.
    fn is_terminal(&self) -> bool;
}

fn probe_columns() -> Option<usize> {
    crossterm::terminal::size()
        .ok()
        .map(|(columns, _)| usize::from(columns))
        .filter(|&columns| columns > 0)
}

/// Standard output.
#[derive(Debug)]
pub struct StdoutTerminal {
    stdout: Stdout,
}

impl StdoutTerminal {
    /// Wraps the process's standard output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StdoutTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdout.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl Terminal for StdoutTerminal {
    fn columns(&self) -> Option<usize> {
        probe_columns()
    }

    fn is_terminal(&self) -> bool {
        self.stdout.is_terminal()
    }
}

/// Standard error, for tools that keep stdout for data.
#[derive(Debug)]
pub struct StderrTerminal {
    stderr: Stderr,
}

impl StderrTerminal {
    /// Wraps the process's standard error.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stderr: io::stderr(),
        }
    }
}

impl Default for StderrTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StderrTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stderr.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stderr.flush()
    }
}

impl Terminal for StderrTerminal {
    fn columns(&self) -> Option<usize> {
        probe_columns()
    }

    fn is_terminal(&self) -> bool {
        self.stderr.is_terminal()
    }
}


#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::{Terminal, testing::MemoryTerminal};

    #[test]
    fn test_memory_terminal_shares_output() {
        let term = MemoryTerminal::tty(40);
        let mut writer = term.clone();
        writer.write_all(b"abc").unwrap();
        assert_eq!(term.contents(), "abc");
        assert_eq!(term.columns(), Some(40));
        assert!(term.is_terminal());
        assert!(!MemoryTerminal::pipe().is_terminal());
    }
}
