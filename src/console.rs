//! Interactive input and output.
//!
//! Everything the pipeline asks or tells the user goes through [`Console`],
//! so batch runs and tests can supply canned input and capture output.

use std::io::{self, BufRead, Stderr, StdinLock, Stdout, Write};

use crate::constants;

/// The user-facing side of the tool.
pub trait Console {
    /// Print `prompt` without a newline and read one line of input.
    ///
    /// Returns `None` at end of input. The line terminator is stripped.
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Print a line to standard output.
    fn say(&mut self, line: &str) -> io::Result<()>;

    /// Print an error to standard error, prefixed with `Error: `.
    fn error(&mut self, message: &str);
}

/// A [`Console`] over arbitrary reader and writers.
#[derive(Debug)]
pub struct Terminal<R, W, E> {
    input: R,
    out: W,
    err: E,
}

impl Terminal<StdinLock<'static>, Stdout, Stderr> {
    /// Console on the process's standard streams.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout(), io::stderr())
    }
}

impl<R, W, E> Terminal<R, W, E> {
    pub fn new(input: R, out: W, err: E) -> Self {
        Self { input, out, err }
    }

    /// Output and error sinks, for inspection.
    pub fn into_parts(self) -> (R, W, E) {
        (self.input, self.out, self.err)
    }
}

impl<R: BufRead, W: Write, E: Write> Console for Terminal<R, W, E> {
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")
    }

    fn error(&mut self, message: &str) {
        let _ = writeln!(self.err, "{}{message}", constants::ERROR_PREFIX);
    }
}
