use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::error::BootstrapError;
use crate::model::phase::Phase;

/// Receives progress of a bootstrap run.
pub trait Reporter {
    fn phase(&mut self, phase: Phase, detail: &str);
    fn finished(&mut self);
    fn failed(&mut self, err: &BootstrapError);
}

/// Colored status lines on the terminal. Status goes to `out`, failures to `err`.
pub struct ConsoleReporter<O: Write, E: Write> {
    out: O,
    err: E,
}

impl ConsoleReporter<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    #[cfg(test)]
    fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> Reporter for ConsoleReporter<O, E> {
    fn phase(&mut self, phase: Phase, detail: &str) {
        let label = phase.label().bold();
        let line = if detail.is_empty() {
            format!("{} {label}...", "==>".blue().bold())
        } else {
            format!("{} {label}: {}", "==>".blue().bold(), detail.dark_grey())
        };
        // Status output is best effort; a closed stdout must not abort the run.
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }

    fn finished(&mut self) {
        let _ = writeln!(self.out, "{}", "Installer finished successfully.".green().bold());
        let _ = self.out.flush();
    }

    fn failed(&mut self, err: &BootstrapError) {
        let _ = writeln!(self.err, "{} {err}", "error:".red().bold());
        let _ = self.err.flush();
    }
}
