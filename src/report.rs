// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::cell::RefCell;
use std::io::{self, Write};

use colored::Colorize;

/// User facing progress output. Diagnostics go through `tracing`; this is what the user reads
/// on stdout. One reporter is created per run and passed to every stage.
pub struct Reporter {
    raw_output: bool,
    verbose: bool,
    out: RefCell<Box<dyn Write>>,
}

impl Reporter {
    /// A reporter writing to stdout. Raw output turns coloring off for the whole process.
    pub fn new(raw_output: bool, verbose: bool) -> Reporter {
        if raw_output {
            colored::control::set_override(false);
        }
        Reporter::with_writer(raw_output, verbose, io::stdout())
    }

    pub fn with_writer(raw_output: bool, verbose: bool, out: impl Write + 'static) -> Reporter {
        Reporter {
            raw_output,
            verbose,
            out: RefCell::new(Box::new(out)),
        }
    }

    fn write(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        // Best effort.
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }

    /// Starts a new section of output.
    pub fn section(&self, title: &str) {
        self.write(&format!("\n=== {} ===", title));
    }

    pub fn line(&self, text: &str) {
        self.write(text);
    }

    /// A labelled value, indented under the current section.
    pub fn item(&self, label: &str, value: &str) {
        self.write(&format!("  - {}: {}", label, value));
    }

    /// Only shown in verbose mode.
    pub fn detail(&self, text: &str) {
        if self.verbose {
            self.write(text);
        }
    }

    /// A highlighted message, colored unless raw output was requested.
    pub fn message(&self, text: &str) {
        if self.raw_output {
            self.write(text);
        } else {
            self.write(&text.bright_green().to_string());
        }
    }
}

#[cfg(test)]
pub mod capture {
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    /// A writer whose contents can be read back after it has been handed to a reporter.
    #[derive(Clone, Default)]
    pub struct Buffer {
        bytes: Rc<RefCell<Vec<u8>>>,
    }

    impl Buffer {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.bytes.borrow()).to_string()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::capture::Buffer;
    use super::*;

    #[test]
    fn test_raw_output() {
        let buffer = Buffer::default();
        let reporter = Reporter::with_writer(true, false, buffer.clone());
        reporter.section("Scanning Source Directory");
        reporter.item("Name", "Test Kit");
        reporter.message("Kit generated");
        reporter.detail("hidden");

        assert_eq!(
            buffer.contents(),
            "\n=== Scanning Source Directory ===\n  - Name: Test Kit\nKit generated\n"
        );
    }

    #[test]
    fn test_colored_and_verbose_output() {
        colored::control::set_override(true);
        let buffer = Buffer::default();
        let reporter = Reporter::with_writer(false, true, buffer.clone());
        reporter.message("done");
        reporter.detail("shown");

        assert_eq!(buffer.contents(), "\x1b[92mdone\x1b[0m\nshown\n");
    }
}
