//! Indentation-aware text output.
//!
//! Heptagon delimits blocks with keywords (`let ... tel`, `do ... end`)
//! rather than braces, so [`CodeFormatter::block`] takes both delimiters.

use std::fmt::Display;

/// A line-oriented writer that prefixes each line with the current
/// indentation.
#[derive(Debug)]
pub struct CodeFormatter {
    lines: Vec<String>,
    depth: usize,
    unit: String,
}

impl CodeFormatter {
    /// Create a formatter indenting by `unit` per level.
    pub fn new(unit: &str) -> Self {
        Self {
            lines: Vec::new(),
            depth: 0,
            unit: unit.to_string(),
        }
    }

    /// Two spaces per level.
    pub fn default_indent() -> Self {
        Self::new("  ")
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Append one or more lines at the current depth. Empty lines stay empty.
    pub fn writeln(&mut self, text: &str) {
        for line in text.split('\n') {
            if line.is_empty() {
                self.lines.push(String::new());
            } else {
                self.lines.push(format!("{}{}", self.unit.repeat(self.depth), line));
            }
        }
    }

    /// Append an empty line.
    pub fn newline(&mut self) {
        self.lines.push(String::new());
    }

    /// Write `open`, the body produced by `f` one level deeper, then `close`.
    pub fn block<F: FnOnce(&mut Self)>(&mut self, open: &str, close: &str, f: F) {
        self.writeln(open);
        self.indent();
        f(self);
        self.dedent();
        self.writeln(close);
    }

    /// The text written so far, each line newline-terminated.
    pub fn finish(self) -> String {
        let mut out = String::new();
        for line in self.lines {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// Join the `Display` forms of `items` with `sep`.
pub fn format_list<T: Display>(items: &[T], sep: &str) -> String {
    format_list_with(items, sep, |x| x.to_string())
}

/// Join `f(item)` for each item with `sep`.
pub fn format_list_with<T, F: Fn(&T) -> String>(items: &[T], sep: &str, f: F) -> String {
    items.iter().map(f).collect::<Vec<_>>().join(sep)
}
