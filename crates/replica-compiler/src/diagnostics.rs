//! Non-fatal error reporting.
//!
//! Every problem the compiler finds is funnelled through a
//! [`DiagnosticSink`]. Reporting never unwinds, so one broken file cannot
//! stop its siblings from compiling.

use std::fmt;

/// Category of a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The generic parser rejected the file
    Syntax,
    /// A construct with no tagged AST counterpart
    Unsupported,
    /// A relative or aliased module is missing
    ModuleNotFound,
    /// A package directory has no package.json
    PackageNotFound,
    /// A package.json has no entry point
    PackageEntryNotFound,
    /// Two files import each other
    CircularImport,
    /// An identifier with no visible declaration
    Identifier,
    /// Two concrete types disagree
    Type,
    /// A name declared twice in one scope
    Redeclaration,
    /// Calling a non-function or passing too many arguments
    Call,
    /// A construct the selected target cannot lower
    Target,
    /// Reading a file failed
    Io,
}

impl DiagnosticKind {
    /// Returns the label printed in front of the message.
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::Syntax => "ParseError",
            DiagnosticKind::Unsupported => "UnsupportedSyntax",
            DiagnosticKind::ModuleNotFound => "ModuleNotFound",
            DiagnosticKind::PackageNotFound => "PackageNotFound",
            DiagnosticKind::PackageEntryNotFound => "PackageEntryNotFound",
            DiagnosticKind::CircularImport => "CircularImport",
            DiagnosticKind::Identifier => "IdentifierError",
            DiagnosticKind::Type => "TypeError",
            DiagnosticKind::Redeclaration => "Error",
            DiagnosticKind::Call => "CallError",
            DiagnosticKind::Target => "TargetError",
            DiagnosticKind::Io => "IOError",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Category
    pub kind: DiagnosticKind,
    /// File the problem was found in
    pub file: String,
    /// Human readable message
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    pub fn new(kind: DiagnosticKind, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: <{}> {}", self.kind, self.file, self.message)
    }
}

/// Receives diagnostics from every compiler pass.
pub trait DiagnosticSink {
    /// Records one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// The default sink: stores diagnostics and logs each one.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// All diagnostics reported so far, in order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes and returns everything reported so far.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        // callers render the collected entries themselves
        tracing::debug!(
            file = %diagnostic.file,
            kind = diagnostic.kind.label(),
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_report_and_count() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(Diagnostic::new(DiagnosticKind::Type, "a.js", "invalid conversion"));
        diagnostics.report(Diagnostic::new(DiagnosticKind::Identifier, "a.js", "x"));
        diagnostics.report(Diagnostic::new(DiagnosticKind::Type, "b.js", "invalid conversion"));

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.count(DiagnosticKind::Type), 2);
        assert_eq!(diagnostics.take().len(), 3);
        assert!(diagnostics.is_empty());
    }

    /// Shared buffer the log formatter writes into.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Log text produced while reporting one diagnostic at `level`.
    fn logged_at(level: tracing::Level) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mut diagnostics = Diagnostics::new();
            diagnostics.report(Diagnostic::new(DiagnosticKind::Type, "a.js", "invalid conversion"));
        });
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_reports_are_logged_only_at_debug() {
        assert!(logged_at(tracing::Level::WARN).is_empty());
        let debug = logged_at(tracing::Level::DEBUG);
        assert!(debug.contains("invalid conversion"));
        assert!(debug.contains("TypeError"));
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::Identifier,
            "main.js",
            "‘x’ was not declared in this scope",
        );
        assert_eq!(
            diagnostic.to_string(),
            "IdentifierError: <main.js> ‘x’ was not declared in this scope"
        );
    }
}
