// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the compiler core

use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostics::DiagnosticKind;
use crate::syntax::SyntaxError;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors that stop the compilation of a single file
#[derive(Debug, Error)]
pub enum CompileError {
    /// The generic parser rejected the source
    #[error("SyntaxError: {0}")]
    Syntax(#[from] SyntaxError),

    /// A construct the tagged AST cannot represent
    #[error("unsupported syntax: {0}")]
    Unsupported(String),

    /// Relative or aliased module missing
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(String),

    /// Package directory without a package.json
    #[error("Cannot find package.json for '{0}'")]
    PackageNotFound(String),

    /// package.json without a usable `main`
    #[error("Package '{0}' has no entry point")]
    PackageEntryNotFound(String),

    /// An import reached a file that is still being parsed
    #[error("Circular import detected in \"{file}\" because of importing \"{import}\"")]
    CircularImport {
        /// The file whose parse detected the cycle
        file: PathBuf,
        /// The file it tried to import
        import: PathBuf,
    },

    /// A file id that the project never handed out
    #[error("Unknown source file #{0}")]
    UnknownFile(u32),

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompileError {
    /// Create an unsupported-syntax error
    pub fn unsupported(kind: impl Into<String>) -> Self {
        CompileError::Unsupported(kind.into())
    }

    /// Create a module-not-found error
    pub fn module_not_found(specifier: impl Into<String>) -> Self {
        CompileError::ModuleNotFound(specifier.into())
    }

    /// Create a circular-import error
    pub fn circular(file: impl Into<PathBuf>, import: impl Into<PathBuf>) -> Self {
        CompileError::CircularImport {
            file: file.into(),
            import: import.into(),
        }
    }

    /// The diagnostic category this error is reported under
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            CompileError::Syntax(_) => DiagnosticKind::Syntax,
            CompileError::Unsupported(_) => DiagnosticKind::Unsupported,
            CompileError::ModuleNotFound(_) => DiagnosticKind::ModuleNotFound,
            CompileError::PackageNotFound(_) => DiagnosticKind::PackageNotFound,
            CompileError::PackageEntryNotFound(_) => DiagnosticKind::PackageEntryNotFound,
            CompileError::CircularImport { .. } => DiagnosticKind::CircularImport,
            CompileError::UnknownFile(_) | CompileError::Io(_) | CompileError::Json(_) => {
                DiagnosticKind::Io
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_message_names_both_files() {
        let err = CompileError::circular("/p/a.js", "/p/b.js");
        let message = err.to_string();
        assert!(message.contains("/p/a.js"));
        assert!(message.contains("/p/b.js"));
        assert_eq!(err.kind(), DiagnosticKind::CircularImport);
    }

    #[test]
    fn test_syntax_error_conversion() {
        let err: CompileError = SyntaxError {
            message: "Unexpected token".to_string(),
            line: 2,
            column: 5,
        }
        .into();
        assert_eq!(err.to_string(), "SyntaxError: Unexpected token (2:5)");
        assert_eq!(err.kind(), DiagnosticKind::Syntax);
    }
}
