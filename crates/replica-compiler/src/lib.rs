// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # replica-compiler
//!
//! A compiler for a JavaScript subset.
//!
//! ## Overview
//!
//! Source files go through a fixed pipeline:
//! - Lexer and recursive-descent parser producing a generic syntax tree
//! - Translation into a tagged, arena-allocated AST with one scope per block
//! - Name resolution and type inference over Dynamic/Number/String/Function
//! - Optional constant folding
//! - Code generation, either to script text or to a stack-machine module
//!
//! A [`Project`] loads files and their imports; [`compile`] drives one run.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use replica_compiler::{compile, CompileContext, CompileOptions, Config, Project};
//!
//! let mut project = Project::new(&Config::with_root("/srv/app"));
//! let main = project.parse("src/main.js");
//! let mut ctx = CompileContext::new(CompileOptions::default());
//! let output = compile(&mut project, &mut ctx, main)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod module_system;
pub mod optimizer;
pub mod parser;
pub mod project;
pub mod resolver;
pub mod syntax;
pub mod targets;

// Re-exports for convenience
pub use config::{CompileMode, CompileOptions, Config, Target};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Diagnostics};
pub use driver::{compile, get_imports, CompileContext, CompileOutput};
pub use error::{CompileError, Result};
pub use project::{FileId, Project, SourceFile};
