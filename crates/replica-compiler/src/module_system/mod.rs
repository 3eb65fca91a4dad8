// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loading collaborators
//!
//! - [`TextSource`] supplies file contents (the file system, or memory in tests)
//! - [`ModuleResolver`] turns import specifiers into absolute paths:
//!   relative paths, the library alias table and `node_modules` packages

mod resolver;
mod source;

pub use resolver::{normalize_path, parse_package_specifier, ModuleResolver, PackageJson};
pub use source::{FsSource, MemorySource, TextSource};
