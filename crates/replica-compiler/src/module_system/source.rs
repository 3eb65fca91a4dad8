// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Text source providers

use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::resolver::normalize_path;

/// Supplies raw file contents to the project
pub trait TextSource {
    /// Read a whole file as text
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Whether a file or directory exists at `path`
    fn exists(&self, path: &Path) -> bool;
}

/// Reads from the local file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl TextSource for FsSource {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory files, keyed by normalized path
///
/// Clones share the same files and read counter, so a test can keep a
/// handle and edit files after handing the source to a project.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    files: Rc<RefCell<FxHashMap<PathBuf, String>>>,
    reads: Rc<Cell<usize>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files
            .borrow_mut()
            .insert(normalize_path(path.as_ref()), text.into());
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_file(self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Shared counter of successful reads
    pub fn read_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.reads)
    }
}

impl TextSource for MemorySource {
    fn read(&self, path: &Path) -> io::Result<String> {
        match self.files.borrow().get(&normalize_path(path)) {
            Some(text) => {
                self.reads.set(self.reads.get() + 1);
                Ok(text.clone())
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        let path = normalize_path(path);
        let files = self.files.borrow();
        files.contains_key(&path) || files.keys().any(|file| file.starts_with(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_reads_and_counts() {
        let source = MemorySource::new().with_file("/p/src/a.js", "let a = 1;");
        let counter = source.read_counter();

        assert_eq!(source.read(Path::new("/p/src/./a.js")).unwrap(), "let a = 1;");
        assert_eq!(counter.get(), 1);
        assert!(source.read(Path::new("/p/src/b.js")).is_err());
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_memory_source_clones_share_files() {
        let source = MemorySource::new().with_file("/p/a.js", "1;");
        let handle = source.clone();
        handle.insert("/p/a.js", "2;");
        assert_eq!(source.read(Path::new("/p/a.js")).unwrap(), "2;");
    }

    #[test]
    fn test_memory_source_directories_exist() {
        let source = MemorySource::new().with_file("/p/node_modules/lib/package.json", "{}");
        assert!(source.exists(Path::new("/p/node_modules/lib")));
        assert!(!source.exists(Path::new("/p/node_modules/other")));
    }

    #[test]
    fn test_fs_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.js");
        std::fs::write(&file, "1;").unwrap();

        assert!(FsSource.exists(&file));
        assert_eq!(FsSource.read(&file).unwrap(), "1;");
        assert!(!FsSource.exists(&dir.path().join("b.js")));
    }
}
