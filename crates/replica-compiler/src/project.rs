// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Source file registry
//!
//! A [`Project`] owns every [`SourceFile`] it has seen, keyed by absolute
//! path (case-insensitive). Parsing a file loads its imports depth-first;
//! a file that imports one still being parsed fails with a circular import
//! error. Errors fatal to a file are reported as diagnostics and leave the
//! file without a block, so it contributes nothing to any output.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::ast::{Ast, NodeId, NodeKind};
use crate::config::Config;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics};
use crate::error::{CompileError, Result};
use crate::module_system::{normalize_path, FsSource, ModuleResolver, TextSource};
use crate::parser::{self, Translation};
use crate::{optimizer, resolver};

/// Identifier of a source file, unique within a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) u32);

impl FileId {
    /// Position in load order
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an imported local name comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// The imported file
    pub file: FileId,
    /// Name exported by that file (`default` or `*` for the special forms)
    pub name: String,
}

/// One loaded module
#[derive(Debug)]
pub struct SourceFile {
    /// Unique id
    pub id: FileId,
    /// Absolute normalized path
    pub path: PathBuf,
    /// Project root the file was loaded under
    pub root_path: PathBuf,
    /// File name without directories
    pub filename: String,
    /// Lowercase extension without the dot
    pub extname: String,
    /// Nodes and scopes
    pub ast: Ast,
    /// Root Block; `None` when the last parse failed
    pub block: Option<NodeId>,
    /// Directly imported files, in source order, without duplicates
    pub imports: Vec<FileId>,
    /// Imported local names
    pub imports_map: FxHashMap<String, ImportBinding>,
    /// Exported declarations and export specifiers
    pub exports: Vec<NodeId>,
    /// Whether the file has an `export default`
    pub export_default: bool,
    /// Epoch of the last compile that visited this file
    pub compile_index: u32,
    /// Set while the file is being parsed
    pub parsing: bool,
    /// Set once the resolver ran over the current parse
    pub resolved: bool,
    /// Set once the optimizer ran over the current parse
    pub optimized: bool,
}

impl SourceFile {
    fn new(id: FileId, path: PathBuf, root_path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extname = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self {
            id,
            path,
            root_path,
            filename,
            extname,
            ast: Ast::new(),
            block: None,
            imports: Vec::new(),
            imports_map: FxHashMap::default(),
            exports: Vec::new(),
            export_default: false,
            compile_index: 0,
            parsing: false,
            resolved: false,
            optimized: false,
        }
    }

    /// Path relative to the project root, with forward slashes
    pub fn relative_path(&self) -> String {
        let relative = self.path.strip_prefix(&self.root_path).unwrap_or(&self.path);
        relative.to_string_lossy().replace('\\', "/")
    }

    /// Forget everything derived from the file's text
    fn reset(&mut self) {
        self.ast = Ast::new();
        self.block = None;
        self.imports.clear();
        self.imports_map.clear();
        self.exports.clear();
        self.export_default = false;
        self.resolved = false;
        self.optimized = false;
    }
}

/// Registry of every source file in a build
pub struct Project {
    files: Vec<SourceFile>,
    by_path: FxHashMap<String, FileId>,
    source: Box<dyn TextSource>,
    resolver: ModuleResolver,
    globals: FxHashSet<String>,
    diagnostics: Diagnostics,
}

impl Project {
    /// Create a project reading from the file system
    pub fn new(config: &Config) -> Self {
        Self::with_source(config, FsSource)
    }

    /// Create a project reading from `source`
    pub fn with_source(config: &Config, source: impl TextSource + 'static) -> Self {
        let mut resolver = ModuleResolver::new(&config.root);
        for (name, path) in &config.aliases {
            resolver.add_alias(name.clone(), path);
        }
        Self {
            files: Vec::new(),
            by_path: FxHashMap::default(),
            source: Box::new(source),
            resolver,
            globals: config.globals.iter().cloned().collect(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// The project root
    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// Register a library alias for bare imports
    pub fn add_library(&mut self, name: impl Into<String>, path: impl AsRef<Path>) {
        self.resolver.add_alias(name, path);
    }

    /// Host names that resolve without a declaration
    pub fn globals(&self) -> &FxHashSet<String> {
        &self.globals
    }

    /// Everything reported so far
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Mutable access to the diagnostics, for later passes
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Look a loaded file up
    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// Look a loaded file up mutably
    pub fn file_mut(&mut self, id: FileId) -> Option<&mut SourceFile> {
        self.files.get_mut(id.index())
    }

    /// A file together with the diagnostics, for generators that report
    pub(crate) fn file_with_diagnostics(
        &mut self,
        id: FileId,
    ) -> Option<(&SourceFile, &mut Diagnostics)> {
        let file = self.files.get(id.index())?;
        Some((file, &mut self.diagnostics))
    }

    /// All loaded files in load order
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    /// Number of loaded files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file was loaded
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find an already loaded file by path
    pub fn lookup(&self, path: impl AsRef<Path>) -> Option<FileId> {
        let key = path_key(&self.absolute(path.as_ref()));
        self.by_path.get(&key).copied()
    }

    /// Load a file and its imports; returns the cached file when already known
    pub fn parse(&mut self, path: impl AsRef<Path>) -> FileId {
        let path = self.absolute(path.as_ref());
        let key = path_key(&path);
        if let Some(&id) = self.by_path.get(&key) {
            return id;
        }

        let id = FileId(self.files.len() as u32);
        let root = self.resolver.root().to_path_buf();
        self.files.push(SourceFile::new(id, path, root));
        self.by_path.insert(key, id);
        self.load(id);
        id
    }

    /// Re-read and re-parse a file in place
    pub fn update(&mut self, id: FileId) -> Result<()> {
        let file = self
            .files
            .get_mut(id.index())
            .ok_or(CompileError::UnknownFile(id.0))?;
        tracing::info!(file = %file.relative_path(), "re-parsing");
        file.reset();
        self.load(id);
        Ok(())
    }

    /// Resolve, and optionally optimize, a file's current parse once
    pub fn prepare(&mut self, id: FileId, optimize: bool) {
        let Some(file) = self.files.get_mut(id.index()) else {
            return;
        };
        let Some(block) = file.block else {
            return;
        };
        if !file.resolved {
            let name = file.relative_path();
            resolver::resolve(&mut file.ast, block, &name, &self.globals, &mut self.diagnostics);
            file.resolved = true;
        }
        if optimize && !file.optimized {
            let folded = optimizer::optimize(&mut file.ast, block);
            tracing::debug!(file = %file.relative_path(), folded, "optimized");
            file.optimized = true;
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.resolver.root().join(path))
        }
    }

    fn load(&mut self, id: FileId) {
        self.files[id.index()].parsing = true;
        let result = self.load_file(id);
        let file = &mut self.files[id.index()];
        file.parsing = false;

        if let Err(err) = result {
            file.block = None;
            let name = file.relative_path();
            self.diagnostics
                .report(Diagnostic::new(err.kind(), name, err.to_string()));
        }
    }

    fn load_file(&mut self, id: FileId) -> Result<()> {
        let (path, extname) = {
            let file = &self.files[id.index()];
            (file.path.clone(), file.extname.clone())
        };
        tracing::debug!(path = %path.display(), "loading");

        let text = self.source.read(&path)?;
        let Translation {
            ast,
            block,
            requests,
            exports,
            export_default,
        } = match extname.as_str() {
            "js" => parser::parse_script(&text)?,
            "json" => parser::synthesize_json(&text)?,
            _ => parser::synthesize_text(&text),
        };

        {
            let file = &mut self.files[id.index()];
            file.ast = ast;
            file.exports = exports;
            file.export_default = export_default;
        }

        for request in requests {
            let target =
                match self
                    .resolver
                    .resolve(&request.specifier, &path, self.source.as_ref())
                {
                    Ok(target) => target,
                    Err(err) => {
                        let name = self.files[id.index()].relative_path();
                        self.diagnostics
                            .report(Diagnostic::new(err.kind(), name, err.to_string()));
                        continue;
                    }
                };

            let child = self.parse(&target);
            if self.files[child.index()].parsing {
                return Err(CompileError::circular(
                    path,
                    self.files[child.index()].path.clone(),
                ));
            }
            self.link_import(id, request.node, child);
        }

        self.files[id.index()].block = Some(block);
        Ok(())
    }

    /// Point an import/export node at its loaded file and record the edge
    fn link_import(&mut self, id: FileId, node: NodeId, child: FileId) {
        let file = &mut self.files[id.index()];
        let specifiers = match &mut file.ast.node_mut(node).kind {
            NodeKind::Import {
                file: target,
                specifiers,
                ..
            } => {
                *target = Some(child);
                specifiers.clone()
            }
            NodeKind::Export { file: target, .. } | NodeKind::ExportAll { file: target, .. } => {
                *target = Some(child);
                Vec::new()
            }
            _ => Vec::new(),
        };

        for specifier in specifiers {
            if let NodeKind::Specifier { local, remote, .. } = file.ast.kind(specifier) {
                if let Some(name) = file.ast.identifier_name(*local) {
                    file.imports_map.insert(
                        name.to_string(),
                        ImportBinding {
                            file: child,
                            name: remote.clone(),
                        },
                    );
                }
            }
        }

        if !file.imports.contains(&child) {
            file.imports.push(child);
        }
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.resolver.root())
            .field("files", &self.files.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}

/// Case-insensitive registry key
fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::module_system::MemorySource;

    fn project(source: MemorySource) -> Project {
        Project::with_source(&Config::with_root("/p"), source)
    }

    #[test]
    fn test_parse_is_cached_case_insensitively() {
        let source = MemorySource::new().with_file("/p/src/Main.js", "let a = 1;");
        let reads = source.read_counter();
        let mut project = project(source);

        let first = project.parse("/p/src/Main.js");
        let second = project.parse("/P/SRC/main.js");
        assert_eq!(first, second);
        assert_eq!(reads.get(), 1);
        assert!(project.file(first).unwrap().block.is_some());
    }

    #[test]
    fn test_imports_are_loaded_in_order() {
        let source = MemorySource::new()
            .with_file("/p/a.js", "import b from './b'; import { c } from './c'; import b2 from './b';")
            .with_file("/p/b.js", "export default 1;")
            .with_file("/p/c.js", "export const c = 2;");
        let mut project = project(source);

        let a = project.parse("a.js");
        let file = project.file(a).unwrap();
        let names: Vec<_> = file
            .imports
            .iter()
            .map(|id| project.file(*id).unwrap().filename.clone())
            .collect();
        assert_eq!(names, vec!["b.js", "c.js"]);
        assert_eq!(file.imports_map["c"].name, "c");
        assert_eq!(file.imports_map["b"].name, "default");
    }

    #[test]
    fn test_missing_import_is_skipped() {
        let source = MemorySource::new().with_file("/p/a.js", "import x from './nope'; let y = 1;");
        let mut project = project(source);

        let a = project.parse("a.js");
        assert!(project.file(a).unwrap().block.is_some());
        assert!(project.file(a).unwrap().imports.is_empty());
        assert_eq!(project.diagnostics().count(DiagnosticKind::ModuleNotFound), 1);
    }

    #[test]
    fn test_syntax_error_leaves_file_without_block() {
        let source = MemorySource::new().with_file("/p/a.js", "let = ;");
        let mut project = project(source);

        let a = project.parse("a.js");
        assert!(project.file(a).unwrap().block.is_none());
        assert_eq!(project.diagnostics().count(DiagnosticKind::Syntax), 1);
    }

    #[test]
    fn test_json_and_text_files() {
        let source = MemorySource::new()
            .with_file("/p/data.json", "{\"a\": 1}")
            .with_file("/p/readme.txt", "hi");
        let mut project = project(source);

        let json = project.parse("data.json");
        let text = project.parse("readme.txt");
        assert!(project.file(json).unwrap().export_default);
        assert_eq!(project.file(text).unwrap().extname, "txt");
    }

    #[test]
    fn test_invalid_json_file_is_reported() {
        let source = MemorySource::new().with_file("/p/data.json", "{\"a\": ");
        let mut project = project(source);

        let json = project.parse("data.json");
        assert!(project.file(json).unwrap().block.is_none());
        assert_eq!(project.diagnostics().count(DiagnosticKind::Io), 1);
    }

    #[test]
    fn test_update_reparses_in_place() {
        let source = MemorySource::new().with_file("/p/a.js", "export const a = 1;");
        let handle = source.clone();
        let mut project = project(source);

        let a = project.parse("a.js");
        assert_eq!(project.file(a).unwrap().exports.len(), 1);

        handle.insert("/p/a.js", "let a = 1;");
        project.update(a).unwrap();
        let file = project.file(a).unwrap();
        assert!(file.exports.is_empty());
        assert!(file.block.is_some());
        assert!(!file.resolved);
    }

    #[test]
    fn test_update_unknown_file() {
        let mut project = project(MemorySource::new());
        assert!(matches!(
            project.update(FileId(7)),
            Err(CompileError::UnknownFile(7))
        ));
    }
}
