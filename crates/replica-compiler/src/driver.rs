// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Compile driver
//!
//! [`compile`] either lists a file's transitive imports or renders it with
//! the selected target. Every run bumps the context's compile index and
//! stamps the files it visits with it, so "already handled in this run"
//! never needs a table that has to be cleared between runs.

use crate::config::{CompileMode, CompileOptions, Target};
use crate::error::{CompileError, Result};
use crate::project::{FileId, Project};
use crate::targets::{ScriptGenerator, StackGenerator, script};

/// State carried from one compile run to the next
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    compile_index: u32,
    options: CompileOptions,
}

impl CompileContext {
    /// Create a context compiling with `options`
    pub fn new(options: CompileOptions) -> Self {
        Self {
            compile_index: 0,
            options,
        }
    }

    /// The options every run uses
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Change the options for later runs
    pub fn options_mut(&mut self) -> &mut CompileOptions {
        &mut self.options
    }

    /// Epoch of the most recent run
    pub fn compile_index(&self) -> u32 {
        self.compile_index
    }

    fn next_run(&mut self) -> u32 {
        self.compile_index += 1;
        self.compile_index
    }
}

/// What a compile run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutput {
    /// Rendered text
    Content(String),
    /// Transitive imports, dependencies first
    Imports(Vec<FileId>),
}

/// Compile `file` in the context's mode
pub fn compile(project: &mut Project, ctx: &mut CompileContext, file: FileId) -> Result<CompileOutput> {
    if project.file(file).is_none() {
        return Err(CompileError::UnknownFile(file.0));
    }
    match ctx.options.mode {
        CompileMode::Imports => get_imports(project, ctx, file).map(CompileOutput::Imports),
        CompileMode::Content => content(project, ctx, file).map(CompileOutput::Content),
    }
}

/// Transitive imports of `file`, dependencies first and without duplicates
pub fn get_imports(project: &mut Project, ctx: &mut CompileContext, file: FileId) -> Result<Vec<FileId>> {
    if project.file(file).is_none() {
        return Err(CompileError::UnknownFile(file.0));
    }
    let epoch = ctx.next_run();
    let mut order = Vec::new();
    collect_imports(project, epoch, file, &mut order);
    tracing::debug!(compile_index = epoch, file = %file, imports = order.len(), "collected imports");
    Ok(order)
}

/// Depth-first walk stamping every visited file with `epoch`
fn collect_imports(project: &mut Project, epoch: u32, id: FileId, order: &mut Vec<FileId>) {
    let imports = match project.file_mut(id) {
        Some(file) => {
            file.compile_index = epoch;
            file.imports.clone()
        }
        None => return,
    };
    for child in imports {
        let visited = project
            .file(child)
            .is_none_or(|file| file.compile_index >= epoch);
        if visited {
            continue;
        }
        collect_imports(project, epoch, child, order);
        order.push(child);
    }
}

fn content(project: &mut Project, ctx: &mut CompileContext, file: FileId) -> Result<String> {
    let epoch = ctx.next_run();
    let options = ctx.options.clone();

    let mut order = Vec::new();
    if options.concat {
        collect_imports(project, epoch, file, &mut order);
    } else if let Some(source) = project.file_mut(file) {
        source.compile_index = epoch;
    }
    order.push(file);

    let mut parts = Vec::with_capacity(order.len());
    let mut rendered = Vec::with_capacity(order.len());
    for id in order {
        project.prepare(id, options.optimize);
        let text = render(project, &options, id);
        if text.is_empty() {
            continue;
        }
        parts.push(text);
        rendered.push(id);
    }
    tracing::info!(
        compile_index = epoch,
        file = %file,
        files = rendered.len(),
        target = ?options.target,
        "compiled"
    );

    let separator = match options.target {
        Target::Script => "\n\n",
        Target::Stack => "\n",
    };
    let mut output = parts.join(separator);
    if options.target == Target::Script && options.module && options.concat {
        let paths: Vec<(FileId, String)> = rendered
            .iter()
            .filter_map(|&id| project.file(id).map(|f| (id, f.relative_path())))
            .collect();
        let prelude = script::prelude(paths.iter().map(|(id, path)| (*id, path.as_str())));
        output.insert_str(0, &prelude);
    }
    Ok(output)
}

/// Render one prepared file; empty when it has no block
fn render(project: &mut Project, options: &CompileOptions, id: FileId) -> String {
    match options.target {
        Target::Script => project
            .file(id)
            .filter(|file| file.block.is_some())
            .map(|file| ScriptGenerator::new(file, options).generate())
            .unwrap_or_default(),
        Target::Stack => match project.file_with_diagnostics(id) {
            Some((file, diagnostics)) if file.block.is_some() => {
                StackGenerator::generate(file, diagnostics)
            }
            _ => String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::module_system::MemorySource;

    fn project(source: MemorySource) -> Project {
        Project::with_source(&Config::with_root("/p"), source)
    }

    fn content_of(output: CompileOutput) -> String {
        match output {
            CompileOutput::Content(text) => text,
            other => panic!("expected content, got {:?}", other),
        }
    }

    #[test]
    fn test_imports_are_dependency_first() {
        let source = MemorySource::new()
            .with_file("/p/a.js", "import b from './b'; import c from './c';")
            .with_file("/p/b.js", "import d from './d'; export default 1;")
            .with_file("/p/c.js", "import d from './d'; export default 2;")
            .with_file("/p/d.js", "export default 3;");
        let mut project = project(source);
        let a = project.parse("a.js");
        let names = |project: &Project, ids: &[FileId]| -> Vec<String> {
            ids.iter()
                .map(|id| project.file(*id).unwrap().filename.clone())
                .collect()
        };

        let mut ctx = CompileContext::new(CompileOptions {
            mode: CompileMode::Imports,
            ..CompileOptions::default()
        });
        let CompileOutput::Imports(first) = compile(&mut project, &mut ctx, a).unwrap() else {
            panic!("expected imports");
        };
        assert_eq!(names(&project, &first), vec!["d.js", "b.js", "c.js"]);

        // a second run is not confused by the stamps of the first
        let second = get_imports(&mut project, &mut ctx, a).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.compile_index(), 2);
    }

    #[test]
    fn test_concat_renders_each_file_once() {
        let source = MemorySource::new()
            .with_file("/p/a.js", "import b from './b'; import c from './c'; console.log(b, c);")
            .with_file("/p/b.js", "import c from './c'; export default c + 1;")
            .with_file("/p/c.js", "export default 2;");
        let mut project = project(source);
        let a = project.parse("a.js");

        let mut ctx = CompileContext::new(CompileOptions {
            concat: true,
            ..CompileOptions::default()
        });
        let output = content_of(compile(&mut project, &mut ctx, a).unwrap());
        assert!(output.starts_with("\"use strict\";"));
        assert_eq!(output.matches("//# sourceURL=./c.js").count(), 1);
        let c = output.find("sourceURL=./c.js").unwrap();
        let b = output.find("sourceURL=./b.js").unwrap();
        let main = output.find("sourceURL=./a.js").unwrap();
        assert!(c < b && b < main);
        assert!(output.contains("scope.modulesPath = { \"2\": \"./c.js\", \"1\": \"./b.js\", \"0\": \"./a.js\" };"));
    }

    #[test]
    fn test_failed_file_contributes_nothing() {
        let source = MemorySource::new()
            .with_file("/p/a.js", "import b from './b'; let x = 1;")
            .with_file("/p/b.js", "let = ;");
        let mut project = project(source);
        let a = project.parse("a.js");

        let mut ctx = CompileContext::new(CompileOptions {
            concat: true,
            ..CompileOptions::default()
        });
        let output = content_of(compile(&mut project, &mut ctx, a).unwrap());
        assert!(!output.contains("b.js"));
        assert!(output.contains("let x = 1;"));
    }

    #[test]
    fn test_single_file_without_module_wrapper() {
        let source = MemorySource::new().with_file("/p/a.js", "let x = 1 + 2;");
        let mut project = project(source);
        let a = project.parse("a.js");

        let mut ctx = CompileContext::new(CompileOptions {
            module: false,
            optimize: true,
            ..CompileOptions::default()
        });
        let output = content_of(compile(&mut project, &mut ctx, a).unwrap());
        assert_eq!(output, "let x = 3;");
    }

    #[test]
    fn test_folded_large_integer_is_rendered_exactly() {
        let source = MemorySource::new().with_file("/p/a.js", "let a = 10000000000000000000 + 0;");
        let mut project = project(source);
        let a = project.parse("a.js");

        let mut ctx = CompileContext::new(CompileOptions {
            module: false,
            optimize: true,
            ..CompileOptions::default()
        });
        let output = content_of(compile(&mut project, &mut ctx, a).unwrap());
        assert_eq!(output, "let a = 10000000000000000000;");
    }

    #[test]
    fn test_stack_target_reports_into_project() {
        let source = MemorySource::new().with_file("/p/a.js", "var s = \"text\";");
        let mut project = project(source);
        let a = project.parse("a.js");

        let mut ctx = CompileContext::new(CompileOptions {
            target: Target::Stack,
            ..CompileOptions::default()
        });
        let output = content_of(compile(&mut project, &mut ctx, a).unwrap());
        assert!(output.starts_with("(module"));
        assert!(project
            .diagnostics()
            .count(crate::diagnostics::DiagnosticKind::Target)
            > 0);
    }

    #[test]
    fn test_unknown_file() {
        let mut project = project(MemorySource::new());
        let mut ctx = CompileContext::default();
        assert!(matches!(
            compile(&mut project, &mut ctx, FileId(3)),
            Err(CompileError::UnknownFile(3))
        ));
    }
}
