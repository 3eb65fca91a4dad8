//! End-to-end pipeline tests
//!
//! Every test builds a project over an in-memory source tree rooted at `/p`
//! and drives it through the public API only.

use replica_compiler::ast::{NodeId, NodeKind, ScopeId, ValueType};
use replica_compiler::module_system::MemorySource;
use replica_compiler::{
    compile, get_imports, CompileContext, CompileMode, CompileOptions, CompileOutput, Config,
    DiagnosticKind, FileId, Project, SourceFile, Target,
};

fn project(files: &[(&str, &str)]) -> Project {
    let mut source = MemorySource::new();
    for (path, text) in files {
        source = source.with_file(format!("/p/{}", path), *text);
    }
    Project::with_source(&Config::with_root("/p"), source)
}

/// Parses and resolves a single file
fn resolve_src(source: &str, optimize: bool) -> (Project, FileId) {
    let mut project = project(&[("main.js", source)]);
    let id = project.parse("main.js");
    project.prepare(id, optimize);
    (project, id)
}

fn root_scope(file: &SourceFile) -> ScopeId {
    let block = file.block.expect("file has a block");
    file.ast.block_scope(block).expect("root is a block")
}

fn declaration(file: &SourceFile, scope: ScopeId, name: &str) -> NodeId {
    file.ast.scope(scope).get(name).expect("name is declared")
}

fn reference(file: &SourceFile, node: NodeId) -> Option<NodeId> {
    match file.ast.kind(node) {
        NodeKind::Identifier { reference, .. } => *reference,
        other => panic!("expected identifier, got {:?}", other),
    }
}

fn content(project: &mut Project, file: FileId, options: CompileOptions) -> String {
    let mut ctx = CompileContext::new(options);
    match compile(project, &mut ctx, file).unwrap() {
        CompileOutput::Content(text) => text,
        other => panic!("expected content, got {:?}", other),
    }
}

#[test]
fn test_parse_cache_ignores_case() {
    let source = MemorySource::new().with_file("/p/src/App.js", "export default 1;");
    let reads = source.read_counter();
    let mut project = Project::with_source(&Config::with_root("/p"), source);

    let first = project.parse("/p/src/App.js");
    let second = project.parse("/P/Src/app.JS");
    assert_eq!(first, second);
    assert_eq!(reads.get(), 1);
    assert_eq!(project.len(), 1);
}

#[test]
fn test_inner_declaration_does_not_leak_outward() {
    let (project, id) = resolve_src("let a = 1;\n{\n  a;\n  let a = \"s\";\n  a;\n}", false);
    let file = project.file(id).unwrap();
    let root = root_scope(file);
    let outer = declaration(file, root, "a");

    let inner_block = file.ast.scope(root).body[1];
    let inner = file.ast.block_scope(inner_block).unwrap();
    let inner_decl = declaration(file, inner, "a");
    let body = &file.ast.scope(inner).body;

    assert_eq!(reference(file, body[0]), Some(outer));
    assert_eq!(reference(file, body[2]), Some(inner_decl));
    assert_ne!(outer, inner_decl);
}

#[test]
fn test_concatenation_makes_string() {
    let (project, id) = resolve_src("let x = 1;\nlet y = x + \"a\";", false);
    let file = project.file(id).unwrap();
    let root = root_scope(file);

    assert_eq!(file.ast.value_type(declaration(file, root, "x")), ValueType::Number);
    assert_eq!(file.ast.value_type(declaration(file, root, "y")), ValueType::String);
    assert_eq!(project.diagnostics().count(DiagnosticKind::Type), 0);
}

#[test]
fn test_mismatched_assignment_keeps_type() {
    let (project, id) = resolve_src("let a = 1;\na = \"s\";", false);
    let file = project.file(id).unwrap();
    let root = root_scope(file);

    assert_eq!(project.diagnostics().count(DiagnosticKind::Type), 1);
    assert_eq!(file.ast.value_type(declaration(file, root, "a")), ValueType::Number);
}

#[test]
fn test_constant_folding() {
    let (project, id) = resolve_src("\"a\" + \"b\" + \"c\";\n1 + 2 + x;", true);
    let file = project.file(id).unwrap();
    let body = &file.ast.scope(root_scope(file)).body;

    assert!(matches!(file.ast.kind(body[0]), NodeKind::String { value, .. } if value == "abc"));

    let NodeKind::Binary { left, right, .. } = file.ast.kind(body[1]) else {
        panic!("expected binary, got {:?}", file.ast.kind(body[1]));
    };
    assert!(matches!(file.ast.kind(*left), NodeKind::Number { value, .. } if *value == 3.0));
    assert_eq!(file.ast.identifier_name(*right), Some("x"));
}

#[test]
fn test_circular_import_is_reported_once() {
    let mut project = project(&[
        ("a.js", "import b from './b';\nexport default 1;"),
        ("b.js", "import a from './a';\nexport default 2;"),
    ]);
    let a = project.parse("a.js");

    let diagnostics = project.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::CircularImport), 1);
    let circular = diagnostics
        .entries()
        .iter()
        .find(|d| d.kind == DiagnosticKind::CircularImport)
        .unwrap();
    assert!(circular.message.contains("a.js"));
    assert!(circular.message.contains("b.js"));
    assert!(project.file(a).unwrap().block.is_some());
}

#[test]
fn test_imports_dependency_first() {
    let mut project = project(&[
        ("a.js", "import b from './b';\nimport c from './c';"),
        ("b.js", "import d from './d';\nexport default d;"),
        ("c.js", "import d from './d';\nexport default d;"),
        ("d.js", "export default 4;"),
    ]);
    let a = project.parse("a.js");
    let mut ctx = CompileContext::new(CompileOptions {
        mode: CompileMode::Imports,
        ..CompileOptions::default()
    });

    let imports = get_imports(&mut project, &mut ctx, a).unwrap();
    let names: Vec<_> = imports
        .iter()
        .map(|id| project.file(*id).unwrap().filename.clone())
        .collect();
    assert_eq!(names, vec!["d.js", "b.js", "c.js"]);
}

#[test]
fn test_script_module_exposes_default_export() {
    let mut project = project(&[(
        "main.js",
        "function add(a, b) { return a + b; }\nexport default add;",
    )]);
    let id = project.parse("main.js");

    let output = content(&mut project, id, CompileOptions::default());
    assert!(output.starts_with("(function() {\n"));
    assert!(output.contains("\tfunction add(a, b) {\n\t\treturn a + b;\n\t}\n"));
    assert!(output.contains(&format!("\tmodules[{}] = add;\n", id)));
    assert!(output.ends_with("})();\n\n//# sourceURL=./main.js"));
}

#[test]
fn test_stack_machine_numeric_function() {
    let mut project = project(&[(
        "main.js",
        "function add(a, b) { return a + b; }\nexport default add;\nadd(1, 2);",
    )]);
    let id = project.parse("main.js");

    let output = content(
        &mut project,
        id,
        CompileOptions {
            target: Target::Stack,
            ..CompileOptions::default()
        },
    );
    assert!(output.contains("(func $_Z3add (param $a i32) (param $b i32) (result i32)"));
    assert!(output.contains("(return\n\t\t\t(i32.add\n"));
    assert!(output.contains("(export \"_Z3add\" (func $_Z3add))"));
}

#[test]
fn test_update_recompiles_new_text() {
    let source = MemorySource::new().with_file("/p/main.js", "let a = 1;");
    let handle = source.clone();
    let mut project = Project::with_source(&Config::with_root("/p"), source);
    let id = project.parse("main.js");
    let options = CompileOptions {
        module: false,
        ..CompileOptions::default()
    };

    assert_eq!(content(&mut project, id, options.clone()), "let a = 1;");
    handle.insert("/p/main.js", "let b = 2;");
    project.update(id).unwrap();
    assert_eq!(content(&mut project, id, options), "let b = 2;");
}
