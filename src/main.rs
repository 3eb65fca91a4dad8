// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! replica - command-line driver for the replica compiler
//!
//! Compiles one entry file (and, with `--concat`, its whole import graph)
//! to script text or a stack-machine module.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use replica_compiler::{
    compile, CompileContext, CompileMode, CompileOutput, Config, Diagnostic, DiagnosticKind,
    Project, Target,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "replica",
    about = "Compiler for a JavaScript subset",
    version,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an entry file
    Build(BuildArgs),
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Entry file
    file: PathBuf,

    /// Code generation target (script or stack)
    #[arg(short, long)]
    target: Option<Target>,

    /// Render the whole import graph into one output
    #[arg(long)]
    concat: bool,

    /// Keep ES module and class syntax instead of the module table wrapper
    #[arg(long)]
    no_module: bool,

    /// Fold constant expressions
    #[arg(long)]
    optimize: bool,

    /// Print the dependency-ordered imports instead of compiling
    #[arg(long)]
    imports: bool,

    /// Emit /*:Type*/ annotations after declared names
    #[arg(long)]
    annotate_types: bool,

    /// Write the output to a file
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Directory holding replica.json (defaults to the current directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "replica=debug,replica_compiler=debug"
    } else {
        "replica=info,replica_compiler=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build(args) => build(args),
    }
}

fn build(args: BuildArgs) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let dir = match &args.config {
        Some(dir) => cwd.join(dir),
        None => cwd.clone(),
    };
    let config = Config::load(&dir)?;

    let mut options = config.options.clone();
    if let Some(target) = args.target {
        options.target = target;
    }
    options.concat |= args.concat;
    options.optimize |= args.optimize;
    options.annotate_types |= args.annotate_types;
    if args.no_module {
        options.module = false;
    }
    if args.imports {
        options.mode = CompileMode::Imports;
    }

    let mut project = Project::new(&config);
    let entry = project.parse(cwd.join(&args.file));
    let mut ctx = CompileContext::new(options);
    let output = compile(&mut project, &mut ctx, entry)?;

    let text = match output {
        CompileOutput::Content(text) => text,
        CompileOutput::Imports(files) => files
            .iter()
            .filter_map(|id| project.file(*id))
            .map(|file| file.relative_path())
            .collect::<Vec<_>>()
            .join("\n"),
    };
    match &args.out {
        Some(path) => std::fs::write(path, &text)?,
        None => println!("{}", text),
    }

    for diagnostic in project.diagnostics().entries() {
        print_diagnostic(diagnostic);
    }

    let failed = project.file(entry).is_none_or(|file| file.block.is_none());
    if failed {
        eprintln!(
            "{}: could not compile '{}'",
            "error".red().bold(),
            args.file.display().cyan()
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let label = diagnostic.kind.label();
    let label = match diagnostic.kind {
        DiagnosticKind::Target | DiagnosticKind::Redeclaration => label.yellow().bold().to_string(),
        _ => label.red().bold().to_string(),
    };
    eprintln!("{} {}: {}", label, diagnostic.file.dimmed(), diagnostic.message);
}
