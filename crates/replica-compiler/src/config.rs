//! Compiler configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the per-project configuration file.
pub const CONFIG_FILE: &str = "replica.json";

/// Host names that resolve without a declaration.
pub const DEFAULT_GLOBALS: &[&str] = &[
    "Array", "Boolean", "Date", "Error", "Function", "Infinity", "JSON", "Map", "Math", "NaN",
    "Number", "Object", "Promise", "RegExp", "Set", "String", "Symbol", "TypeError", "arguments",
    "clearInterval", "clearTimeout", "console", "document", "global", "isNaN", "module",
    "modules", "parseFloat", "parseInt", "process", "require", "setInterval", "setTimeout",
    "undefined", "window",
];

/// Code generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Widely compatible script text
    #[default]
    Script,
    /// Stack-machine text module
    Stack,
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "script" | "js" => Ok(Target::Script),
            "stack" | "wast" => Ok(Target::Stack),
            other => Err(format!("unknown target '{}'", other)),
        }
    }
}

/// What `compile` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileMode {
    /// Generated text
    #[default]
    Content,
    /// The dependency-ordered import list
    Imports,
}

/// Options for one compile invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Code generation backend
    pub target: Target,

    /// Content or imports
    pub mode: CompileMode,

    /// Wrap files in the module table boilerplate and downlevel ES module syntax
    pub module: bool,

    /// Render every not yet rendered import before the requested file
    pub concat: bool,

    /// Ask the external post-process to minify
    pub minify: bool,

    /// Run constant folding before generation
    pub optimize: bool,

    /// Emit `/*:Type*/` after declared names
    pub annotate_types: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            target: Target::Script,
            mode: CompileMode::Content,
            module: true,
            concat: false,
            minify: false,
            optimize: false,
            annotate_types: false,
        }
    }
}

/// Project-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory relative paths and `node_modules` are resolved against
    pub root: PathBuf,

    /// Library aliases (specifier -> path)
    pub aliases: BTreeMap<String, PathBuf>,

    /// Host globals treated as declared dynamic bindings
    pub globals: Vec<String>,

    /// Default compile options
    pub options: CompileOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            aliases: BTreeMap::new(),
            globals: DEFAULT_GLOBALS.iter().map(|g| g.to_string()).collect(),
            options: CompileOptions::default(),
        }
    }
}

impl Config {
    /// Creates a default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load configuration for a project directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut config = Config::with_root(dir);

        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            config.merge_from_file(&path)?;
        }

        config.load_from_env();

        Ok(config)
    }

    /// Merge configuration from a JSON file.
    fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let file: serde_json::Value = serde_json::from_str(&content)?;

        if let Some(root) = file.get("root").and_then(|v| v.as_str()) {
            let root = Path::new(root);
            self.root = match path.parent() {
                Some(dir) if root.is_relative() => dir.join(root),
                _ => root.to_path_buf(),
            };
        }
        if let Some(aliases) = file.get("aliases") {
            let aliases: BTreeMap<String, PathBuf> = serde_json::from_value(aliases.clone())?;
            self.aliases.extend(aliases);
        }
        if let Some(globals) = file.get("globals") {
            let globals: Vec<String> = serde_json::from_value(globals.clone())?;
            for global in globals {
                if !self.globals.contains(&global) {
                    self.globals.push(global);
                }
            }
        }
        if let Some(options) = file.get("options") {
            self.options = serde_json::from_value(options.clone())?;
        }

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(())
    }

    /// Load configuration from environment variables.
    fn load_from_env(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(key) = key.strip_prefix("REPLICA_") {
                self.set(&key.to_lowercase(), &value);
            }
        }
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "root" => self.root = PathBuf::from(value),
            "target" => match value.parse() {
                Ok(target) => self.options.target = target,
                Err(err) => tracing::warn!("Ignoring REPLICA_TARGET: {}", err),
            },
            "concat" => self.options.concat = value == "true" || value == "1",
            "module" => self.options.module = value == "true" || value == "1",
            "optimize" => self.options.optimize = value == "true" || value == "1",
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.globals.iter().any(|g| g == "console"));
        assert_eq!(config.options.target, Target::Script);
        assert!(config.options.module);
        assert!(!config.options.concat);
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("stack".parse::<Target>(), Ok(Target::Stack));
        assert_eq!("WAST".parse::<Target>(), Ok(Target::Stack));
        assert_eq!("js".parse::<Target>(), Ok(Target::Script));
        assert!("wasm64".parse::<Target>().is_err());
    }

    #[test]
    fn test_set() {
        let mut config = Config::default();
        config.set("target", "stack");
        config.set("concat", "true");
        config.set("unknown", "value");
        assert_eq!(config.options.target, Target::Stack);
        assert!(config.options.concat);
    }

    #[test]
    fn test_merge_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{
                "aliases": { "lib": "vendor/lib.js" },
                "globals": ["THREE"],
                "options": { "target": "stack", "optimize": true }
            }"#,
        )
        .unwrap();

        let mut config = Config::with_root(dir.path());
        config.merge_from_file(&path).unwrap();

        assert_eq!(config.aliases["lib"], PathBuf::from("vendor/lib.js"));
        assert!(config.globals.iter().any(|g| g == "THREE"));
        assert!(config.globals.iter().any(|g| g == "console"));
        assert_eq!(config.options.target, Target::Stack);
        assert!(config.options.optimize);
        assert!(config.options.module);
    }

    #[test]
    fn test_options_deserialize_defaults() {
        let options: CompileOptions = serde_json::from_str(r#"{ "concat": true }"#).unwrap();
        assert!(options.concat);
        assert_eq!(options.mode, CompileMode::Content);
        assert!(options.module);
    }
}
