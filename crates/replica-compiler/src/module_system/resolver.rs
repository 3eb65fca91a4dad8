// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module path resolution

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use super::source::TextSource;
use crate::error::{CompileError, Result};

/// Resolves import specifiers to absolute paths
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    /// Directory holding `node_modules`
    root: PathBuf,
    /// Library aliases (specifier -> path)
    aliases: BTreeMap<String, PathBuf>,
}

impl ModuleResolver {
    /// Create a resolver rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: normalize_path(&root.into()),
            aliases: BTreeMap::new(),
        }
    }

    /// The project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register a library alias; relative paths are taken from the root
    pub fn add_alias(&mut self, name: impl Into<String>, path: impl AsRef<Path>) {
        let path = self.absolute(path.as_ref());
        self.aliases.insert(name.into(), path);
    }

    /// Resolve `specifier` as imported from the file `importer`
    pub fn resolve(
        &self,
        specifier: &str,
        importer: &Path,
        source: &dyn TextSource,
    ) -> Result<PathBuf> {
        if is_relative(specifier) {
            let dir = importer.parent().unwrap_or(Path::new("."));
            let path = with_script_extension(normalize_path(&dir.join(specifier)));
            if !source.exists(&path) {
                return Err(CompileError::module_not_found(specifier));
            }
            return Ok(path);
        }

        if let Some(path) = self.resolve_alias(specifier) {
            if !source.exists(&path) {
                return Err(CompileError::module_not_found(specifier));
            }
            return Ok(path);
        }

        self.resolve_package(specifier, source)
    }

    /// Look the specifier (or its leading segment) up in the alias table
    fn resolve_alias(&self, specifier: &str) -> Option<PathBuf> {
        if let Some(path) = self.aliases.get(specifier) {
            return Some(path.clone());
        }
        let (name, subpath) = specifier.split_once('/')?;
        let base = self.aliases.get(name)?;
        Some(with_script_extension(normalize_path(&base.join(subpath))))
    }

    /// Resolve a bare specifier against `<root>/node_modules`
    fn resolve_package(&self, specifier: &str, source: &dyn TextSource) -> Result<PathBuf> {
        let (package_name, subpath) = parse_package_specifier(specifier);
        let dir = self.root.join("node_modules").join(package_name);
        if !source.exists(&dir) {
            return Err(CompileError::module_not_found(specifier));
        }

        if let Some(sub) = subpath {
            let path = with_script_extension(normalize_path(&dir.join(sub)));
            if !source.exists(&path) {
                return Err(CompileError::module_not_found(specifier));
            }
            return Ok(path);
        }

        let descriptor = dir.join("package.json");
        if !source.exists(&descriptor) {
            return Err(CompileError::PackageNotFound(specifier.to_string()));
        }
        let package: PackageJson = serde_json::from_str(&source.read(&descriptor)?)?;
        let main = package
            .main
            .filter(|main| !main.is_empty())
            .ok_or_else(|| CompileError::PackageEntryNotFound(specifier.to_string()))?;

        let entry = with_script_extension(normalize_path(&dir.join(main)));
        if !source.exists(&entry) {
            return Err(CompileError::PackageEntryNotFound(specifier.to_string()));
        }
        tracing::debug!(package = package_name, entry = %entry.display(), "resolved package");
        Ok(entry)
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.root.join(path))
        }
    }
}

/// Minimal package.json structure for resolution
#[derive(Debug, Default, Deserialize)]
pub struct PackageJson {
    /// Entry point relative to the package directory
    #[serde(default)]
    pub main: Option<String>,
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

fn with_script_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        let mut name = path.clone().into_os_string();
        name.push(".js");
        PathBuf::from(name)
    }
}

/// Split a package specifier into name and optional subpath
pub fn parse_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    if specifier.starts_with('@') {
        // Scoped package: @scope/name or @scope/name/subpath
        if let Some(slash_pos) = specifier[1..].find('/') {
            let after_scope = &specifier[slash_pos + 2..];
            if let Some(subpath_pos) = after_scope.find('/') {
                let name_end = slash_pos + 2 + subpath_pos;
                return (&specifier[..name_end], Some(&specifier[name_end + 1..]));
            }
        }
        (specifier, None)
    } else {
        match specifier.split_once('/') {
            Some((name, subpath)) => (name, Some(subpath)),
            None => (specifier, None),
        }
    }
}

/// Remove `.` and `..` components without touching the file system
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module_system::MemorySource;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_file("/p/src/main.js", "")
            .with_file("/p/src/util/math.js", "")
            .with_file("/p/src/data.json", "{}")
            .with_file("/p/node_modules/lib/package.json", r#"{"main": "dist/index"}"#)
            .with_file("/p/node_modules/lib/dist/index.js", "")
            .with_file("/p/node_modules/@scope/pkg/package.json", r#"{"main": "main.js"}"#)
            .with_file("/p/node_modules/@scope/pkg/main.js", "")
            .with_file("/p/node_modules/nomain/package.json", r#"{"name": "nomain"}"#)
            .with_file("/p/node_modules/nodesc/index.js", "")
            .with_file("/p/vendor/jquery.js", "")
    }

    #[test]
    fn test_relative_specifiers() {
        let resolver = ModuleResolver::new("/p");
        let source = source();
        let importer = Path::new("/p/src/main.js");

        assert_eq!(
            resolver.resolve("./util/math", importer, &source).unwrap(),
            PathBuf::from("/p/src/util/math.js")
        );
        assert_eq!(
            resolver.resolve("./data.json", importer, &source).unwrap(),
            PathBuf::from("/p/src/data.json")
        );
        assert!(matches!(
            resolver.resolve("./missing", importer, &source),
            Err(CompileError::ModuleNotFound(name)) if name == "./missing"
        ));
    }

    #[test]
    fn test_packages() {
        let resolver = ModuleResolver::new("/p");
        let source = source();
        let importer = Path::new("/p/src/main.js");

        assert_eq!(
            resolver.resolve("lib", importer, &source).unwrap(),
            PathBuf::from("/p/node_modules/lib/dist/index.js")
        );
        assert_eq!(
            resolver.resolve("@scope/pkg", importer, &source).unwrap(),
            PathBuf::from("/p/node_modules/@scope/pkg/main.js")
        );
        assert!(matches!(
            resolver.resolve("nomain", importer, &source),
            Err(CompileError::PackageEntryNotFound(_))
        ));
        assert!(matches!(
            resolver.resolve("nodesc", importer, &source),
            Err(CompileError::PackageNotFound(_))
        ));
        assert!(matches!(
            resolver.resolve("absent", importer, &source),
            Err(CompileError::ModuleNotFound(_))
        ));
    }

    #[test]
    fn test_aliases_win_over_packages() {
        let mut resolver = ModuleResolver::new("/p");
        resolver.add_alias("lib", "vendor/jquery.js");
        let source = source();

        assert_eq!(
            resolver
                .resolve("lib", Path::new("/p/src/main.js"), &source)
                .unwrap(),
            PathBuf::from("/p/vendor/jquery.js")
        );
    }

    #[test]
    fn test_parse_package_specifier() {
        assert_eq!(parse_package_specifier("lodash"), ("lodash", None));
        assert_eq!(parse_package_specifier("lodash/get"), ("lodash", Some("get")));
        assert_eq!(parse_package_specifier("@types/node"), ("@types/node", None));
        assert_eq!(
            parse_package_specifier("@babel/core/lib/index"),
            ("@babel/core", Some("lib/index"))
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/p/src/./a/../b.js")),
            PathBuf::from("/p/src/b.js")
        );
    }
}
