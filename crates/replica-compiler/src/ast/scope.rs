//! Lexical scopes.

use rustc_hash::FxHashMap;

use super::NodeId;

/// Index of a scope inside its file's [`Ast`](super::Ast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A binding environment owned by one block-level construct.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Statements in source order
    pub body: Vec<NodeId>,
    /// Variables, parameters, classes and imports (name -> declaring node)
    pub vars: FxHashMap<String, NodeId>,
    /// Function declarations (name -> function node)
    pub funcs: FxHashMap<String, NodeId>,
    /// Lexically enclosing scope
    pub parent: Option<ScopeId>,
}

impl Scope {
    /// Creates an empty scope below `parent`.
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    /// Looks a name up in this scope only.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.vars
            .get(name)
            .or_else(|| self.funcs.get(name))
            .copied()
    }

    /// Returns true if this scope declares `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.vars.contains_key(name) || self.funcs.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vars_shadow_funcs() {
        let mut scope = Scope::new(None);
        scope.funcs.insert("f".to_string(), NodeId(1));
        assert_eq!(scope.get("f"), Some(NodeId(1)));
        scope.vars.insert("f".to_string(), NodeId(2));
        assert_eq!(scope.get("f"), Some(NodeId(2)));
        assert!(scope.declares("f"));
        assert!(!scope.declares("g"));
    }
}
