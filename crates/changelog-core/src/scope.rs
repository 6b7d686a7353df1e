use serde::{Deserialize, Serialize};

use crate::glob;
use crate::store::{ChangeStore, StoreError};

/// The set of module names that change submissions currently apply to.
///
/// A scope is an explicit value owned by the ingestion loop: every `@`
/// directive builds a fresh one, replacing (never merging with) the
/// previous scope. Insertion order is preserved and drives the order
/// change records fan out in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleScope {
    names: Vec<String>,
}

impl ModuleScope {
    /// The empty scope, in effect before any `@` directive. Changes
    /// submitted against it are dropped.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Resolve a glob pattern against the module catalog into a new scope.
///
/// Scans the whole catalog and keeps the names the pattern matches,
/// case-insensitively. Duplicates cannot occur (catalog names are
/// unique keys). A pattern matching nothing yields the empty scope.
pub fn set_scope(store: &dyn ChangeStore, pattern: &str) -> Result<ModuleScope, StoreError> {
    // A bare `@` line clears the scope without consulting the catalog.
    if pattern.is_empty() {
        return Ok(ModuleScope::empty());
    }

    let matcher = glob::compile(pattern)?;

    let mut names = Vec::new();
    for module in store.modules()? {
        if matcher.is_match(&module.name) {
            names.push(module.name);
        }
    }

    Ok(ModuleScope { names })
}
