//! Symbol registry — definition and group lookup, plus the usage-frequency
//! cache seam.
//!
//! The registry is the read-only collaborator the insertion engine consults
//! for static weights, group memberships, and flags. Entries are `Arc`-shared
//! so a live reload swaps them atomically from the embedder's point of view:
//! results created before the reload keep the definitions they were scored
//! with.

use crate::domain::{SymbolDef, SymbolGroup, SymbolName};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

/// Lookup table for symbol definitions and groups.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    symbols: HashMap<SymbolName, Arc<SymbolDef>>,
    groups: HashMap<String, Arc<SymbolGroup>>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a group and return the shared handle.
    pub fn add_group(&mut self, name: impl Into<String>, max_score: f64) -> Arc<SymbolGroup> {
        self.insert_group(SymbolGroup::new(name, max_score))
    }

    /// Register (or replace) a fully-built group.
    pub fn insert_group(&mut self, group: SymbolGroup) -> Arc<SymbolGroup> {
        let group = Arc::new(group);
        self.groups.insert(group.name.clone(), Arc::clone(&group));
        group
    }

    /// Register (or replace) a symbol definition and return the shared handle.
    ///
    /// Replacement is how live reload works: existing results keep their old
    /// `Arc` while new insertions see the fresh entry.
    pub fn register(&mut self, def: SymbolDef) -> Arc<SymbolDef> {
        let def = Arc::new(def);
        self.symbols.insert(def.name.clone(), Arc::clone(&def));
        def
    }

    pub fn symbol(&self, name: &str) -> Option<&Arc<SymbolDef>> {
        self.symbols.get(name)
    }

    pub fn group(&self, name: &str) -> Option<&Arc<SymbolGroup>> {
        self.groups.get(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Process-wide symbol usage statistics.
///
/// Bumped by the task after every successful insertion. The scoring core does
/// not depend on the outcome; implementations are free to drop updates.
pub trait SymbolCache: Send + Sync {
    /// Record one hit of `symbol`.
    fn bump(&self, symbol: &str);

    /// How many hits have been recorded for `symbol`.
    fn frequency(&self, symbol: &str) -> u64;
}

/// Trivial in-process cache for tests and single-node embedders.
#[derive(Debug, Default)]
pub struct InMemorySymbolCache {
    hits: Mutex<HashMap<SymbolName, u64>>,
}

impl InMemorySymbolCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SymbolCache for InMemorySymbolCache {
    fn bump(&self, symbol: &str) {
        let mut hits = self.hits.lock().unwrap();
        *hits.entry(symbol.to_string()).or_insert(0) += 1;
    }

    fn frequency(&self, symbol: &str) -> u64 {
        self.hits.lock().unwrap().get(symbol).copied().unwrap_or(0)
    }
}
