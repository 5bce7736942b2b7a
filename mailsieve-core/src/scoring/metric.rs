//! Per-message metric result — the symbol map, group sums, and aggregate
//! score that insertions accumulate into.
//!
//! One `MetricResult` exists per scanned message, created lazily by the task
//! on first need. Everything a result owns (symbol entries, option strings,
//! pass-through records) is released together when it drops; the drop hook
//! also folds the final distinct-symbol count into the process-wide average
//! used to pre-size later results.

use crate::config::ScanConfig;
use crate::domain::{Action, SymbolDef, SymbolName};
use crate::scoring::counter;
use crate::scoring::passthrough::PassthroughResult;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Accumulated state of one symbol that fired on a message.
#[derive(Debug, Clone)]
pub struct SymbolResult {
    /// Owned copy of the symbol name.
    pub name: SymbolName,
    /// Definition handle; absent for unknown/dynamic symbols.
    pub def: Option<Arc<SymbolDef>>,
    /// Accumulated score contribution.
    pub score: f64,
    /// Number of times the symbol fired. Always >= 1 once the entry exists.
    pub nshots: u32,
    /// Distinct option strings; allocated on first option so dry hits stay
    /// allocation-free. `None` means the symbol never carried an option.
    options: Option<HashSet<String>>,
    /// First-insertion order of distinct options.
    opts_order: Vec<String>,
}

impl SymbolResult {
    pub(crate) fn new(name: &str, def: Option<Arc<SymbolDef>>) -> Self {
        Self {
            name: name.to_string(),
            def,
            score: 0.0,
            nshots: 1,
            options: None,
            opts_order: Vec::new(),
        }
    }

    /// Attach an option string to this symbol.
    ///
    /// Duplicates are ignored. Symbols flagged `ONE_PARAM` keep exactly one
    /// option; everything else is capped at `max_opts` distinct options.
    /// Returns whether the option was actually added.
    pub fn add_option(&mut self, value: &str, max_opts: u32) -> bool {
        match &mut self.options {
            Some(set) => {
                if self.def.as_ref().is_some_and(|d| d.one_param()) {
                    return false;
                }
                if set.len() >= max_opts as usize || set.contains(value) {
                    return false;
                }
                set.insert(value.to_string());
                self.opts_order.push(value.to_string());
                true
            }
            None => {
                let mut set = HashSet::new();
                set.insert(value.to_string());
                self.options = Some(set);
                self.opts_order.push(value.to_string());
                true
            }
        }
    }

    /// Distinct options in first-insertion order.
    pub fn options(&self) -> &[String] {
        &self.opts_order
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.as_ref().is_some_and(|set| set.contains(value))
    }

    /// Whether any option was ever attached (an empty set cannot occur).
    pub fn has_options(&self) -> bool {
        self.options.is_some()
    }
}

/// Scoring state of one message.
#[derive(Debug)]
pub struct MetricResult {
    pub(crate) symbols: HashMap<SymbolName, SymbolResult>,
    pub(crate) sym_groups: HashMap<String, f64>,
    /// Aggregate message score.
    pub score: f64,
    /// Amplification carried between insertions; 0 until the first positive
    /// contribution commits.
    pub grow_factor: f64,
    /// Symbols whose first committed score was positive / negative, with the
    /// corresponding score mass.
    pub npositive: u32,
    pub positive_score: f64,
    pub nnegative: u32,
    pub negative_score: f64,
    pub(crate) actions_limits: BTreeMap<Action, f64>,
    pub(crate) passthroughs: Vec<PassthroughResult>,
}

impl MetricResult {
    /// Build a fresh result, copying the action ladder from `config` when
    /// present and disabling every action (NaN) otherwise.
    pub fn new(config: Option<&ScanConfig>) -> Self {
        let mut actions_limits = BTreeMap::new();
        for action in Action::ALL {
            let limit = config
                .and_then(|c| c.actions.get(&action).copied())
                .unwrap_or(f64::NAN);
            actions_limits.insert(action, limit);
        }

        Self {
            symbols: HashMap::with_capacity(counter::suggested_symbols_capacity()),
            sym_groups: HashMap::with_capacity(4),
            score: 0.0,
            grow_factor: 0.0,
            npositive: 0,
            positive_score: 0.0,
            nnegative: 0,
            negative_score: 0.0,
            actions_limits,
            passthroughs: Vec::new(),
        }
    }

    /// Exact-match symbol lookup.
    pub fn symbol(&self, name: &str) -> Option<&SymbolResult> {
        self.symbols.get(name)
    }

    pub fn symbol_mut(&mut self, name: &str) -> Option<&mut SymbolResult> {
        self.symbols.get_mut(name)
    }

    /// Visit every symbol exactly once; order is unspecified.
    pub fn foreach_symbol<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &SymbolResult),
    {
        for (name, sym) in &self.symbols {
            visitor(name, sym);
        }
    }

    /// Number of distinct symbols that fired.
    pub fn symbols_count(&self) -> usize {
        self.symbols.len()
    }

    /// Accumulated score of a group, if any symbol in it fired.
    pub fn group_score(&self, group: &str) -> Option<f64> {
        self.sym_groups.get(group).copied()
    }

    /// Threshold for an action on this result; NaN means disabled.
    pub fn action_limit(&self, action: Action) -> f64 {
        self.actions_limits
            .get(&action)
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Pass-through overrides, highest priority first.
    pub fn passthroughs(&self) -> &[PassthroughResult] {
        &self.passthroughs
    }
}

impl Drop for MetricResult {
    fn drop(&mut self) {
        counter::observe_symbols_count(self.symbols.len());
    }
}
