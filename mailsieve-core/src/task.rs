//! Scan task façade — per-message state and the public scoring entry points.
//!
//! A `ScanTask` is what the hosting pipeline holds while analyzers run. It
//! owns the lazily-created [`MetricResult`], the per-message score overrides,
//! and the processed-stage bitmask that gates late mutation. All operations
//! are synchronous; the owner serializes access.

use crate::config::ScanConfig;
use crate::domain::{Action, SymbolName};
use crate::scoring::action_select;
use crate::scoring::insertion::{self, InsertFlags};
use crate::scoring::metric::{MetricResult, SymbolResult};
use crate::scoring::passthrough::{self, PassthroughResult};
use bitflags::bitflags;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

bitflags! {
    /// Pipeline stages a task has entered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ProcessedStages: u32 {
        const PRE_FILTERS = 1 << 0;
        const FILTERS = 1 << 1;
        const CLASSIFIERS = 1 << 2;
        const COMPOSITES = 1 << 3;
        const POST_FILTERS = 1 << 4;
        /// Finalization replay stage; symbol mutation is refused once set.
        const IDEMPOTENT = 1 << 5;
        const DONE = 1 << 6;
    }
}

/// Per-message scan state.
pub struct ScanTask {
    /// Identifier used to correlate log lines, typically the Message-ID.
    pub message_id: String,
    config: Arc<ScanConfig>,
    /// Per-message score correctors keyed by symbol name; set from user or
    /// domain settings before filters run.
    settings: Option<HashMap<SymbolName, f64>>,
    stages: ProcessedStages,
    result: Option<MetricResult>,
}

impl ScanTask {
    pub fn new(config: Arc<ScanConfig>) -> Self {
        Self {
            message_id: "undef".to_string(),
            config,
            settings: None,
            stages: ProcessedStages::empty(),
            result: None,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = message_id.into();
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    // ── Stage control ──────────────────────────────────────────────────

    pub fn set_stage(&mut self, stage: ProcessedStages) {
        self.stages |= stage;
    }

    pub fn stages(&self) -> ProcessedStages {
        self.stages
    }

    // ── Per-message settings ───────────────────────────────────────────

    /// Override the score of `symbol` for this message only: the corrector
    /// replaces the static weight in every subsequent insertion.
    pub fn set_settings_score(&mut self, symbol: impl Into<SymbolName>, corrector: f64) {
        self.settings
            .get_or_insert_with(HashMap::new)
            .insert(symbol.into(), corrector);
    }

    pub fn settings_score(&self, symbol: &str) -> Option<f64> {
        self.settings.as_ref().and_then(|s| s.get(symbol)).copied()
    }

    // ── Metric result lifecycle ────────────────────────────────────────

    /// The task's metric result, created on first call. Idempotent: later
    /// calls return the same result unchanged.
    pub fn metric_result(&mut self) -> &mut MetricResult {
        if self.result.is_none() {
            self.result = Some(MetricResult::new(Some(&self.config)));
        }
        self.result.as_mut().expect("just created")
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// Read-only view of the result, if any insertion or pass-through
    /// created it.
    pub fn result(&self) -> Option<&MetricResult> {
        self.result.as_ref()
    }

    // ── Scoring entry points ───────────────────────────────────────────

    /// Insert one symbol hit.
    ///
    /// Returns `None` only when the task already entered the idempotent
    /// stage; the hit is then refused without mutation. Otherwise the
    /// affected symbol entry is returned, even when a group cap suppressed
    /// the score contribution.
    pub fn insert_result(
        &mut self,
        symbol: &str,
        weight: f64,
        option: Option<&str>,
        flags: InsertFlags,
    ) -> Option<&mut SymbolResult> {
        if self.stages.contains(ProcessedStages::IDEMPOTENT) {
            error!(
                message_id = %self.message_id,
                symbol,
                weight,
                "cannot insert symbol in the idempotent stage"
            );
            return None;
        }

        let config = Arc::clone(&self.config);
        let corrector = self.settings_score(symbol);
        self.metric_result();
        let result = self.result.as_mut().expect("just created");

        let entry = insertion::insert(
            result,
            &config,
            &self.message_id,
            symbol,
            weight,
            option,
            corrector,
            flags,
        );

        if let Some(cache) = &config.cache {
            cache.bump(symbol);
        }
        Some(entry)
    }

    /// Insert one symbol hit with single-shot semantics.
    pub fn insert_result_single(
        &mut self,
        symbol: &str,
        weight: f64,
        option: Option<&str>,
    ) -> Option<&mut SymbolResult> {
        self.insert_result(symbol, weight, option, InsertFlags::SINGLE)
    }

    /// Attach an option to an already-recorded symbol. Idempotent on
    /// duplicates; returns whether the option was added.
    pub fn add_result_option(&mut self, symbol: &str, value: &str) -> bool {
        let max_opts = self.config.default_max_shots;
        match self.result.as_mut().and_then(|r| r.symbol_mut(symbol)) {
            Some(entry) => entry.add_option(value, max_opts),
            None => false,
        }
    }

    /// Record an override decision that bypasses threshold scoring.
    pub fn add_passthrough(
        &mut self,
        action: Action,
        priority: u32,
        target_score: f64,
        message: impl Into<String>,
        module: impl Into<String>,
    ) {
        let module = module.into();
        info!(
            message_id = %self.message_id,
            %action,
            priority,
            target_score,
            module = %module,
            "pass-through result added"
        );
        let entry = PassthroughResult {
            action,
            priority,
            target_score,
            message: message.into(),
            module,
        };
        let result = self.metric_result();
        passthrough::add(&mut result.passthroughs, entry);
    }

    /// Exact-match symbol lookup on the result.
    pub fn find_symbol_result(&self, symbol: &str) -> Option<&SymbolResult> {
        self.result.as_ref().and_then(|r| r.symbol(symbol))
    }

    /// Visit every recorded symbol exactly once; order is unspecified.
    pub fn foreach_symbol_result<F>(&self, visitor: F)
    where
        F: FnMut(&str, &SymbolResult),
    {
        if let Some(result) = &self.result {
            result.foreach_symbol(visitor);
        }
    }

    /// Resolve the terminal action for this task.
    pub fn check_action(&mut self) -> Action {
        match &mut self.result {
            Some(result) => action_select::check(result, &self.message_id),
            None => Action::NoAction,
        }
    }
}
