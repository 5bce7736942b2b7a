//! Mailsieve Core — symbol scoring and action selection for a
//! content-filtering pipeline.
//!
//! This crate contains the heart of the scoring engine:
//! - Domain types (actions, symbol definitions, symbol groups)
//! - Per-message metric results with group sums and shot accounting
//! - The insertion engine (weight composition, growth factor, group caps,
//!   single vs. multi-shot semantics, option deduplication)
//! - Priority-ordered pass-through overrides
//! - The action selector reconciling thresholds and pass-throughs
//! - TOML configuration with a symbol registry
//!
//! Analyzers call [`ScanTask::insert_result`] as rules fire; the hosting
//! pipeline calls [`ScanTask::check_action`] at finalization to read out the
//! terminal verdict.

pub mod config;
pub mod domain;
pub mod registry;
pub mod scoring;
pub mod task;

pub use config::{ConfigError, ScanConfig};
pub use domain::{Action, SymbolDef, SymbolFlags, SymbolGroup, SymbolName, UnknownAction};
pub use registry::{InMemorySymbolCache, SymbolCache, SymbolRegistry};
pub use scoring::{InsertFlags, MetricResult, PassthroughResult, SymbolResult};
pub use task::{ProcessedStages, ScanTask};
