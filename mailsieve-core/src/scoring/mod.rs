//! Scoring core — metric results, the insertion engine, pass-through
//! overrides, and action selection.

pub(crate) mod action_select;
pub(crate) mod counter;
pub mod insertion;
pub mod metric;
pub mod passthrough;

pub use insertion::InsertFlags;
pub use metric::{MetricResult, SymbolResult};
pub use passthrough::PassthroughResult;
