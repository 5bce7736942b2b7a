//! Symbol insertion engine — the weight-composition algorithm.
//!
//! Every rule hit funnels through [`insert`]. The pipeline per call:
//! 1. Normalize the weight (non-finite becomes 0 with a warning).
//! 2. Compose the final score: static weight × hit weight, or the raw weight
//!    for enforced unknown symbols; a per-message corrector replaces both.
//! 3. Branch on whether the symbol already fired:
//!    update (shot accounting, option dedup, same-sign replacement under
//!    single-shot) or insert (fresh entry, positive/negative counters).
//! 4. Run the committed contribution through the growth factor and the group
//!    caps; an exhausted cap aborts the commit but keeps the hit recorded.
//!
//! The growth factor and group caps are pure helpers so their interaction
//! stays testable in isolation.

use crate::config::ScanConfig;
use crate::domain::{SymbolDef, SymbolGroup};
use crate::scoring::metric::{MetricResult, SymbolResult};
use bitflags::bitflags;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

bitflags! {
    /// Flags steering one insertion call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InsertFlags: u32 {
        /// Force single-shot semantics for this call.
        const SINGLE = 1 << 0;
        /// Score an unknown symbol with the raw weight instead of zero.
        const ENFORCE = 1 << 1;
    }
}

/// Insert one symbol hit into `result`.
///
/// Returns the affected entry; the entry exists even when a group cap
/// suppressed its contribution.
#[allow(clippy::too_many_arguments)]
pub(crate) fn insert<'a>(
    result: &'a mut MetricResult,
    config: &ScanConfig,
    message_id: &str,
    symbol: &str,
    weight: f64,
    option: Option<&str>,
    corrector: Option<f64>,
    flags: InsertFlags,
) -> &'a mut SymbolResult {
    let weight = if weight.is_finite() {
        weight
    } else {
        warn!(message_id, symbol, "non-finite weight replaced with 0");
        0.0
    };

    let def = config.symbols.symbol(symbol).cloned();
    let mut single = flags.contains(InsertFlags::SINGLE);

    let mut final_score = match &def {
        Some(d) => {
            if d.one_shot() {
                single = true;
            }
            for group in &d.groups {
                result.sym_groups.entry(group.name.clone()).or_insert(0.0);
            }
            d.weight * weight
        }
        None if flags.contains(InsertFlags::ENFORCE) => weight,
        None => {
            debug!(message_id, symbol, "unknown symbol scored as zero");
            0.0
        }
    };

    // A per-message corrector replaces the static weight entirely, including
    // for unknown symbols.
    if let Some(corrector) = corrector {
        final_score = corrector * weight;
    }

    if result.symbols.contains_key(symbol) {
        update_existing(
            result,
            config,
            message_id,
            symbol,
            def.as_ref(),
            final_score,
            single,
            option,
        )
    } else {
        insert_new(
            result, config, message_id, symbol, def, final_score, option,
        )
    }
}

/// Update path: the symbol already fired on this message.
#[allow(clippy::too_many_arguments)]
fn update_existing<'a>(
    result: &'a mut MetricResult,
    config: &ScanConfig,
    message_id: &str,
    symbol: &str,
    def: Option<&Arc<SymbolDef>>,
    final_score: f64,
    mut single: bool,
    option: Option<&str>,
) -> &'a mut SymbolResult {
    let entry = result.symbols.get_mut(symbol).expect("checked by caller");

    let max_shots = if single {
        1
    } else {
        match def {
            Some(d) if d.nshots > 0 => d.nshots,
            _ => config.default_max_shots,
        }
    };
    if !single && entry.nshots >= max_shots {
        single = true;
    }
    entry.nshots += 1;

    if let Some(opt) = option {
        entry.add_option(opt, config.default_max_shots);
    }

    let stored = entry.score;
    let diff = if !single {
        final_score
    } else if stored.abs() < final_score.abs()
        && stored.is_sign_positive() == final_score.is_sign_positive()
    {
        // Replace a less significant same-sign score with a stronger one.
        // Opposite-sign hits never replace each other under single-shot.
        final_score - stored
    } else {
        0.0
    };

    if diff != 0.0 {
        let (adjusted, next_gf) = grow_factor(result.grow_factor, config.grow_factor, diff);
        let groups = def.map(|d| d.groups.as_slice()).unwrap_or(&[]);
        if let Some(applied) =
            cap_by_groups(&mut result.sym_groups, groups, adjusted, symbol, message_id)
        {
            result.score += applied;
            result.grow_factor = next_gf;
            let entry = result.symbols.get_mut(symbol).expect("checked by caller");
            if single {
                entry.score = final_score;
            } else {
                entry.score += applied;
            }
        }
        // Exhausted cap: nothing committed; the shot and option above stand.
    }

    result.symbols.get_mut(symbol).expect("checked by caller")
}

/// Insert path: first hit of this symbol on this message.
fn insert_new<'a>(
    result: &'a mut MetricResult,
    config: &ScanConfig,
    message_id: &str,
    symbol: &str,
    def: Option<Arc<SymbolDef>>,
    final_score: f64,
    option: Option<&str>,
) -> &'a mut SymbolResult {
    let (adjusted, next_gf) = grow_factor(result.grow_factor, config.grow_factor, final_score);
    let capped = {
        let groups = def.as_ref().map(|d| d.groups.as_slice()).unwrap_or(&[]);
        cap_by_groups(&mut result.sym_groups, groups, adjusted, symbol, message_id)
    };

    let mut entry = SymbolResult::new(symbol, def);
    if let Some(applied) = capped {
        entry.score = applied;
        result.score += applied;
        result.grow_factor = next_gf;
        if applied > f64::EPSILON {
            result.npositive += 1;
            result.positive_score += applied;
        } else if applied < -f64::EPSILON {
            result.nnegative += 1;
            result.negative_score += applied.abs();
        }
    }
    // An exhausted cap still records the symbol, with zero contribution.

    if let Some(opt) = option {
        entry.add_option(opt, config.default_max_shots);
    }

    result.symbols.entry(symbol.to_string()).or_insert(entry)
}

/// Growth-factor step for one contribution.
///
/// Returns the adjusted contribution and the factor to store on commit.
/// A non-positive contribution passes through untouched and resets the
/// stored factor to 1.
fn grow_factor(current: f64, configured: f64, contribution: f64) -> (f64, f64) {
    if contribution > 0.0 {
        if current != 0.0 {
            (contribution * current, current * configured)
        } else {
            (contribution, configured)
        }
    } else {
        (contribution, 1.0)
    }
}

/// Apply every group cap to a contribution.
///
/// Each capped group receives its own (possibly truncated) share; the value
/// committed to the aggregate score is the strictest truncation. Returns
/// `None` when some group is already at its cap, which suppresses the whole
/// contribution.
fn cap_by_groups(
    sym_groups: &mut HashMap<String, f64>,
    groups: &[Arc<SymbolGroup>],
    contribution: f64,
    symbol: &str,
    message_id: &str,
) -> Option<f64> {
    let mut applied = contribution;
    for group in groups {
        let group_score = sym_groups.entry(group.name.clone()).or_insert(0.0);
        let mut share = contribution;
        if group.is_capped() && contribution > 0.0 {
            if *group_score >= group.max_score {
                info!(
                    message_id,
                    symbol,
                    group = %group.name,
                    max_score = group.max_score,
                    "maximum group score reached, contribution suppressed"
                );
                return None;
            }
            if *group_score + share > group.max_score {
                share = group.max_score - *group_score;
            }
        }
        *group_score += share;
        if share < applied {
            applied = share;
        }
    }
    Some(applied)
}
