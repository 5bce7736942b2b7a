//! Action selection — reconciling the accumulated score against the
//! threshold ladder, under the rule that pass-throughs win by priority.

use crate::domain::Action;
use crate::scoring::metric::MetricResult;
use tracing::info;

/// Decide the terminal action for a result.
///
/// With a pass-through present, the highest-priority entry wins
/// unconditionally; a finite target score is forced onto the result, except
/// that a `no-action` pass-through only clamps the score downward (an
/// explicit allow must never make the verdict worse than computed).
///
/// Without one, the ladder is scanned severest-first and the matched action
/// with the **largest** threshold is selected. Matching by threshold value
/// rather than enum ordinal is deliberate: the ladder is sparse and may be
/// configured non-monotonically, and a lower-severity action with a larger
/// exceeded threshold must not be shadowed.
pub(crate) fn check(result: &mut MetricResult, message_id: &str) -> Action {
    if let Some(head) = result.passthroughs.first() {
        let (action, priority, target) = (head.action, head.priority, head.target_score);
        if target.is_finite() {
            if action == Action::NoAction {
                result.score = result.score.min(target);
            } else {
                result.score = target;
            }
        }
        info!(
            message_id,
            %action,
            priority,
            target_score = target,
            "pass-through overrides scored action"
        );
        return action;
    }

    let mut selected = Action::NoAction;
    let mut best_limit = f64::NEG_INFINITY;
    for (&action, &limit) in &result.actions_limits {
        if action == Action::NoAction || limit.is_nan() {
            continue;
        }
        if result.score >= limit && limit > best_limit {
            selected = action;
            best_limit = limit;
        }
    }
    selected
}
