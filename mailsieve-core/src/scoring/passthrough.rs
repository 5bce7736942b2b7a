//! Pass-through overrides — explicit decisions that bypass threshold scoring.
//!
//! A pass-through is typically produced by a high-priority policy (an allow
//! list, an administrator rule, a rate limiter). The list is kept sorted by
//! descending priority; the action selector only ever consults the head.

use crate::domain::Action;

/// One recorded override decision.
#[derive(Debug, Clone)]
pub struct PassthroughResult {
    pub action: Action,
    /// Higher wins; ties keep insertion order.
    pub priority: u32,
    /// Score forced onto the result when the override wins; NaN leaves the
    /// computed score untouched.
    pub target_score: f64,
    pub message: String,
    /// Module that produced the override.
    pub module: String,
}

/// Append an override and restore the descending-priority order.
///
/// The sort is stable, so among entries with equal priority the earliest
/// caller stays in front. No deduplication is performed.
pub(crate) fn add(list: &mut Vec<PassthroughResult>, entry: PassthroughResult) {
    list.push(entry);
    list.sort_by(|a, b| b.priority.cmp(&a.priority));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: Action, priority: u32) -> PassthroughResult {
        PassthroughResult {
            action,
            priority,
            target_score: f64::NAN,
            message: String::new(),
            module: "test".into(),
        }
    }

    #[test]
    fn kept_sorted_by_descending_priority() {
        let mut list = Vec::new();
        add(&mut list, entry(Action::Greylist, 1));
        add(&mut list, entry(Action::Reject, 10));
        add(&mut list, entry(Action::AddHeader, 5));
        let priorities: Vec<u32> = list.iter().map(|p| p.priority).collect();
        assert_eq!(priorities, [10, 5, 1]);
    }

    #[test]
    fn equal_priority_keeps_insertion_order() {
        let mut list = Vec::new();
        add(&mut list, entry(Action::Reject, 5));
        add(&mut list, entry(Action::Greylist, 5));
        add(&mut list, entry(Action::NoAction, 5));
        assert_eq!(list[0].action, Action::Reject);
        assert_eq!(list[1].action, Action::Greylist);
        assert_eq!(list[2].action, Action::NoAction);
    }

    #[test]
    fn no_deduplication() {
        let mut list = Vec::new();
        add(&mut list, entry(Action::Reject, 5));
        add(&mut list, entry(Action::Reject, 5));
        assert_eq!(list.len(), 2);
    }
}
