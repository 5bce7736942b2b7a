//! Property tests for scoring invariants.
//!
//! Uses proptest to verify:
//! 1. Group caps — a capped group's sum never exceeds its max score
//! 2. Shot accounting — nshots >= 1 for every recorded symbol
//! 3. Option bookkeeping — distinct options stay distinct and ordered
//! 4. Pass-through ordering — non-increasing priority after every insert
//! 5. Aggregate consistency — with amplification and caps disabled, the
//!    message score is the sum of the per-symbol scores

use mailsieve_core::{Action, InsertFlags, ScanConfig, ScanTask, SymbolDef};
use proptest::prelude::*;
use std::sync::Arc;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_weight() -> impl Strategy<Value = f64> {
    (-10.0..10.0_f64).prop_map(|w| (w * 100.0).round() / 100.0)
}

fn arb_symbol_index() -> impl Strategy<Value = usize> {
    0..4_usize
}

fn arb_option() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None::<String>),
        "[a-d]{1,3}".prop_map(Some),
    ]
}

const SYMBOLS: [&str; 4] = ["SYM_A", "SYM_B", "SYM_C", "SYM_D"];

fn capped_task(max_score: f64) -> ScanTask {
    let mut config = ScanConfig::default();
    let group = config.symbols.add_group("capped", max_score);
    for name in SYMBOLS {
        config
            .symbols
            .register(SymbolDef::new(name, 1.0).in_group(Arc::clone(&group)));
    }
    ScanTask::new(Arc::new(config)).with_message_id("prop@localhost")
}

fn plain_task() -> ScanTask {
    let mut config = ScanConfig::default();
    for name in SYMBOLS {
        config.symbols.register(SymbolDef::new(name, 1.0));
    }
    ScanTask::new(Arc::new(config)).with_message_id("prop@localhost")
}

// ── 1. Group caps ────────────────────────────────────────────────────

proptest! {
    /// However the hits arrive, a capped group never exceeds its limit.
    #[test]
    fn group_sum_never_exceeds_cap(
        hits in prop::collection::vec((arb_symbol_index(), arb_weight()), 1..40),
    ) {
        let mut task = capped_task(10.0);
        for (idx, weight) in hits {
            task.insert_result(SYMBOLS[idx], weight, None, InsertFlags::empty());
        }
        let group_sum = task.result().unwrap().group_score("capped").unwrap();
        prop_assert!(group_sum <= 10.0 + 1e-9, "group sum {} exceeds cap", group_sum);
    }
}

// ── 2 & 3. Shot and option accounting ────────────────────────────────

proptest! {
    /// Every recorded symbol has fired at least once, and its option list
    /// is duplicate-free regardless of how hits repeat.
    #[test]
    fn shots_and_options_stay_consistent(
        hits in prop::collection::vec(
            (arb_symbol_index(), arb_weight(), arb_option()),
            1..40,
        ),
    ) {
        let mut task = plain_task();
        for (idx, weight, option) in &hits {
            task.insert_result(
                SYMBOLS[*idx],
                *weight,
                option.as_deref(),
                InsertFlags::empty(),
            );
        }

        let mut visited = 0;
        task.foreach_symbol_result(|_, sym| {
            visited += 1;
            assert!(sym.nshots >= 1);
            let mut options = sym.options().to_vec();
            options.sort();
            options.dedup();
            assert_eq!(options.len(), sym.options().len(), "duplicate option stored");
        });
        prop_assert!(visited >= 1);
        prop_assert!(visited <= SYMBOLS.len());
    }

    /// Hit counts add up: a symbol's nshots equals the number of insertions
    /// that targeted it.
    #[test]
    fn nshots_counts_every_hit(
        hits in prop::collection::vec(arb_symbol_index(), 1..40),
    ) {
        let mut task = plain_task();
        let mut expected = [0u32; 4];
        for idx in hits {
            task.insert_result(SYMBOLS[idx], 1.0, None, InsertFlags::empty());
            expected[idx] += 1;
        }
        for (idx, name) in SYMBOLS.iter().enumerate() {
            if expected[idx] > 0 {
                prop_assert_eq!(
                    task.find_symbol_result(name).unwrap().nshots,
                    expected[idx]
                );
            } else {
                prop_assert!(task.find_symbol_result(name).is_none());
            }
        }
    }
}

// ── 4. Pass-through ordering ─────────────────────────────────────────

proptest! {
    /// The pass-through list is in non-increasing priority order after any
    /// sequence of additions.
    #[test]
    fn passthroughs_sorted_by_descending_priority(
        priorities in prop::collection::vec(0u32..20, 1..20),
    ) {
        let mut task = plain_task();
        for priority in priorities {
            task.add_passthrough(Action::Greylist, priority, f64::NAN, "", "prop");
        }
        let stored: Vec<u32> = task
            .result()
            .unwrap()
            .passthroughs()
            .iter()
            .map(|p| p.priority)
            .collect();
        for window in stored.windows(2) {
            prop_assert!(window[0] >= window[1]);
        }
    }
}

// ── 5. Aggregate consistency ─────────────────────────────────────────

proptest! {
    /// With the growth factor disabled and no groups, the aggregate score
    /// is exactly the sum of the per-symbol scores.
    #[test]
    fn score_is_sum_of_symbol_scores(
        hits in prop::collection::vec((arb_symbol_index(), arb_weight()), 1..40),
    ) {
        let mut task = plain_task();
        for (idx, weight) in hits {
            task.insert_result(SYMBOLS[idx], weight, None, InsertFlags::empty());
        }
        let result = task.result().unwrap();
        let mut sum = 0.0;
        result.foreach_symbol(|_, sym| sum += sym.score);
        prop_assert!((result.score - sum).abs() < 1e-9);
    }
}
