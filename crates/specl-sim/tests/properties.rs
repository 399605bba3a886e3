//! Property tests for behavior generation.

use proptest::prelude::*;
use specl_sim::{
    GuardedModel, LivenessViolation, ProgressEvent, SimConfig, Simulator, State, Value,
};
use std::sync::{Arc, Mutex};

/// Bounded counter with `n_actions` increments of different sizes.
fn steps(n_actions: usize, max: i64) -> GuardedModel {
    let mut model = GuardedModel::new("Steps", &["x"]).init(vec![Value::int(0)]);
    for k in 1..=n_actions as i64 {
        model = model.action(&format!("Add{}", k), move |v| {
            let x = v[0].as_int().unwrap_or(0);
            Ok(if x + k <= max {
                vec![vec![Value::int(x + k)]]
            } else {
                vec![]
            })
        });
    }
    model
}

fn quiet(num_traces: u64, trace_depth: usize, seed: u64) -> SimConfig {
    SimConfig {
        num_traces,
        trace_depth,
        seed,
        check_deadlock: false,
        progress: Some(Arc::new(|_: &ProgressEvent| {})),
        ..Default::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn behaviors_never_exceed_depth(
        n_actions in 1usize..6,
        max in 0i64..40,
        depth in 1usize..25,
        seed in any::<u64>(),
    ) {
        let lengths = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&lengths);
        let liveness = move |trace: &[State]| -> Result<(), LivenessViolation> {
            seen.lock().unwrap().push(trace.len());
            Ok(())
        };
        let report = Simulator::with_liveness(steps(n_actions, max), quiet(10, depth, seed), liveness)
            .run()
            .unwrap();
        prop_assert!(report.is_ok());

        let lengths = lengths.lock().unwrap();
        prop_assert_eq!(lengths.len(), 10);
        for &len in lengths.iter() {
            prop_assert!(len >= 1 && len <= depth);
        }
    }

    #[test]
    fn states_are_counted_once(
        n_actions in 1usize..4,
        depth in 1usize..15,
        seed in any::<u64>(),
    ) {
        // Unbounded steps: every step generates exactly one successor.
        let report = Simulator::new(steps(n_actions, i64::MAX / 2), quiet(7, depth, seed))
            .run()
            .unwrap();
        prop_assert_eq!(report.summary.traces, 7);
        prop_assert_eq!(report.summary.states_generated, 1 + 7 * depth as u64);
    }
}

#[test]
fn summary_serializes_as_json() {
    let report = Simulator::new(steps(2, 10), quiet(3, 4, 42)).run().unwrap();
    let json = serde_json::to_value(report.summary).unwrap();
    assert_eq!(json["traces"], 3);
    assert_eq!(json["seed"], 42);
    assert_eq!(json["aril"], report.summary.aril);
    assert_eq!(json["states_generated"], report.summary.states_generated);
}
