//! Criterion benchmarks for the simulator.
//!
//! Run with: cargo bench -p specl-sim

use criterion::{criterion_group, criterion_main, Criterion};
use specl_sim::{GuardedModel, ProgressEvent, SimConfig, Simulator, Value};
use std::sync::Arc;

fn int(v: &Value) -> i64 {
    v.as_int().unwrap_or(0)
}

/// Token passed around a ring of `n` processes, each with a visit counter.
fn token_ring(n: usize) -> GuardedModel {
    let names: Vec<String> = std::iter::once("token".to_string())
        .chain((0..n).map(|i| format!("visits{}", i)))
        .collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut init = vec![Value::int(0)];
    init.extend(std::iter::repeat(Value::int(0)).take(n));

    let mut model = GuardedModel::new("TokenRing", &names).init(init);
    for i in 0..n as i64 {
        model = model.action(&format!("Pass{}", i), move |v| {
            if int(&v[0]) != i {
                return Ok(vec![]);
            }
            let mut next = v.to_vec();
            next[0] = Value::int((i + 1) % n as i64);
            next[i as usize + 1] = Value::int(int(&v[i as usize + 1]) + 1);
            Ok(vec![next])
        });
    }
    model.invariant("TokenInRange", move |v| Ok((0..n as i64).contains(&int(&v[0]))))
}

/// Two jugs; every step branches into several successors.
fn jugs() -> GuardedModel {
    GuardedModel::new("Jugs", &["small", "big"])
        .init(vec![Value::int(0), Value::int(0)])
        .action("Fill", |v| {
            Ok(vec![
                vec![Value::int(3), v[1].clone()],
                vec![v[0].clone(), Value::int(5)],
            ])
        })
        .action("Empty", |v| {
            Ok(vec![
                vec![Value::int(0), v[1].clone()],
                vec![v[0].clone(), Value::int(0)],
            ])
        })
        .action("Pour", |v| {
            let (s, b) = (int(&v[0]), int(&v[1]));
            let into_big = s.min(5 - b);
            let into_small = b.min(3 - s);
            Ok(vec![
                vec![Value::int(s - into_big), Value::int(b + into_big)],
                vec![Value::int(s + into_small), Value::int(b - into_small)],
            ])
        })
        .invariant("SmallFits", |v| Ok((0..=3).contains(&int(&v[0]))))
        .invariant("BigFits", |v| Ok((0..=5).contains(&int(&v[1]))))
}

fn bench_simulate(c: &mut Criterion, name: &str, model: fn() -> GuardedModel, config: SimConfig) {
    c.bench_function(name, |b| {
        b.iter(|| {
            let report = Simulator::new(model(), config.clone()).run().unwrap();
            assert!(report.is_ok());
        })
    });
}

fn benchmarks(c: &mut Criterion) {
    let default = SimConfig {
        num_traces: 200,
        trace_depth: 100,
        check_deadlock: false,
        progress: Some(Arc::new(|_: &ProgressEvent| {})),
        ..Default::default()
    };

    bench_simulate(c, "jugs_200x100", jugs, default.clone());
    bench_simulate(c, "token_ring_8_200x100", || token_ring(8), default.clone());
    bench_simulate(
        c,
        "jugs_200x100_coverage",
        jugs,
        SimConfig {
            coverage: true,
            ..default.clone()
        },
    );
    bench_simulate(
        c,
        "token_ring_8_20x2000",
        || token_ring(8),
        SimConfig {
            num_traces: 20,
            trace_depth: 2000,
            ..default
        },
    );
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
