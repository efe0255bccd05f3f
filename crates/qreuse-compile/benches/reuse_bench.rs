//! Benchmarks for causal-cone analysis and the reuse rewrite
//!
//! Run with: cargo bench -p qreuse-compile

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qreuse_compile::passes::causal_cones;
use qreuse_compile::{ReuseMode, reduce_qubits};
use qreuse_ir::{Circuit, CircuitDag, ClbitId, QubitId};

/// Independent Bell pairs, each measured at the end.
fn bell_pairs(pairs: u32) -> CircuitDag {
    let mut circuit = Circuit::with_size("pairs", pairs * 2, pairs * 2);
    for p in 0..pairs {
        let (a, b) = (QubitId(2 * p), QubitId(2 * p + 1));
        circuit.h(a).unwrap();
        circuit.cx(a, b).unwrap();
        circuit.measure(a, ClbitId(2 * p)).unwrap();
        circuit.measure(b, ClbitId(2 * p + 1)).unwrap();
    }
    circuit.into_dag()
}

/// Benchmark causal-cone analysis on GHZ chains
fn bench_causal_cones(c: &mut Criterion) {
    let mut group = c.benchmark_group("causal_cones");

    for num_qubits in &[10, 50, 100] {
        let dag = Circuit::ghz(*num_qubits).unwrap().into_dag();
        group.bench_with_input(BenchmarkId::new("ghz", num_qubits), &dag, |b, dag| {
            b.iter(|| black_box(causal_cones(dag).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark each reuse mode
fn bench_reduce_qubits(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_qubits");

    for pairs in &[5, 25, 50] {
        let dag = bell_pairs(*pairs);
        for mode in [ReuseMode::Normal, ReuseMode::Dual, ReuseMode::Default] {
            group.bench_with_input(
                BenchmarkId::new(mode.to_string(), pairs),
                &dag,
                |b, dag| {
                    b.iter(|| black_box(reduce_qubits(dag, mode).unwrap()));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_causal_cones, bench_reduce_qubits);
criterion_main!(benches);
