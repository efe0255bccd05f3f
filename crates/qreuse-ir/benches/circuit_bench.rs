//! Benchmarks for DAG operations used by the reuse rewriter
//!
//! Run with: cargo bench -p qreuse-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qreuse_ir::{Circuit, ClbitId, QubitId, WireId};

fn layered_circuit(n: u32, layers: u32) -> Circuit {
    let mut circuit = Circuit::with_size("bench", n, n);
    for _layer in 0..layers {
        for i in 0..n {
            circuit.h(QubitId(i)).unwrap();
        }
        for i in (0..n - 1).step_by(2) {
            circuit.cx(QubitId(i), QubitId(i + 1)).unwrap();
        }
    }
    for i in 0..n {
        circuit.measure(QubitId(i), ClbitId(i)).unwrap();
    }
    circuit
}

/// Benchmark GHZ construction through the builder
fn bench_ghz_circuit(c: &mut Criterion) {
    let mut group = c.benchmark_group("ghz_circuit");

    for num_qubits in &[5, 20, 100] {
        group.bench_with_input(
            BenchmarkId::new("create", num_qubits),
            num_qubits,
            |b, &n| {
                b.iter(|| black_box(Circuit::ghz(n).unwrap()));
            },
        );
    }

    group.finish();
}

/// Benchmark walking every qubit wire
fn bench_wire_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("wire_walk");

    for num_qubits in &[10, 50] {
        let circuit = layered_circuit(*num_qubits, 10);
        group.bench_with_input(
            BenchmarkId::new("nodes_on_wire", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| {
                    for qubit in circuit.dag().qubits() {
                        black_box(circuit.dag().nodes_on_wire(WireId::Qubit(qubit)).unwrap());
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark reversing a circuit
fn bench_reverse_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("reverse_ops");

    for num_qubits in &[10, 50] {
        let circuit = layered_circuit(*num_qubits, 10);
        group.bench_with_input(
            BenchmarkId::new("reverse", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| black_box(circuit.dag().reverse_ops().unwrap()));
            },
        );
    }

    group.finish();
}

/// Benchmark JSON decoding
fn bench_json(c: &mut Criterion) {
    let json = layered_circuit(20, 10).to_json().unwrap();
    c.bench_function("json_decode_20q", |b| {
        b.iter(|| black_box(Circuit::from_json(black_box(&json)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_ghz_circuit,
    bench_wire_walk,
    bench_reverse_ops,
    bench_json,
);

criterion_main!(benches);
