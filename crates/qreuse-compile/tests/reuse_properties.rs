//! End-to-end and property tests for the qubit reuse pipeline.

use std::collections::BTreeMap;

use proptest::prelude::*;

use qreuse_compile::passes::causal_cone;
use qreuse_compile::{
    CouplingMap, PassManagerBuilder, ReuseConfig, ReuseMode, ReuseStats, VerificationResult,
    reduce_qubits,
};
use qreuse_ir::{Circuit, CircuitDag, ClassicalCondition, ClbitId, QubitId, StandardGate};

#[derive(Debug, Clone)]
enum Op {
    H(u32),
    X(u32),
    Cx(u32, u32),
    Measure(u32),
    Reset(u32),
    Barrier,
    CondX(u32, u32),
}

fn op_strategy(n: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => (0..n).prop_map(Op::H),
        1 => (0..n).prop_map(Op::X),
        1 => (0..n, 0..n).prop_map(|(a, b)| Op::Cx(a, b)),
        3 => (0..n).prop_map(Op::Measure),
        1 => (0..n).prop_map(Op::Reset),
        1 => Just(Op::Barrier),
        1 => (0..n, 0..n).prop_map(|(q, c)| Op::CondX(q, c)),
    ]
}

fn circuit_strategy() -> impl Strategy<Value = CircuitDag> {
    (1u32..6)
        .prop_flat_map(|n| (Just(n), prop::collection::vec(op_strategy(n), 0..24)))
        .prop_map(|(n, ops)| build(n, &ops))
}

fn build(n: u32, ops: &[Op]) -> CircuitDag {
    let mut circuit = Circuit::with_size("random", n, n);
    for op in ops {
        match *op {
            Op::H(q) => {
                circuit.h(QubitId(q)).unwrap();
            }
            Op::X(q) => {
                circuit.x(QubitId(q)).unwrap();
            }
            Op::Cx(a, b) if a != b => {
                circuit.cx(QubitId(a), QubitId(b)).unwrap();
            }
            Op::Cx(..) => {}
            Op::Measure(q) => {
                circuit.measure(QubitId(q), ClbitId(q)).unwrap();
            }
            Op::Reset(q) => {
                circuit.reset(QubitId(q)).unwrap();
            }
            Op::Barrier => {
                circuit.barrier_all().unwrap();
            }
            Op::CondX(q, c) => {
                circuit
                    .c_if(
                        StandardGate::X,
                        [QubitId(q)],
                        ClassicalCondition::on_bits("c", [c], 1),
                    )
                    .unwrap();
            }
        }
    }
    circuit.into_dag()
}

/// Count operations by name, leaving out barriers and resets.
fn op_counts(dag: &CircuitDag) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for (_, inst) in dag.topological_ops() {
        if !inst.is_barrier() && !inst.is_reset() {
            *counts.entry(inst.name().to_string()).or_default() += 1;
        }
    }
    counts
}

/// Operations along a classical wire as (name, qubits), with every qubit
/// sent through `slot`.
fn clbit_trace(
    dag: &CircuitDag,
    clbit: ClbitId,
    slot: impl Fn(QubitId) -> QubitId,
) -> Vec<(String, Vec<QubitId>)> {
    dag.nodes_on_wire(clbit.into())
        .unwrap()
        .into_iter()
        .filter_map(|n| dag.get_instruction(n))
        .map(|i| (i.name().to_string(), i.qubits.iter().map(|&q| slot(q)).collect()))
        .collect()
}

fn count_resets(dag: &CircuitDag) -> usize {
    dag.topological_ops().filter(|(_, i)| i.is_reset()).count()
}

proptest! {
    #[test]
    fn prop_cone_contains_own_qubit(dag in circuit_strategy()) {
        for index in 0..dag.num_qubits() {
            let cone = causal_cone(&dag, index).unwrap();
            prop_assert!(cone.contains(&index));
            prop_assert!(cone.iter().all(|&q| q < dag.num_qubits()));
        }
    }

    #[test]
    fn prop_rewrite_preserves_work(dag in circuit_strategy()) {
        for mode in [ReuseMode::Normal, ReuseMode::Dual] {
            let selection = reduce_qubits(&dag, mode).unwrap();
            let out = &selection.outcome;

            prop_assert!(out.num_qubits() <= dag.num_qubits());
            prop_assert_eq!(out.dag.num_clbits(), dag.num_clbits());
            prop_assert_eq!(op_counts(&out.dag), op_counts(&dag));
            prop_assert_eq!(
                count_resets(&out.dag),
                count_resets(&dag) + out.resets_inserted
            );
            // Each qubit either opens a new slot or takes over one after a reset.
            prop_assert_eq!(out.resets_inserted + out.num_qubits(), dag.num_qubits());
            prop_assert_eq!(out.mapping.len(), dag.num_qubits());
            prop_assert!(out.mapping.iter().all(|&s| (s as usize) < out.num_qubits()));
            prop_assert!(out.dag.verify_integrity().is_ok());
        }
    }

    #[test]
    fn prop_classical_wires_keep_their_order(dag in circuit_strategy()) {
        for mode in [ReuseMode::Normal, ReuseMode::Dual] {
            let out = reduce_qubits(&dag, mode).unwrap().outcome;
            for clbit in dag.clbits() {
                let expected = clbit_trace(&dag, clbit, |q| QubitId(out.mapping[q.0 as usize]));
                prop_assert_eq!(clbit_trace(&out.dag, clbit, |q| q), expected);
            }
        }
    }

    #[test]
    fn prop_default_mode_keeps_smaller(dag in circuit_strategy()) {
        let normal = reduce_qubits(&dag, ReuseMode::Normal).unwrap();
        let dual = reduce_qubits(&dag, ReuseMode::Dual).unwrap();
        let best = reduce_qubits(&dag, ReuseMode::Default).unwrap();

        prop_assert_eq!(
            best.outcome.num_qubits(),
            normal.outcome.num_qubits().min(dual.outcome.num_qubits())
        );
        prop_assert_ne!(best.selected, ReuseMode::Default);
    }
}

#[test]
fn test_pipeline_from_config() {
    let config = ReuseConfig::from_yaml_str("mode: normal\nverify: true\ntarget: \"linear:2\"\n")
        .unwrap();
    let (pm, mut props) = PassManagerBuilder::from_config(&config).unwrap().build();

    let mut dag = Circuit::ghz(4).unwrap().into_dag();
    pm.run(&mut dag, &mut props).unwrap();

    let stats = props.get::<ReuseStats>().unwrap();
    assert_eq!(stats.qubits_before, 4);
    assert_eq!(stats.qubits_after, 2);
    assert_eq!(stats.resets_inserted, 2);
    assert_eq!(stats.fits_target, Some(true));
    assert_eq!(props.get::<VerificationResult>().unwrap().measurements_found, 4);
}

#[test]
fn test_result_too_large_for_target() {
    let (pm, mut props) = PassManagerBuilder::new()
        .with_qubit_reuse(ReuseMode::Normal)
        .with_target(CouplingMap::linear(2))
        .build();

    // A Toffoli on the last layer needs all three qubits at once.
    let mut circuit = Circuit::with_size("toffoli", 3, 3);
    circuit
        .h(QubitId(0))
        .unwrap()
        .ccx(QubitId(0), QubitId(1), QubitId(2))
        .unwrap()
        .measure_all()
        .unwrap();
    let mut dag = circuit.into_dag();
    pm.run(&mut dag, &mut props).unwrap();

    let stats = props.get::<ReuseStats>().unwrap();
    assert_eq!(stats.qubits_after, 3);
    assert_eq!(stats.fits_target, Some(false));
}

#[test]
fn test_json_round_trip_after_reuse() {
    let source = r#"{
        "name": "pair",
        "qubits": [0, 1],
        "clbits": [0, 1],
        "instructions": [
            { "kind": { "Gate": { "kind": { "Standard": "H" } } }, "qubits": [0] },
            { "kind": "Measure", "qubits": [0], "clbits": [0] },
            { "kind": { "Gate": { "kind": { "Standard": "X" } } }, "qubits": [1] },
            { "kind": "Measure", "qubits": [1], "clbits": [1] }
        ]
    }"#;
    let circuit = Circuit::from_json(source).unwrap();

    let (pm, mut props) = PassManagerBuilder::new().build();
    let mut dag = circuit.into_dag();
    pm.run(&mut dag, &mut props).unwrap();

    let reduced = Circuit::from_dag_named("pair", dag);
    assert_eq!(reduced.num_qubits(), 1);

    let decoded = Circuit::from_json(&reduced.to_json().unwrap()).unwrap();
    assert_eq!(decoded.num_qubits(), 1);
    assert_eq!(decoded.num_clbits(), 2);
    assert_eq!(decoded.dag().num_ops(), 5);
}
