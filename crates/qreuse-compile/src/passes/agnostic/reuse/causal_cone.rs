//! Causal-cone analysis.
//!
//! The causal cone of a qubit is the set of qubits whose operations can
//! influence its final state. It is found by walking the DAG backwards from
//! the qubit's output node and absorbing the qubit operands of every
//! operation that touches the cone collected so far.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use qreuse_ir::{CircuitDag, NodeIndex, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Causal cones of every qubit, in processing order.
///
/// Processing order is ascending cone size. Ties keep qubit index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CausalCones {
    /// Cones indexed by qubit index.
    cones: Vec<BTreeSet<usize>>,
    /// Qubit indices in processing order.
    order: Vec<usize>,
}

impl CausalCones {
    /// Iterate over `(qubit index, cone)` pairs in processing order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<usize>)> + '_ {
        self.order.iter().map(|&q| (q, &self.cones[q]))
    }

    /// Qubit indices in processing order.
    pub fn order(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    /// The cone of a given qubit index.
    pub fn get(&self, index: usize) -> Option<&BTreeSet<usize>> {
        self.cones.get(index)
    }

    /// Number of qubits analysed.
    pub fn len(&self) -> usize {
        self.cones.len()
    }

    /// Whether no qubits were analysed.
    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }
}

/// Map each qubit to its index in the DAG's qubit order.
pub(crate) fn qubit_indices(dag: &CircuitDag) -> FxHashMap<QubitId, usize> {
    dag.qubits().enumerate().map(|(i, q)| (q, i)).collect()
}

/// Qubit indices of a node's operands, or `None` for input and output nodes.
fn op_qubits(
    dag: &CircuitDag,
    node: NodeIndex,
    indices: &FxHashMap<QubitId, usize>,
) -> Option<(bool, Vec<usize>)> {
    let inst = dag.get_instruction(node)?;
    let qubits = inst
        .qubits
        .iter()
        .filter_map(|q| indices.get(q).copied())
        .collect();
    Some((inst.is_barrier(), qubits))
}

fn compute_cone(
    dag: &CircuitDag,
    index: usize,
    indices: &FxHashMap<QubitId, usize>,
) -> CompileResult<BTreeSet<usize>> {
    let num_qubits = dag.num_qubits();
    let out_node = dag
        .qubit_at(index)
        .and_then(|q| dag.qubit_output_node(q))
        .ok_or(CompileError::QubitIndexOutOfRange { index, num_qubits })?;

    let mut cone = BTreeSet::from([index]);
    let mut queued: FxHashSet<_> = FxHashSet::default();
    let mut queue: VecDeque<_> = dag
        .predecessors(out_node)
        .into_iter()
        .filter(|n| queued.insert(*n))
        .collect();

    while let Some(node) = queue.pop_front() {
        let Some((is_barrier, qargs)) = op_qubits(dag, node, indices) else {
            continue;
        };
        if !is_barrier && qargs.iter().any(|q| cone.contains(q)) {
            cone.extend(qargs);
        }

        for pred in dag.predecessors(node) {
            if queued.contains(&pred) {
                continue;
            }
            let touches_cone = matches!(
                op_qubits(dag, pred, indices),
                Some((_, qargs)) if qargs.iter().any(|q| cone.contains(q))
            );
            if touches_cone {
                queued.insert(pred);
                queue.push_back(pred);
            }
        }
    }

    Ok(cone)
}

/// Compute the causal cone of the qubit at `index`.
///
/// The result always contains `index` itself. Barriers are walked through
/// but never widen the cone.
pub fn causal_cone(dag: &CircuitDag, index: usize) -> CompileResult<BTreeSet<usize>> {
    compute_cone(dag, index, &qubit_indices(dag))
}

/// Compute the causal cones of all qubits, sorted by ascending size.
pub fn causal_cones(dag: &CircuitDag) -> CompileResult<CausalCones> {
    let indices = qubit_indices(dag);
    let mut cones = Vec::with_capacity(dag.num_qubits());
    for index in 0..dag.num_qubits() {
        let cone = compute_cone(dag, index, &indices)?;
        trace!("causal cone of qubit {} has {} qubits", index, cone.len());
        cones.push(cone);
    }
    let mut order: Vec<_> = (0..cones.len()).collect();
    order.sort_by_key(|&q| cones[q].len());
    Ok(CausalCones { cones, order })
}

/// Analysis pass that stores [`CausalCones`] in the property set.
pub struct CausalConeAnalysis;

impl Pass for CausalConeAnalysis {
    fn name(&self) -> &'static str {
        "causal_cone_analysis"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        properties.insert(causal_cones(dag)?);
        Ok(())
    }
}
