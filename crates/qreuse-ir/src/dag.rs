//! DAG-based circuit representation.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::ClassicalCondition;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClassicalRegister, ClbitId, QuantumRegister, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Check if this is an input node.
    #[inline]
    pub fn is_input(&self) -> bool {
        matches!(self, DagNode::In(_))
    }

    /// Check if this is an output node.
    #[inline]
    pub fn is_output(&self) -> bool {
        matches!(self, DagNode::Out(_))
    }

    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, DagNode::Op(_))
    }

    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG representing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// The abstraction level of a circuit in the compilation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CircuitLevel {
    /// Logical level: qubits are abstract, no physical mapping applied.
    #[default]
    Logical,
    /// Physical level: qubits are mapped to physical device positions.
    Physical,
}

/// DAG-based circuit representation.
///
/// The circuit is represented as a directed acyclic graph where:
/// - Nodes are either input nodes, output nodes, or operation nodes
/// - Edges represent wires (quantum or classical)
/// - Each wire has exactly one input and one output node
/// - Operations are connected to wires in the order they were applied
///
/// A conditioned operation is also threaded onto the classical wires its
/// condition reads, so it is ordered after the measurements that feed it.
///
/// Qubits and classical bits keep their insertion order. The position of a
/// qubit in [`qubits()`](Self::qubits) is its *index*, which is what the
/// compiler passes address qubits by.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    /// The underlying graph.
    graph: DiGraph<DagNode, DagEdge, u32>,
    /// Map from wire to its input node.
    inputs: FxHashMap<WireId, NodeIndex>,
    /// Map from wire to its output node.
    outputs: FxHashMap<WireId, NodeIndex>,
    /// Wire front: maps each wire to the node just before the output node.
    wire_front: FxHashMap<WireId, NodeIndex>,
    /// Qubits in insertion order.
    qubit_order: Vec<QubitId>,
    /// Classical bits in insertion order.
    clbit_order: Vec<ClbitId>,
    /// Quantum registers in declaration order.
    qregs: Vec<QuantumRegister>,
    /// Classical registers in declaration order.
    cregs: Vec<ClassicalRegister>,
    /// Global phase of the circuit.
    global_phase: f64,
    /// Abstraction level of the circuit.
    level: CircuitLevel,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qubit to the circuit. Adding an existing qubit is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.add_wire(WireId::Qubit(qubit)) {
            self.qubit_order.push(qubit);
        }
    }

    /// Add a classical bit to the circuit. Adding an existing bit is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.add_wire(WireId::Clbit(clbit)) {
            self.clbit_order.push(clbit);
        }
    }

    fn add_wire(&mut self, wire: WireId) -> bool {
        if self.inputs.contains_key(&wire) {
            return false;
        }
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.inputs.insert(wire, in_node);
        self.outputs.insert(wire, out_node);
        self.wire_front.insert(wire, in_node);
        true
    }

    /// Declare a quantum register, adding any member qubits not yet present.
    pub fn add_qreg(&mut self, register: QuantumRegister) {
        for &qubit in &register.qubits {
            self.add_qubit(qubit);
        }
        self.qregs.push(register);
    }

    /// Declare a classical register, adding any member bits not yet present.
    pub fn add_creg(&mut self, register: ClassicalRegister) {
        for &clbit in &register.clbits {
            self.add_clbit(clbit);
        }
        self.cregs.push(register);
    }

    /// Quantum registers in declaration order.
    pub fn qregs(&self) -> &[QuantumRegister] {
        &self.qregs
    }

    /// Classical registers in declaration order.
    pub fn cregs(&self) -> &[ClassicalRegister] {
        &self.cregs
    }

    /// Look up a classical register by name.
    pub fn creg(&self, name: &str) -> Option<&ClassicalRegister> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// Resolve the classical bits a condition reads, in significance order.
    pub fn condition_clbits(&self, condition: &ClassicalCondition) -> IrResult<Vec<ClbitId>> {
        let register = self
            .creg(&condition.register)
            .ok_or_else(|| IrError::RegisterNotFound(condition.register.clone()))?;
        if condition.bits.is_empty() {
            return Ok(register.clbits.clone());
        }
        condition
            .bits
            .iter()
            .map(|&bit| {
                register
                    .get(bit)
                    .ok_or_else(|| IrError::ConditionBitOutOfRange {
                        register: register.name.clone(),
                        bit,
                        size: register.len(),
                    })
            })
            .collect()
    }

    /// Append an instruction at the end of every wire it touches.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.inputs.contains_key(&WireId::Qubit(qubit)) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if !self.inputs.contains_key(&WireId::Clbit(clbit)) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut wires: Vec<WireId> = instruction.qubits.iter().map(|&q| q.into()).collect();
        for &clbit in &instruction.clbits {
            let wire = WireId::Clbit(clbit);
            if !wires.contains(&wire) {
                wires.push(wire);
            }
        }
        if let Some(condition) = instruction.condition() {
            for clbit in self.condition_clbits(condition)? {
                let wire = WireId::Clbit(clbit);
                if !wires.contains(&wire) {
                    wires.push(wire);
                }
            }
        }

        let op_node = self.graph.add_node(DagNode::Op(instruction));
        for wire in wires {
            self.connect_at_front(op_node, wire)?;
        }
        Ok(op_node)
    }

    /// Splice `op_node` between the wire front and the output node.
    fn connect_at_front(&mut self, op_node: NodeIndex, wire: WireId) -> IrResult<()> {
        let out_node = self.outputs[&wire];
        let prev_node = self.wire_front[&wire];

        let eid = self
            .graph
            .edges_directed(prev_node, Direction::Outgoing)
            .find(|e| e.weight().wire == wire && e.target() == out_node)
            .map(|e| e.id())
            .ok_or_else(|| {
                IrError::InvalidDag(format!(
                    "Missing edge from predecessor to output for wire {wire:?}"
                ))
            })?;
        self.graph.remove_edge(eid);
        self.graph.add_edge(prev_node, op_node, DagEdge { wire });
        self.graph.add_edge(op_node, out_node, DagEdge { wire });
        self.wire_front.insert(wire, op_node);
        Ok(())
    }

    /// Iterate over operations in topological order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        petgraph::algo::toposort(&self.graph, None)
            .expect("DAG must be acyclic: cycle detected in circuit graph")
            .into_iter()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    /// Get a node by index.
    #[inline]
    pub fn node(&self, node: NodeIndex) -> Option<&DagNode> {
        self.graph.node_weight(node)
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    /// Distinct direct predecessors of a node, across all wires.
    pub fn predecessors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = FxHashSet::default();
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .filter(|pred| seen.insert(*pred))
            .collect()
    }

    /// The node following `node` on `wire`, if `node` lies on that wire.
    pub fn successor_on_wire(&self, node: NodeIndex, wire: WireId) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .find(|e| e.weight().wire == wire)
            .map(|e| e.target())
    }

    /// The node preceding `node` on `wire`, if `node` lies on that wire.
    pub fn predecessor_on_wire(&self, node: NodeIndex, wire: WireId) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .find(|e| e.weight().wire == wire)
            .map(|e| e.source())
    }

    /// All nodes on a wire from its input node to its output node, inclusive.
    pub fn nodes_on_wire(&self, wire: WireId) -> IrResult<Vec<NodeIndex>> {
        let in_node = self
            .wire_input_node(wire)
            .ok_or_else(|| IrError::InvalidDag(format!("Unknown wire {wire:?}")))?;
        let out_node = self.outputs[&wire];

        let mut nodes = vec![in_node];
        let mut current = in_node;
        while current != out_node {
            current = self.successor_on_wire(current, wire).ok_or_else(|| {
                IrError::InvalidDag(format!(
                    "Wire {wire:?} is broken: no outgoing edge from node {current:?}"
                ))
            })?;
            nodes.push(current);
            if nodes.len() > self.graph.node_count() {
                return Err(IrError::InvalidDag(format!(
                    "Wire {wire:?} has too many steps (possible cycle)"
                )));
            }
        }
        Ok(nodes)
    }

    /// Build a new DAG with the operation order reversed on every wire.
    ///
    /// Input and output nodes trade places: the last operation of each wire
    /// in `self` becomes the first in the result. Gates are not inverted.
    pub fn reverse_ops(&self) -> IrResult<CircuitDag> {
        let mut reversed = CircuitDag::new();
        for &qubit in &self.qubit_order {
            reversed.add_qubit(qubit);
        }
        for &clbit in &self.clbit_order {
            reversed.add_clbit(clbit);
        }
        reversed.qregs = self.qregs.clone();
        reversed.cregs = self.cregs.clone();
        reversed.global_phase = self.global_phase;
        reversed.level = self.level;

        let ops: Vec<Instruction> = self
            .topological_ops()
            .map(|(_, inst)| inst.clone())
            .collect();
        for inst in ops.into_iter().rev() {
            reversed.apply(inst)?;
        }
        Ok(reversed)
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubit_order.len()
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.clbit_order.len()
    }

    /// Get the number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        let io_nodes = 2 * self.inputs.len();
        self.graph.node_count().saturating_sub(io_nodes)
    }

    /// Calculate the circuit depth.
    pub fn depth(&self) -> usize {
        let mut depths: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(self.graph.node_count(), Default::default());
        let mut max_depth = 0usize;

        for node in petgraph::algo::toposort(&self.graph, None)
            .expect("DAG must be acyclic: cycle detected in circuit graph")
        {
            let max_pred_depth = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|pred| depths.get(&pred).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);

            let node_depth = if self.graph[node].is_op() {
                max_pred_depth + 1
            } else {
                max_pred_depth
            };
            max_depth = max_depth.max(node_depth);
            depths.insert(node, node_depth);
        }

        max_depth
    }

    /// Iterate over qubits in index order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.qubit_order.iter().copied()
    }

    /// Iterate over classical bits in index order.
    pub fn clbits(&self) -> impl Iterator<Item = ClbitId> + '_ {
        self.clbit_order.iter().copied()
    }

    /// The qubit at a given index.
    #[inline]
    pub fn qubit_at(&self, index: usize) -> Option<QubitId> {
        self.qubit_order.get(index).copied()
    }

    /// Get the input node for a qubit.
    #[inline]
    pub fn qubit_input_node(&self, qubit: QubitId) -> Option<NodeIndex> {
        self.wire_input_node(WireId::Qubit(qubit))
    }

    /// Get the output node for a qubit.
    #[inline]
    pub fn qubit_output_node(&self, qubit: QubitId) -> Option<NodeIndex> {
        self.wire_output_node(WireId::Qubit(qubit))
    }

    /// Get the input node for any wire.
    #[inline]
    pub fn wire_input_node(&self, wire: WireId) -> Option<NodeIndex> {
        self.inputs.get(&wire).copied()
    }

    /// Get the output node for any wire.
    #[inline]
    pub fn wire_output_node(&self, wire: WireId) -> Option<NodeIndex> {
        self.outputs.get(&wire).copied()
    }

    /// Get the global phase.
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.global_phase = phase;
    }

    /// Get the abstraction level of this circuit.
    pub fn level(&self) -> CircuitLevel {
        self.level
    }

    /// Set the abstraction level of this circuit.
    pub fn set_level(&mut self, level: CircuitLevel) {
        self.level = level;
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &DiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Verify the structural integrity of the DAG.
    ///
    /// Checks that the graph is acyclic, that every wire is an unbroken
    /// path from its input node to its output node, and that every
    /// register refers only to bits present in the circuit.
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidDag("Graph contains a cycle".into()));
        }

        if self.inputs.len() != self.outputs.len() {
            return Err(IrError::InvalidDag(
                "Input and output node counts differ".into(),
            ));
        }

        for &wire in self.inputs.keys() {
            if !self.outputs.contains_key(&wire) {
                return Err(IrError::InvalidDag(format!(
                    "Wire {wire:?} has an In node but no Out node"
                )));
            }
            self.nodes_on_wire(wire)?;
        }

        for qreg in &self.qregs {
            if let Some(&qubit) = qreg.qubits.iter().find(|&&q| self.qubit_input_node(q).is_none()) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: None,
                });
            }
        }
        for creg in &self.cregs {
            if let Some(&clbit) = creg
                .clbits
                .iter()
                .find(|&&c| self.wire_input_node(WireId::Clbit(c)).is_none())
            {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: None,
                });
            }
        }

        Ok(())
    }
}
