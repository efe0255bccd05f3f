//! High-level circuit builder API and the JSON circuit file format.

use serde::{Deserialize, Serialize};

use crate::dag::CircuitDag;
use crate::error::IrResult;
use crate::gate::{ClassicalCondition, Gate, StandardGate};
use crate::instruction::Instruction;
use crate::parameter::ParameterExpression;
use crate::qubit::{ClassicalRegister, ClbitId, QuantumRegister, QubitId};

/// A quantum circuit.
///
/// This provides a high-level API for building quantum circuits,
/// with convenient methods for common gates and operations.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// The underlying DAG representation.
    dag: CircuitDag,
    /// Counter for generating qubit IDs.
    next_qubit_id: u32,
    /// Counter for generating classical bit IDs.
    next_clbit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dag: CircuitDag::new(),
            next_qubit_id: 0,
            next_clbit_id: 0,
        }
    }

    /// Create a circuit with a register `q` of `num_qubits` qubits and a
    /// register `c` of `num_clbits` classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        if num_qubits > 0 {
            circuit.add_qreg("q", num_qubits);
        }
        if num_clbits > 0 {
            circuit.add_creg("c", num_clbits);
        }
        circuit
    }

    /// Add a single qubit outside any register.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.dag.add_qubit(id);
        id
    }

    /// Add a quantum register with `size` fresh qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let ids: Vec<_> = (self.next_qubit_id..self.next_qubit_id + size)
            .map(QubitId)
            .collect();
        self.next_qubit_id += size;
        self.dag
            .add_qreg(QuantumRegister::new(name, ids.iter().copied()));
        ids
    }

    /// Add a single classical bit outside any register.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.next_clbit_id);
        self.next_clbit_id += 1;
        self.dag.add_clbit(id);
        id
    }

    /// Add a classical register with `size` fresh bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let ids: Vec<_> = (self.next_clbit_id..self.next_clbit_id + size)
            .map(ClbitId)
            .collect();
        self.next_clbit_id += size;
        self.dag
            .add_creg(ClassicalRegister::new(name, ids.iter().copied()));
        ids
    }

    fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Z, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::S, qubit))
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::T, qubit))
    }

    /// Apply Rx rotation gate.
    pub fn rx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(
            StandardGate::Rx(theta.into()),
            qubit,
        ))
    }

    /// Apply Rz rotation gate.
    pub fn rz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(
            StandardGate::Rz(theta.into()),
            qubit,
        ))
    }

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::CZ, control, target))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::Swap, q1, q2))
    }

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, qubits))
    }

    /// Apply a gate guarded by a classical condition.
    pub fn c_if(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
        condition: ClassicalCondition,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::conditional(gate, qubits, condition))
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure every qubit into the classical bit with the same index.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        let pairs: Vec<_> = self.dag.qubits().zip(self.dag.clbits()).collect();
        for (qubit, clbit) in pairs {
            self.measure(qubit, clbit)?;
        }
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::reset(qubit))
    }

    /// Apply a barrier across the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))
    }

    /// Apply a barrier across every qubit.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.dag.qubits().collect();
        self.barrier(qubits)
    }

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.dag.num_qubits()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.dag.num_clbits()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Consume the circuit and return the DAG.
    pub fn into_dag(self) -> CircuitDag {
        self.dag
    }

    /// Wrap an existing DAG.
    pub fn from_dag(dag: CircuitDag) -> Self {
        Self::from_dag_named("circuit", dag)
    }

    /// Wrap an existing DAG under a given name.
    pub fn from_dag_named(name: impl Into<String>, dag: CircuitDag) -> Self {
        let next_qubit_id = dag.qubits().map(|q| q.0 + 1).max().unwrap_or(0);
        let next_clbit_id = dag.clbits().map(|c| c.0 + 1).max().unwrap_or(0);
        Self {
            name: name.into(),
            dag,
            next_qubit_id,
            next_clbit_id,
        }
    }

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure(QubitId(0), ClbitId(0))?
            .measure(QubitId(1), ClbitId(1))?;
        Ok(circuit)
    }

    /// Create a GHZ state circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        if n == 0 {
            return Ok(Self::new("ghz_0"));
        }

        let mut circuit = Self::with_size("ghz", n, n);
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        circuit.measure_all()?;
        Ok(circuit)
    }

    /// Decode a circuit from its JSON file representation.
    pub fn from_json(source: &str) -> IrResult<Self> {
        let file: CircuitFile = serde_json::from_str(source)?;
        file.into_circuit()
    }

    /// Encode the circuit as JSON.
    pub fn to_json(&self) -> IrResult<String> {
        Ok(serde_json::to_string_pretty(&CircuitFile::from_circuit(self))?)
    }
}

/// On-disk circuit format.
///
/// `qubits` and `clbits` fix the index order; bits that only appear in a
/// register may be omitted and are appended in register order.
/// Instructions are listed in a valid execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitFile {
    /// Circuit name.
    #[serde(default = "default_circuit_name")]
    pub name: String,
    /// Qubits in index order.
    #[serde(default)]
    pub qubits: Vec<QubitId>,
    /// Classical bits in index order.
    #[serde(default)]
    pub clbits: Vec<ClbitId>,
    /// Quantum registers.
    #[serde(default)]
    pub qregs: Vec<QuantumRegister>,
    /// Classical registers.
    #[serde(default)]
    pub cregs: Vec<ClassicalRegister>,
    /// Global phase.
    #[serde(default)]
    pub global_phase: f64,
    /// Instructions in execution order.
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

fn default_circuit_name() -> String {
    "circuit".to_string()
}

impl CircuitFile {
    /// Snapshot a circuit.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let dag = circuit.dag();
        Self {
            name: circuit.name().to_string(),
            qubits: dag.qubits().collect(),
            clbits: dag.clbits().collect(),
            qregs: dag.qregs().to_vec(),
            cregs: dag.cregs().to_vec(),
            global_phase: dag.global_phase(),
            instructions: dag.topological_ops().map(|(_, i)| i.clone()).collect(),
        }
    }

    /// Rebuild the circuit, validating every instruction.
    pub fn into_circuit(self) -> IrResult<Circuit> {
        let mut dag = CircuitDag::new();
        for qubit in self.qubits {
            dag.add_qubit(qubit);
        }
        for clbit in self.clbits {
            dag.add_clbit(clbit);
        }
        for qreg in self.qregs {
            dag.add_qreg(qreg);
        }
        for creg in self.cregs {
            dag.add_creg(creg);
        }
        dag.set_global_phase(self.global_phase);
        for inst in self.instructions {
            dag.apply(inst)?;
        }
        Ok(Circuit::from_dag_named(self.name, dag))
    }
}
