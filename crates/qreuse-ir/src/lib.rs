//! Circuit intermediate representation for qubit-reuse compilation
//!
//! This crate provides the data structures the reuse passes operate on.
//! Circuits are stored as a DAG whose edges are labelled by the qubit or
//! classical bit wire they carry, so passes can walk a single wire, collect
//! the predecessors of an operation, or rebuild the circuit in reverse.
//!
//! # Core Components
//!
//! - **Bits and registers**: [`QubitId`], [`ClbitId`], [`QuantumRegister`] and
//!   [`ClassicalRegister`]
//! - **Gates**: [`StandardGate`] for built-in gates and [`CustomGate`] for opaque
//!   user-defined operations, optionally guarded by a [`ClassicalCondition`]
//! - **Instructions**: [`Instruction`] combining an operation with its operands
//! - **DAG**: [`CircuitDag`] with wire walks, predecessor queries and
//!   [`CircuitDag::reverse_ops`]
//! - **Circuit**: [`Circuit`] builder plus the [`CircuitFile`] JSON format
//!
//! # Example: Measure and Continue
//!
//! ```rust
//! use qreuse_ir::{Circuit, ClbitId, ClassicalCondition, StandardGate, QubitId};
//!
//! let mut circuit = Circuit::with_size("syndrome", 2, 1);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure(QubitId(1), ClbitId(0)).unwrap();
//! circuit
//!     .c_if(StandardGate::X, [QubitId(0)], ClassicalCondition::new("c", 1))
//!     .unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 4);
//! ```
//!
//! # Example: Walking a Wire
//!
//! ```rust
//! use qreuse_ir::{Circuit, QubitId, WireId};
//!
//! let circuit = Circuit::bell().unwrap();
//! let dag = circuit.dag();
//! let wire = dag.nodes_on_wire(WireId::Qubit(QubitId(1))).unwrap();
//!
//! // in, cx, measure, out
//! assert_eq!(wire.len(), 4);
//! assert!(dag.node(wire[0]).unwrap().is_input());
//! ```

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::{Circuit, CircuitFile};
pub use dag::{CircuitDag, CircuitLevel, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use parameter::ParameterExpression;
pub use qubit::{ClassicalRegister, ClbitId, QuantumRegister, QubitId};
