//! Qubit and classical bit identifiers and the registers that group them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(u32::try_from(id).expect("QubitId overflow: exceeds u32::MAX"))
    }
}

/// Unique identifier for a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

impl From<usize> for ClbitId {
    fn from(id: usize) -> Self {
        ClbitId(u32::try_from(id).expect("ClbitId overflow: exceeds u32::MAX"))
    }
}

/// A named, ordered group of qubits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantumRegister {
    /// The register name.
    pub name: String,
    /// Member qubits; position in this list is the index within the register.
    pub qubits: Vec<QubitId>,
}

impl QuantumRegister {
    /// Create a register over the given qubits.
    pub fn new(name: impl Into<String>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            name: name.into(),
            qubits: qubits.into_iter().collect(),
        }
    }

    /// Number of qubits in the register.
    pub fn len(&self) -> usize {
        self.qubits.len()
    }

    /// Check if the register is empty.
    pub fn is_empty(&self) -> bool {
        self.qubits.is_empty()
    }
}

impl fmt::Display for QuantumRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "qreg {}[{}]", self.name, self.qubits.len())
    }
}

/// A named, ordered group of classical bits.
///
/// Bit 0 of the register is the least significant bit when the register is
/// compared against an integer in a [`ClassicalCondition`](crate::ClassicalCondition).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalRegister {
    /// The register name.
    pub name: String,
    /// Member bits; position in this list is the index within the register.
    pub clbits: Vec<ClbitId>,
}

impl ClassicalRegister {
    /// Create a register over the given classical bits.
    pub fn new(name: impl Into<String>, clbits: impl IntoIterator<Item = ClbitId>) -> Self {
        Self {
            name: name.into(),
            clbits: clbits.into_iter().collect(),
        }
    }

    /// Number of bits in the register.
    pub fn len(&self) -> usize {
        self.clbits.len()
    }

    /// Check if the register is empty.
    pub fn is_empty(&self) -> bool {
        self.clbits.is_empty()
    }

    /// Get the bit at a position within the register.
    pub fn get(&self, index: u32) -> Option<ClbitId> {
        self.clbits.get(index as usize).copied()
    }
}

impl fmt::Display for ClassicalRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "creg {}[{}]", self.name, self.clbits.len())
    }
}
