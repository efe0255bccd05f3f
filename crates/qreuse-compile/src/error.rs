//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qreuse_ir::IrError),

    /// A qubit index outside the circuit was requested.
    #[error("Qubit index {index} out of range for circuit with {num_qubits} qubits")]
    QubitIndexOutOfRange { index: usize, num_qubits: usize },

    /// Pass execution failed.
    #[error("Pass '{name}' failed: {reason}")]
    PassFailed { name: String, reason: String },

    /// Invalid pass configuration.
    #[error("Invalid pass configuration: {0}")]
    InvalidConfiguration(String),

    /// A configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
