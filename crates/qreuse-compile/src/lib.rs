//! Qubit reuse compilation framework
//!
//! This crate rewrites quantum circuits so that they run on fewer qubits.
//! A qubit whose work is done is measured, reset and handed over to a
//! causally independent part of the circuit. The rewrite is organized as a
//! pass pipeline in the style of LLVM, so it composes with custom passes.
//!
//! # Architecture
//!
//! ```text
//! Input Circuit
//!       │
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (coupling map, cones, stats)
//! └─────────────┘
//!       │
//!       ├── CausalConeAnalysis
//!       ├── QubitReuse (default / normal / dual)
//!       └── ReuseVerification (optional)
//!       │
//!       ▼
//! Output Circuit (fewer qubits, resets inserted)
//! ```
//!
//! # Example
//!
//! ```rust
//! use qreuse_compile::{CouplingMap, PassManagerBuilder, ReuseMode, ReuseStats};
//! use qreuse_ir::Circuit;
//!
//! let circuit = Circuit::ghz(3).unwrap();
//!
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_qubit_reuse(ReuseMode::Normal)
//!     .with_target(CouplingMap::linear(2))
//!     .build();
//!
//! let mut dag = circuit.into_dag();
//! pm.run(&mut dag, &mut props).unwrap();
//!
//! let stats = props.get::<ReuseStats>().unwrap();
//! assert_eq!(stats.qubits_after, 2);
//! assert_eq!(stats.fits_target, Some(true));
//! ```
//!
//! # Modes
//!
//! | Mode | Behavior |
//! |------|----------|
//! | `normal` | Recycle a qubit after its final measurement |
//! | `dual` | Rewrite the time-reversed circuit, then reverse the result |
//! | `default` | Run both and keep the result with fewer qubits |
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to add passes to the pipeline:
//!
//! ```rust
//! use qreuse_compile::{Pass, PassKind, CompileResult, PropertySet};
//! use qreuse_ir::CircuitDag;
//!
//! struct MyCustomPass;
//!
//! impl Pass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, dag: &mut CircuitDag, props: &mut PropertySet) -> CompileResult<()> {
//!         Ok(())
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod pass;
pub mod property;

// Built-in passes
pub mod passes;

pub use config::ReuseConfig;
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{
    CausalConeAnalysis, CausalCones, GreedyReuse, QubitReuse, ReuseMode, ReuseOutcome,
    ReuseStats, ReuseVerification, VerificationResult, reduce_qubits,
};
pub use property::{CouplingMap, PropertySet, Topology};
