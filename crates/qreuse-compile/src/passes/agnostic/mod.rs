//! Target-agnostic compilation passes.
//!
//! These passes operate purely on the DAG structure. The reuse pass only
//! consults the target coupling map to report whether its result fits.

pub mod reuse;
pub mod verification;

pub use reuse::{
    CausalConeAnalysis, CausalCones, GreedyReuse, QubitReuse, ReuseMode, ReuseOutcome,
    ReuseSelection, ReuseStats, causal_cone, causal_cones, reduce_qubits,
};
pub use verification::{ReuseVerification, VerificationResult};
