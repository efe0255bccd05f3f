//! Built-in compilation passes.
//!
//! All passes live in [`agnostic`]: they need no hardware description
//! beyond the optional coupling map in the property set.

pub mod agnostic;

pub use agnostic::{
    CausalConeAnalysis, CausalCones, GreedyReuse, QubitReuse, ReuseMode, ReuseOutcome,
    ReuseSelection, ReuseStats, ReuseVerification, VerificationResult, causal_cone, causal_cones,
    reduce_qubits,
};
