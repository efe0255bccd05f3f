//! Qubit reuse via mid-circuit measurement and reset.
//!
//! The [`QubitReuse`] pass rewrites a circuit so that a qubit whose work is
//! finished is measured, reset and handed to a later, causally independent
//! part of the circuit. It runs the [`GreedyReuse`] rewriter forwards
//! ([`ReuseMode::Normal`]), on the time-reversed circuit
//! ([`ReuseMode::Dual`]), or both, keeping the smaller result
//! ([`ReuseMode::Default`]).
//!
//! # Example
//!
//! ```rust
//! use qreuse_compile::passes::{QubitReuse, ReuseStats};
//! use qreuse_compile::{Pass, PropertySet};
//! use qreuse_ir::{Circuit, ClbitId, QubitId};
//!
//! // Two independent single-qubit experiments.
//! let mut circuit = Circuit::with_size("pair", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.measure(QubitId(0), ClbitId(0)).unwrap();
//! circuit.x(QubitId(1)).unwrap();
//! circuit.measure(QubitId(1), ClbitId(1)).unwrap();
//!
//! let mut dag = circuit.into_dag();
//! let mut props = PropertySet::new();
//! QubitReuse::normal().run(&mut dag, &mut props).unwrap();
//!
//! assert_eq!(dag.num_qubits(), 1);
//! assert_eq!(props.get::<ReuseStats>().unwrap().resets_inserted, 1);
//! ```

mod causal_cone;
mod greedy;


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use qreuse_ir::CircuitDag;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

pub use causal_cone::{CausalConeAnalysis, CausalCones, causal_cone, causal_cones};
pub use greedy::{GreedyReuse, MERGED_CREG, OUTPUT_QREG, ReuseOutcome};

/// Which rewrite strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReuseMode {
    /// Run both strategies and keep the one with fewer qubits.
    #[default]
    Default,
    /// Rewrite the circuit as given.
    Normal,
    /// Rewrite the time-reversed circuit and reverse the result.
    Dual,
}

impl ReuseMode {
    /// Name of the preset pipeline for this mode.
    pub fn preset_name(self) -> &'static str {
        match self {
            ReuseMode::Default => "qubit_reuse",
            ReuseMode::Normal => "qubit_reuse_normal",
            ReuseMode::Dual => "qubit_reuse_dual",
        }
    }
}

impl fmt::Display for ReuseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReuseMode::Default => write!(f, "default"),
            ReuseMode::Normal => write!(f, "normal"),
            ReuseMode::Dual => write!(f, "dual"),
        }
    }
}

impl FromStr for ReuseMode {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(ReuseMode::Default),
            "normal" => Ok(ReuseMode::Normal),
            "dual" => Ok(ReuseMode::Dual),
            other => Err(CompileError::InvalidConfiguration(format!(
                "unknown reuse mode '{other}' (expected default, normal or dual)"
            ))),
        }
    }
}

/// A rewrite together with the strategy that produced it.
#[derive(Debug, Clone)]
pub struct ReuseSelection {
    /// `Normal` or `Dual`; never `Default`.
    pub selected: ReuseMode,
    /// The rewrite itself.
    pub outcome: ReuseOutcome,
}

/// Rewrite `dag` with the given mode.
///
/// In [`ReuseMode::Default`] both rewrites are computed and the forward one
/// wins ties.
pub fn reduce_qubits(dag: &CircuitDag, mode: ReuseMode) -> CompileResult<ReuseSelection> {
    match mode {
        ReuseMode::Normal => Ok(ReuseSelection {
            selected: ReuseMode::Normal,
            outcome: GreedyReuse::rewrite(dag, false)?,
        }),
        ReuseMode::Dual => Ok(ReuseSelection {
            selected: ReuseMode::Dual,
            outcome: GreedyReuse::rewrite(dag, true)?,
        }),
        ReuseMode::Default => {
            let normal = GreedyReuse::rewrite(dag, false)?;
            let dual = GreedyReuse::rewrite(dag, true)?;
            info!(
                "Qubit reuse candidates: normal {} qubits, dual {} qubits",
                normal.num_qubits(),
                dual.num_qubits()
            );
            Ok(if normal.num_qubits() <= dual.num_qubits() {
                ReuseSelection {
                    selected: ReuseMode::Normal,
                    outcome: normal,
                }
            } else {
                ReuseSelection {
                    selected: ReuseMode::Dual,
                    outcome: dual,
                }
            })
        }
    }
}

/// Statistics recorded by [`QubitReuse`] in the property set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReuseStats {
    /// Mode the pass was configured with.
    pub mode: ReuseMode,
    /// Strategy whose result was kept.
    pub selected: ReuseMode,
    /// Qubits before the rewrite.
    pub qubits_before: usize,
    /// Qubits after the rewrite.
    pub qubits_after: usize,
    /// Resets inserted to recycle qubits.
    pub resets_inserted: usize,
    /// Whether the result fits the target coupling map, if one was given.
    pub fits_target: Option<bool>,
}

/// Transformation pass that reduces the qubit count of a circuit.
#[derive(Debug, Clone, Copy, Default)]
pub struct QubitReuse {
    mode: ReuseMode,
}

impl QubitReuse {
    /// Create a pass running the given mode.
    pub fn new(mode: ReuseMode) -> Self {
        Self { mode }
    }

    /// Run both strategies and keep the smaller circuit.
    pub fn default_mode() -> Self {
        Self::new(ReuseMode::Default)
    }

    /// Forward rewrite only.
    pub fn normal() -> Self {
        Self::new(ReuseMode::Normal)
    }

    /// Time-reversed rewrite only.
    pub fn dual() -> Self {
        Self::new(ReuseMode::Dual)
    }

    /// The configured mode.
    pub fn mode(&self) -> ReuseMode {
        self.mode
    }
}

impl Pass for QubitReuse {
    fn name(&self) -> &'static str {
        self.mode.preset_name()
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let qubits_before = dag.num_qubits();
        let ReuseSelection { selected, outcome } = reduce_qubits(dag, self.mode)?;

        let stats = ReuseStats {
            mode: self.mode,
            selected,
            qubits_before,
            qubits_after: outcome.num_qubits(),
            resets_inserted: outcome.resets_inserted,
            fits_target: properties
                .coupling_map
                .as_ref()
                .map(|cm| cm.fits(outcome.num_qubits())),
        };
        info!(
            "Qubit reuse ({} -> {}): {} -> {} qubits, {} resets",
            stats.mode,
            stats.selected,
            stats.qubits_before,
            stats.qubits_after,
            stats.resets_inserted
        );

        if let (Some(target), Some(fits)) = (&properties.coupling_map, stats.fits_target) {
            debug!("Target {}: fits = {}", target, fits);
        }

        *dag = outcome.dag;
        properties.insert(stats);
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, _properties: &PropertySet) -> bool {
        dag.num_qubits() > 0
    }
}
