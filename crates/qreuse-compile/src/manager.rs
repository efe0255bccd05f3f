//! Pass manager for orchestrating the reuse pipeline.

use tracing::{debug, info, instrument};

use qreuse_ir::CircuitDag;

use crate::config::ReuseConfig;
use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::{CausalConeAnalysis, QubitReuse, ReuseMode, ReuseVerification};
use crate::property::{CouplingMap, PropertySet};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                debug!(
                    "Pass {} completed, qubits: {}, ops: {}",
                    pass.name(),
                    dag.num_qubits(),
                    dag.num_ops()
                );
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final qubits: {}, ops: {}",
            dag.num_qubits(),
            dag.num_ops()
        );

        Ok(())
    }

    /// Names of the passes, in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the preset reuse pipelines.
///
/// The built manager runs [`CausalConeAnalysis`], then [`QubitReuse`] in the
/// chosen mode, then optionally [`ReuseVerification`].
pub struct PassManagerBuilder {
    mode: ReuseMode,
    verify: bool,
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            mode: ReuseMode::Default,
            verify: false,
            properties: PropertySet::new(),
        }
    }

    /// Start from a named preset: `qubit_reuse`, `qubit_reuse_normal` or
    /// `qubit_reuse_dual`.
    pub fn preset(name: &str) -> CompileResult<Self> {
        let mode = [ReuseMode::Default, ReuseMode::Normal, ReuseMode::Dual]
            .into_iter()
            .find(|m| m.preset_name() == name)
            .ok_or_else(|| {
                CompileError::InvalidConfiguration(format!("unknown preset '{name}'"))
            })?;
        Ok(Self::new().with_qubit_reuse(mode))
    }

    /// Apply every setting of a loaded configuration.
    pub fn from_config(config: &ReuseConfig) -> CompileResult<Self> {
        let mut builder = Self::new()
            .with_qubit_reuse(config.mode)
            .with_verification(config.verify);
        if let Some(coupling_map) = config.coupling_map()? {
            builder = builder.with_target(coupling_map);
        }
        Ok(builder)
    }

    /// Set the reuse mode.
    #[must_use]
    pub fn with_qubit_reuse(mut self, mode: ReuseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run [`ReuseVerification`] after the rewrite.
    #[must_use]
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target coupling map.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        pm.add_pass(CausalConeAnalysis);
        pm.add_pass(QubitReuse::new(self.mode));
        if self.verify {
            pm.add_pass(ReuseVerification);
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
