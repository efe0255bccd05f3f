//! Greedy qubit-reuse rewriter.
//!
//! Qubits are processed in ascending causal-cone order. For each one the
//! rewriter walks its wire and copies every operation into a fresh DAG,
//! first pulling in (recursively) everything on the operation's other
//! wires that precedes it. Classical wires count too: an operation that
//! reads or writes a bit waits for the previous operation on that bit. A qubit is mapped to an output slot the first
//! time it is needed; once a slot's qubit has been measured for the last
//! time the slot goes into a FIFO pool and the next unmapped qubit takes it
//! over after a reset.
//!
//! The recursion is driven by an explicit task stack so deep circuits do
//! not grow the native stack.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use qreuse_ir::{
    CircuitDag, ClassicalCondition, ClassicalRegister, ClbitId, DagNode, Instruction, IrError,
    NodeIndex, QuantumRegister, QubitId, WireId,
};

use super::causal_cone::{causal_cones, qubit_indices};
use crate::error::{CompileError, CompileResult};

/// Name of the single classical register of a rewritten circuit.
pub const MERGED_CREG: &str = "c";

/// Name of the single quantum register of a rewritten circuit.
pub const OUTPUT_QREG: &str = "q";

/// Result of one rewrite.
#[derive(Debug, Clone)]
pub struct ReuseOutcome {
    /// The rewritten circuit.
    pub dag: CircuitDag,
    /// Output slot of every input qubit, indexed by input qubit index.
    pub mapping: Vec<u32>,
    /// Number of resets inserted to recycle measured qubits.
    pub resets_inserted: usize,
}

impl ReuseOutcome {
    /// Number of qubits in the rewritten circuit.
    pub fn num_qubits(&self) -> usize {
        self.dag.num_qubits()
    }
}

/// Greedy rewriter that recycles measured qubits.
pub struct GreedyReuse;

impl GreedyReuse {
    /// Rewrite `dag` into a circuit that uses no more qubits than it does.
    ///
    /// With `dual` set the rewrite runs on the time-reversed circuit and
    /// the result is reversed back, so a qubit is recycled once its first
    /// operation has been reached rather than after its last measurement.
    ///
    /// All classical registers are merged into one register named `c` and
    /// conditions are rewritten to address its bits. Barriers are dropped.
    pub fn rewrite(dag: &CircuitDag, dual: bool) -> CompileResult<ReuseOutcome> {
        let reversed;
        let source = if dual {
            reversed = dag.reverse_ops()?;
            &reversed
        } else {
            dag
        };

        let mut context = RewriteContext::new(source, dual)?;
        for root in causal_cones(source)?.order() {
            context.stack.push(Task::Subpath {
                qubit: root,
                until: None,
            });
            context.drain()?;
        }
        let outcome = context.finish()?;

        debug!(
            "Greedy reuse (dual: {}): {} -> {} qubits, {} resets",
            dual,
            dag.num_qubits(),
            outcome.num_qubits(),
            outcome.resets_inserted
        );
        Ok(outcome)
    }
}

/// Pending unit of work.
#[derive(Debug, Clone, Copy)]
enum Task {
    /// Map `qubit`, then copy its wire up to (not including) `until`.
    Subpath {
        qubit: usize,
        until: Option<NodeIndex>,
    },
    /// Resume a wire walk at position `pos`.
    Walk {
        qubit: usize,
        pos: usize,
        until: Option<NodeIndex>,
    },
    /// Schedule an operation that must be emitted before the current one.
    Require(NodeIndex),
    /// Copy one operation into the output.
    Emit(NodeIndex),
}

/// All state owned by a single rewrite.
struct RewriteContext<'a> {
    source: &'a CircuitDag,
    dual: bool,
    /// Nodes of every qubit wire, input node first.
    wires: Vec<Vec<NodeIndex>>,
    qubit_index: FxHashMap<QubitId, usize>,
    /// Bit of the merged register each input clbit lands on.
    merged_clbits: FxHashMap<ClbitId, ClbitId>,
    output: CircuitDag,
    mapping: Vec<Option<u32>>,
    measured: VecDeque<u32>,
    visited: FxHashSet<NodeIndex>,
    next_slot: u32,
    resets_inserted: usize,
    stack: Vec<Task>,
}

impl<'a> RewriteContext<'a> {
    fn new(source: &'a CircuitDag, dual: bool) -> CompileResult<Self> {
        let wires = source
            .qubits()
            .map(|q| source.nodes_on_wire(WireId::Qubit(q)))
            .collect::<Result<Vec<_>, _>>()?;

        let merged_clbits: FxHashMap<_, _> = (0u32..)
            .zip(source.clbits())
            .map(|(i, clbit)| (clbit, ClbitId(i)))
            .collect();

        let mut output = CircuitDag::new();
        let mut merged: Vec<_> = merged_clbits.values().copied().collect();
        merged.sort_unstable();
        output.add_creg(ClassicalRegister::new(MERGED_CREG, merged));
        output.set_global_phase(source.global_phase());
        output.set_level(source.level());

        Ok(Self {
            source,
            dual,
            mapping: vec![None; wires.len()],
            wires,
            qubit_index: qubit_indices(source),
            merged_clbits,
            output,
            measured: VecDeque::new(),
            visited: FxHashSet::default(),
            next_slot: 0,
            resets_inserted: 0,
            stack: Vec::new(),
        })
    }

    fn drain(&mut self) -> CompileResult<()> {
        while let Some(task) = self.stack.pop() {
            match task {
                Task::Subpath { qubit, until } => {
                    self.assign(qubit)?;
                    self.stack.push(Task::Walk {
                        qubit,
                        pos: 1,
                        until,
                    });
                }
                Task::Walk { qubit, pos, until } => self.walk(qubit, pos, until)?,
                Task::Require(node) => {
                    let source = self.source;
                    match source.node(node) {
                        Some(DagNode::Op(inst)) if self.visited.insert(node) => {
                            if !inst.is_barrier() {
                                self.schedule(node, inst)?;
                            }
                        }
                        _ => {}
                    }
                }
                Task::Emit(node) => self.emit(node)?,
            }
        }
        Ok(())
    }

    /// Give `qubit` an output slot unless it already has one.
    fn assign(&mut self, qubit: usize) -> CompileResult<()> {
        if self.mapping[qubit].is_some() {
            return Ok(());
        }
        let slot = if let Some(slot) = self.measured.pop_front() {
            self.output.apply(Instruction::reset(QubitId(slot)))?;
            self.resets_inserted += 1;
            slot
        } else {
            let slot = self.next_slot;
            self.next_slot += 1;
            self.output.add_qubit(QubitId(slot));
            slot
        };
        self.mapping[qubit] = Some(slot);
        Ok(())
    }

    /// Walk the wire of `qubit` from `pos` until `until` or the output node.
    ///
    /// On reaching an unvisited operation the walk suspends itself: the
    /// operation's operand subpaths run first, then the operation is
    /// emitted, then the walk resumes.
    fn walk(
        &mut self,
        qubit: usize,
        mut pos: usize,
        until: Option<NodeIndex>,
    ) -> CompileResult<()> {
        let source = self.source;
        while let Some(&node) = self.wires[qubit].get(pos) {
            if until == Some(node) {
                return Ok(());
            }
            match source.node(node) {
                Some(DagNode::Op(inst)) if self.visited.insert(node) => {
                    if !inst.is_barrier() {
                        self.stack.push(Task::Walk {
                            qubit,
                            pos: pos + 1,
                            until,
                        });
                        self.schedule(node, inst)?;
                        return Ok(());
                    }
                }
                Some(DagNode::Out(_)) if self.dual => {
                    let slot = self.slot(qubit)?;
                    self.measured.push_back(slot);
                }
                _ => {}
            }
            pos += 1;
        }
        Ok(())
    }

    /// Queue `node` for emission behind everything it depends on.
    ///
    /// The qubit operands are walked up to `node` and the previous operation
    /// on each of its classical wires is required before it is emitted.
    fn schedule(&mut self, node: NodeIndex, inst: &Instruction) -> CompileResult<()> {
        let source = self.source;
        self.stack.push(Task::Emit(node));

        let mut clbits = inst.clbits.clone();
        if let Some(condition) = inst.condition() {
            clbits.extend(source.condition_clbits(condition)?);
        }
        for clbit in clbits {
            if let Some(prev) = source.predecessor_on_wire(node, WireId::Clbit(clbit)) {
                self.stack.push(Task::Require(prev));
            }
        }

        for &operand in inst.qubits.iter().rev() {
            self.stack.push(Task::Subpath {
                qubit: self.index_of(operand)?,
                until: Some(node),
            });
        }
        Ok(())
    }

    /// Append a copy of `node` to the output, translated onto output bits.
    fn emit(&mut self, node: NodeIndex) -> CompileResult<()> {
        let source = self.source;
        let inst = source.get_instruction(node).ok_or(IrError::InvalidNode)?;

        let mut copy = inst.clone();
        copy.qubits = inst
            .qubits
            .iter()
            .map(|&q| -> CompileResult<QubitId> { Ok(QubitId(self.slot(self.index_of(q)?)?)) })
            .collect::<CompileResult<_>>()?;
        copy.clbits = inst
            .clbits
            .iter()
            .map(|&c| self.merged_clbit(c))
            .collect::<CompileResult<_>>()?;
        if let Some(condition) = copy.condition_mut() {
            *condition = self.remap_condition(condition)?;
        }
        self.output.apply(copy)?;

        // A slot is only recycled after the final measurement on its wire.
        if !self.dual && inst.is_measure() {
            for &qubit in &inst.qubits {
                let is_last = source
                    .successor_on_wire(node, WireId::Qubit(qubit))
                    .and_then(|next| source.node(next))
                    .is_some_and(DagNode::is_output);
                if is_last {
                    let slot = self.slot(self.index_of(qubit)?)?;
                    self.measured.push_back(slot);
                }
            }
        }
        Ok(())
    }

    /// Point a condition at the merged register, keeping bit significance.
    fn remap_condition(&self, condition: &ClassicalCondition) -> CompileResult<ClassicalCondition> {
        let bits = self
            .source
            .condition_clbits(condition)?
            .into_iter()
            .map(|c| self.merged_clbit(c).map(|m| m.0))
            .collect::<CompileResult<Vec<_>>>()?;

        let whole_register = bits.len() == self.merged_clbits.len()
            && bits.iter().enumerate().all(|(i, &b)| b as usize == i);
        Ok(if whole_register {
            ClassicalCondition::new(MERGED_CREG, condition.value)
        } else {
            ClassicalCondition::on_bits(MERGED_CREG, bits, condition.value)
        })
    }

    fn index_of(&self, qubit: QubitId) -> CompileResult<usize> {
        self.qubit_index.get(&qubit).copied().ok_or_else(|| {
            CompileError::Ir(IrError::QubitNotFound {
                qubit,
                gate_name: None,
            })
        })
    }

    fn slot(&self, qubit: usize) -> CompileResult<u32> {
        self.mapping[qubit].ok_or_else(|| CompileError::PassFailed {
            name: "greedy_reuse".into(),
            reason: format!("qubit index {qubit} used before it was mapped"),
        })
    }

    fn merged_clbit(&self, clbit: ClbitId) -> CompileResult<ClbitId> {
        self.merged_clbits.get(&clbit).copied().ok_or_else(|| {
            CompileError::Ir(IrError::ClbitNotFound {
                clbit,
                gate_name: None,
            })
        })
    }

    fn finish(self) -> CompileResult<ReuseOutcome> {
        let mut output = self.output;
        output.add_qreg(QuantumRegister::new(
            OUTPUT_QREG,
            (0..self.next_slot).map(QubitId),
        ));
        let dag = if self.dual {
            output.reverse_ops()?
        } else {
            output
        };

        let mapping = self
            .mapping
            .iter()
            .enumerate()
            .map(|(q, slot)| {
                slot.ok_or_else(|| CompileError::PassFailed {
                    name: "greedy_reuse".into(),
                    reason: format!("qubit index {q} was never mapped"),
                })
            })
            .collect::<CompileResult<_>>()?;

        Ok(ReuseOutcome {
            dag,
            mapping,
            resets_inserted: self.resets_inserted,
        })
    }
}
