//! In-memory control-flow graph rebuilt from the trace files.
//!
//! Block and instruction ids are opaque keys. They started life as memory
//! addresses inside the instrumented process, but nothing here ever treats
//! them as anything other than lookup keys into the owned tables.

use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Opaque basic block identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

/// Opaque instruction identifier, unique across the whole program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::LowerHex for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::LowerHex for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Data-flow dependency recorded on an instruction
///
/// A lookup key into the graph, not an ownership relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UseEdge {
    pub block: BlockId,
    pub instr: InstrId,
}

impl UseEdge {
    pub fn new(block: BlockId, instr: InstrId) -> Self {
        Self { block, instr }
    }
}

/// Running aggregate of binary-operation results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinOpStats {
    sum: i128,
    count: u64,
}

impl BinOpStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observed result into the aggregate
    pub fn record(&mut self, result: i64) {
        self.sum = self.sum.saturating_add(i128::from(result));
        self.count = self.count.saturating_add(1);
    }

    pub fn sum(&self) -> i128 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean of the recorded samples, 0 when nothing was recorded
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 / self.count as f64
    }
}

/// A single instruction of a basic block
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub id: InstrId,

    /// Disassembly text, kept as written in the static trace
    pub disassembly: String,

    /// Use-edges in file order
    pub uses: Vec<UseEdge>,

    /// Present once the instruction has been seen as a binary operation
    pub binop: Option<BinOpStats>,
}

impl Instruction {
    pub fn new(id: InstrId, disassembly: impl Into<String>) -> Self {
        Self {
            id,
            disassembly: disassembly.into(),
            uses: Vec::new(),
            binop: None,
        }
    }

    pub fn with_uses(mut self, uses: Vec<UseEdge>) -> Self {
        self.uses = uses;
        self
    }

    pub fn record_binop(&mut self, result: i64) {
        self.binop.get_or_insert_with(BinOpStats::new).record(result);
    }

    pub fn is_binop(&self) -> bool {
        self.binop.is_some()
    }

    /// Average binop result, 0 for instructions without samples
    pub fn average(&self) -> f64 {
        self.binop.map(|stats| stats.average()).unwrap_or(0.0)
    }
}

/// A basic block: straight-line code with one entry and one exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub id: BlockId,

    /// Owning function name
    pub function: String,

    /// Instruction ids in execution order
    pub instructions: Vec<InstrId>,

    /// Successors in file order. With two entries the first one is the
    /// "true" edge and the second the "false" edge.
    pub successors: Vec<BlockId>,

    pub exec_count: u64,
}

impl BasicBlock {
    pub fn new(id: BlockId, function: impl Into<String>) -> Self {
        Self {
            id,
            function: function.into(),
            instructions: Vec::new(),
            successors: Vec::new(),
            exec_count: 0,
        }
    }

    pub fn add_successor(&mut self, successor: BlockId) {
        self.successors.push(successor);
    }

    pub fn record_exec(&mut self) {
        self.exec_count = self.exec_count.saturating_add(1);
    }

    pub fn contains(&self, instr: InstrId) -> bool {
        self.instructions.contains(&instr)
    }

    /// True for two-way branches
    pub fn is_conditional(&self) -> bool {
        self.successors.len() == 2
    }

    pub fn is_terminal(&self) -> bool {
        self.successors.is_empty()
    }
}

/// Owner of every block and instruction of one reconstruction
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    blocks: BTreeMap<BlockId, BasicBlock>,
    instructions: HashMap<InstrId, Instruction>,
    total_execs: u64,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a complete block record together with its instructions
    ///
    /// **Public** - used by the static parser once a record is closed
    ///
    /// A block id that is already present is overwritten. Instructions of
    /// the old record leave the instruction table unless the new record or
    /// another block still lists them.
    ///
    /// # Returns
    /// The overwritten block, if any
    pub fn insert_block(
        &mut self,
        mut block: BasicBlock,
        instructions: Vec<Instruction>,
    ) -> Option<BasicBlock> {
        block.instructions = instructions.iter().map(|instr| instr.id).collect();

        let replaced = self.blocks.remove(&block.id);
        if let Some(old) = &replaced {
            warn!(
                "Block {} redefined, overwriting earlier record from function '{}'",
                old.id, old.function
            );
            for id in &old.instructions {
                let still_listed = block.contains(*id)
                    || self.blocks.values().any(|other| other.contains(*id));
                if still_listed {
                    debug!("Instruction {} kept, still listed by another record", id);
                } else {
                    self.instructions.remove(id);
                }
            }
        }

        for instr in instructions {
            if self.instructions.contains_key(&instr.id) {
                warn!("Instruction {} redefined in block {}", instr.id, block.id);
            }
            self.instructions.insert(instr.id, instr);
        }

        debug!(
            "Block {} in '{}': {} instructions, {} successors",
            block.id,
            block.function,
            block.instructions.len(),
            block.successors.len()
        );
        self.blocks.insert(block.id, block);

        replaced
    }

    /// Count one execution of a block
    ///
    /// # Returns
    /// false when the block is unknown (nothing is counted then)
    pub fn record_exec(&mut self, id: BlockId) -> bool {
        match self.blocks.get_mut(&id) {
            Some(block) => {
                block.record_exec();
                self.total_execs = self.total_execs.saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn instruction(&self, id: InstrId) -> Option<&Instruction> {
        self.instructions.get(&id)
    }

    pub fn instruction_mut(&mut self, id: InstrId) -> Option<&mut Instruction> {
        self.instructions.get_mut(&id)
    }

    /// Blocks ordered by id
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.values()
    }

    /// Instructions of a block, in block order
    pub fn block_instructions<'a>(
        &'a self,
        block: &'a BasicBlock,
    ) -> impl Iterator<Item = &'a Instruction> + 'a {
        block
            .instructions
            .iter()
            .filter_map(move |id| self.instructions.get(id))
    }

    pub fn contains_block(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    pub fn use_edge_count(&self) -> usize {
        self.instructions.values().map(|instr| instr.uses.len()).sum()
    }

    /// Exec events applied so far, across all blocks
    pub fn total_execs(&self) -> u64 {
        self.total_execs
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
