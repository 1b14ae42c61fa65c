//! Execution statistics and heat classification.
//!
//! A block is hot when its execution count reaches the graph-wide mean.
//! Everything here is computed on demand from the graph; nothing is cached.

use crate::graph::{BasicBlock, GraphModel};
use log::debug;
use serde::{Deserialize, Serialize};

/// Graph-wide mean execution count
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeanExec {
    Value(f64),

    /// No blocks, or no exec events at all
    EmptyGraphAverage,
}

impl MeanExec {
    pub fn value(&self) -> Option<f64> {
        match self {
            MeanExec::Value(mean) => Some(*mean),
            MeanExec::EmptyGraphAverage => None,
        }
    }
}

/// Hot/cold classification of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heat {
    Hot,
    Cold,
}

impl Heat {
    pub fn is_hot(&self) -> bool {
        *self == Heat::Hot
    }
}

/// Classify an execution count against the mean
///
/// **Public** - ties classify hot, an undefined mean classifies cold
pub fn classify(exec_count: u64, mean: MeanExec) -> Heat {
    match mean {
        MeanExec::Value(mean) if exec_count as f64 >= mean => Heat::Hot,
        _ => Heat::Cold,
    }
}

/// Totals the renderer and the summaries work from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecStats {
    pub total_execs: u64,
    pub block_count: usize,
    pub mean: MeanExec,
}

impl ExecStats {
    pub fn classify(&self, exec_count: u64) -> Heat {
        classify(exec_count, self.mean)
    }

    pub fn classify_block(&self, block: &BasicBlock) -> Heat {
        self.classify(block.exec_count)
    }
}

/// Compute the execution statistics of a graph
///
/// **Public** - main entry point for aggregation
///
/// # Returns
/// Mean = total exec events / number of blocks, or
/// `MeanExec::EmptyGraphAverage` when either is zero
pub fn calculate_exec_stats(graph: &GraphModel) -> ExecStats {
    let total_execs = graph.total_execs();
    let block_count = graph.block_count();

    let mean = if block_count == 0 || total_execs == 0 {
        MeanExec::EmptyGraphAverage
    } else {
        MeanExec::Value(total_execs as f64 / block_count as f64)
    };

    debug!(
        "Exec stats: {} execs over {} blocks, mean {:?}",
        total_execs, block_count, mean
    );

    ExecStats {
        total_execs,
        block_count,
        mean,
    }
}

/// Blocks sorted by execution count (descending, ties by id)
///
/// **Public** - used by the text summary
pub fn hottest_blocks(graph: &GraphModel, top_n: usize) -> Vec<&BasicBlock> {
    let mut blocks: Vec<&BasicBlock> = graph.blocks().collect();
    blocks.sort_by(|a, b| b.exec_count.cmp(&a.exec_count).then(a.id.cmp(&b.id)));
    blocks.truncate(top_n);
    blocks
}

/// Whole-graph summary statistics
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSummary {
    pub block_count: usize,
    pub instruction_count: usize,
    pub use_edge_count: usize,
    pub binop_instructions: usize,
    pub total_execs: u64,
    pub mean: MeanExec,
    pub hot_blocks: usize,
    pub cold_blocks: usize,
}

/// Compute summary statistics for a graph
///
/// **Public** - logged by the visualise command
pub fn calculate_graph_summary(graph: &GraphModel, stats: &ExecStats) -> GraphSummary {
    let hot_blocks = graph
        .blocks()
        .filter(|block| stats.classify_block(block).is_hot())
        .count();

    let binop_instructions = graph
        .blocks()
        .flat_map(|block| graph.block_instructions(block))
        .filter(|instr| instr.is_binop())
        .count();

    GraphSummary {
        block_count: graph.block_count(),
        instruction_count: graph.instruction_count(),
        use_edge_count: graph.use_edge_count(),
        binop_instructions,
        total_execs: stats.total_execs,
        mean: stats.mean,
        hot_blocks,
        cold_blocks: graph.block_count() - hot_blocks,
    }
}

impl GraphSummary {
    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        let mean = match self.mean.value() {
            Some(mean) => format!("{:.2}", mean),
            None => "n/a".to_string(),
        };
        format!(
            "Blocks: {} | Instructions: {} | Use-edges: {} | Execs: {} | Mean: {} | Hot: {} | Cold: {}",
            self.block_count,
            self.instruction_count,
            self.use_edge_count,
            self.total_execs,
            mean,
            self.hot_blocks,
            self.cold_blocks
        )
    }
}
