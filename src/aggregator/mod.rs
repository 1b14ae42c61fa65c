//! Aggregation of the reconstructed graph into derived statistics.
//!
//! This module derives:
//! - The graph-wide mean execution count
//! - Hot/cold classification of blocks
//! - Summary statistics for logging and reports

pub mod metrics;

// Re-export main types and functions
pub use metrics::{
    calculate_exec_stats, calculate_graph_summary, classify, hottest_blocks, ExecStats,
    GraphSummary, Heat, MeanExec,
};
