//! JSON report schema.
//!
//! The report mirrors what the DOT rendering shows, in machine-readable
//! form. Ids are written as hex strings, the same way the traces write them.
//! Schema is versioned to allow future evolution.

use crate::aggregator::metrics::{ExecStats, Heat};
use crate::graph::GraphModel;
use crate::parser::DynamicTraceReport;
use crate::utils::config::REPORT_SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfgReport {
    /// Schema version for compatibility checking
    pub version: String,

    pub static_trace: String,

    pub dynamic_trace: String,

    pub total_execs: u64,

    /// Absent when the mean is undefined (no blocks or no exec events)
    pub mean_exec: Option<f64>,

    pub blocks: Vec<BlockReport>,

    /// Dynamic events that were skipped, as messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// Per-block entry of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockReport {
    pub id: String,
    pub function: String,
    pub exec_count: u64,
    pub heat: Heat,
    pub instructions: usize,
    pub successors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binops: Vec<BinOpReport>,
}

/// Aggregated binary-operation results of one instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinOpReport {
    pub instruction: String,
    pub samples: u64,
    pub average: f64,
}

/// Build a report from the final graph
///
/// **Public** - used by commands to create the JSON output
pub fn build_report(
    graph: &GraphModel,
    stats: &ExecStats,
    dynamic: &DynamicTraceReport,
    static_trace: &str,
    dynamic_trace: &str,
) -> CfgReport {
    use chrono::Utc;

    let blocks = graph
        .blocks()
        .map(|block| BlockReport {
            id: block.id.to_string(),
            function: block.function.clone(),
            exec_count: block.exec_count,
            heat: stats.classify_block(block),
            instructions: block.instructions.len(),
            successors: block.successors.iter().map(|s| s.to_string()).collect(),
            binops: graph
                .block_instructions(block)
                .filter_map(|instr| {
                    instr.binop.map(|binop| BinOpReport {
                        instruction: instr.id.to_string(),
                        samples: binop.count(),
                        average: binop.average(),
                    })
                })
                .collect(),
        })
        .collect();

    CfgReport {
        version: REPORT_SCHEMA_VERSION.to_string(),
        static_trace: static_trace.to_string(),
        dynamic_trace: dynamic_trace.to_string(),
        total_execs: stats.total_execs,
        mean_exec: stats.mean.value(),
        blocks,
        issues: dynamic.issues.iter().map(|issue| issue.to_string()).collect(),
        generated_at: Utc::now().to_rfc3339(),
    }
}
