//! Control-flow graph model.
//!
//! This module owns the reconstructed graph:
//! - Basic blocks keyed by id
//! - Instructions keyed by id
//! - Use-edges and binary-operation aggregates

pub mod model;

// Re-export main types
pub use model::{BasicBlock, BinOpStats, BlockId, GraphModel, InstrId, Instruction, UseEdge};
