//! CFG Visualiser
//!
//! Offline reconstruction of an annotated control-flow graph from the two
//! trace files of an instrumented build:
//!
//! - the *static* trace: every basic block with its instructions,
//!   successors and data-use edges
//! - the *dynamic* trace: block executions and binary-operation results
//!   logged while the program ran
//!
//! The graph is rendered as a Graphviz DOT description with heat coloring,
//! True/False branch ports and a data-flow overlay.
//!
//! ## Getting Started
//!
//! ```bash
//! cfg-visualiser run.pcno run.pcda cfg.dot
//! dot -Tsvg cfg.dot -o cfg.svg
//! ```

pub mod aggregator;
pub mod commands;
pub mod graph;
pub mod output;
pub mod parser;
pub mod render;
pub mod utils;
