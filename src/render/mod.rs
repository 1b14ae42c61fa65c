//! Rendering of the annotated graph.
//!
//! This module converts the reconstructed graph plus its execution
//! statistics into a Graphviz DOT description and a terminal summary.

pub mod dot;
pub mod text;

// Re-export main types
pub use dot::{dataflow_color, render_dot, DotConfig};
pub use text::generate_text_summary;
