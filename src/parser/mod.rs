//! Trace parsing.
//!
//! This module handles:
//! - Tokenizing the static trace grammar
//! - Building the graph from static block records
//! - Applying dynamic runtime events to the graph

pub mod dynamic_trace;
pub mod lexer;
pub mod static_trace;

// Re-export main types
pub use dynamic_trace::{apply_event, parse_dynamic_file, parse_dynamic_trace, DynamicEvent, DynamicTraceReport};
pub use static_trace::{parse_static_file, parse_static_trace, StaticTraceParser, StaticTraceSummary};
