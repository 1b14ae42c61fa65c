//! Configuration and constants for the visualiser.

/// Output file used when no path is given on the command line
pub const DEFAULT_OUTPUT_FILE: &str = "cfg.dot";

/// Current JSON report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

// Dynamic trace event tags (one event per line, written by the runtime loggers)
pub const EXEC_TAG: &str = "exec";
pub const BINOP_TAG: &str = "binop";

// Static trace record delimiters
pub const OPEN_DELIMITER: &str = "{";
pub const CLOSE_DELIMITER: &str = "}";

// Heat colors: header cell background, then branch-row cell background
pub const HOT_HEADER_COLOR: &str = "gold";
pub const HOT_BRANCH_COLOR: &str = "orange";
pub const COLD_HEADER_COLOR: &str = "cyan";
pub const COLD_BRANCH_COLOR: &str = "deepskyblue";

/// Fixed palette cycled over data-flow edges in emission order
pub const DATAFLOW_PALETTE: [&str; 5] = ["crimson", "royalblue", "forestgreen", "darkorchid", "chocolate"];

pub const DEFAULT_GRAPH_NAME: &str = "CFG";
pub const DEFAULT_RANKDIR: &str = "TB";
pub const DEFAULT_FONT: &str = "monospace";

/// Rank directions accepted by Graphviz
pub const VALID_RANKDIRS: &[&str] = &["TB", "LR", "BT", "RL"];
