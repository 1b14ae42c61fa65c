//! Plain-text summary of the hottest blocks, for terminal output.

use crate::aggregator::metrics::{hottest_blocks, ExecStats, Heat};
use crate::graph::GraphModel;

/// Create a text table of the hottest blocks with their share of all execs
pub fn generate_text_summary(graph: &GraphModel, stats: &ExecStats, max_lines: usize) -> String {
    let mut lines = Vec::new();

    lines.push("  HOTTEST BASIC BLOCKS".to_string());
    lines.push(format!("  ┏{}┳{}┳{}┳{}┳{}┓", "━".repeat(18), "━".repeat(24), "━".repeat(12), "━".repeat(9), "━".repeat(6)));
    lines.push(format!(
        "  ┃ {:<16} ┃ {:<22} ┃ {:>10} ┃ {:>7} ┃ {:^4} ┃",
        "Block", "Function", "EXECS", "%", "HEAT"
    ));
    lines.push(format!("  ┣{}╋{}╋{}╋{}╋{}┫", "━".repeat(18), "━".repeat(24), "━".repeat(12), "━".repeat(9), "━".repeat(6)));

    let total = stats.total_execs.max(1);
    for block in hottest_blocks(graph, max_lines) {
        let percentage = (block.exec_count as f64 / total as f64) * 100.0;
        let heat = match stats.classify_block(block) {
            Heat::Hot => "hot",
            Heat::Cold => "cold",
        };

        // Truncate long function names for display
        let function = if block.function.chars().count() > 22 {
            let tail: String = block.function.chars().take(19).collect();
            format!("{}...", tail)
        } else {
            block.function.clone()
        };

        lines.push(format!(
            "  ┃ {:<16} ┃ {:<22} ┃ {:>10} ┃ {:>6.1}% ┃ {:^4} ┃",
            block.id.to_string(),
            function,
            block.exec_count,
            percentage,
            heat
        ));
    }

    lines.push(format!("  ┗{}┻{}┻{}┻{}┻{}┛", "━".repeat(18), "━".repeat(24), "━".repeat(12), "━".repeat(9), "━".repeat(6)));

    if graph.block_count() > max_lines {
        lines.push(String::new());
        lines.push(format!(
            "   (Showing top {} of {} blocks)",
            max_lines,
            graph.block_count()
        ));
    }

    lines.join("\n")
}
