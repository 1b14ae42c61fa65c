//! Graphviz DOT rendering of the annotated control-flow graph.
//!
//! Each block becomes one HTML-table node:
//! - header row with id, function and exec count, colored by heat
//! - one row per instruction, binary operations suffixed with their average
//! - a True/False row for two-way branches, whose cells are the edge ports
//!
//! Control edges are solid, data-flow edges dashed and colored by cycling
//! a fixed palette in emission order. A legend cluster is always present.

use crate::aggregator::metrics::{ExecStats, Heat};
use crate::graph::{BasicBlock, GraphModel, Instruction};
use crate::utils::config::{
    COLD_BRANCH_COLOR, COLD_HEADER_COLOR, DATAFLOW_PALETTE, DEFAULT_FONT, DEFAULT_GRAPH_NAME,
    DEFAULT_RANKDIR, HOT_BRANCH_COLOR, HOT_HEADER_COLOR, VALID_RANKDIRS,
};
use log::{info, warn};

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Graph identifier in the `digraph` statement
    pub name: String,
    /// Optional graph label shown on top
    pub title: Option<String>,
    pub rankdir: String,
    pub font: String,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_GRAPH_NAME.to_string(),
            title: None,
            rankdir: DEFAULT_RANKDIR.to_string(),
            font: DEFAULT_FONT.to_string(),
        }
    }
}

impl DotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_rankdir(mut self, rankdir: impl Into<String>) -> Self {
        self.rankdir = rankdir.into();
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }
}

/// Color of the n-th data-flow edge of a render pass
pub fn dataflow_color(emission_index: usize) -> &'static str {
    DATAFLOW_PALETTE[emission_index % DATAFLOW_PALETTE.len()]
}

/// Header and branch-cell colors for a heat class
pub fn heat_colors(heat: Heat) -> (&'static str, &'static str) {
    match heat {
        Heat::Hot => (HOT_HEADER_COLOR, HOT_BRANCH_COLOR),
        Heat::Cold => (COLD_HEADER_COLOR, COLD_BRANCH_COLOR),
    }
}

/// Rank direction to emit, falling back to the default for unknown values
fn checked_rankdir(rankdir: &str) -> &str {
    if VALID_RANKDIRS.contains(&rankdir) {
        rankdir
    } else {
        warn!(
            "Unknown rank direction '{}', using {}",
            rankdir, DEFAULT_RANKDIR
        );
        DEFAULT_RANKDIR
    }
}

/// Node identifier of a block
pub fn node_name(block: &BasicBlock) -> String {
    format!("bb_{:x}", block.id)
}

/// Render the graph as DOT text
///
/// **Public** - main entry point for rendering
///
/// # Arguments
/// * `graph` - Graph after both parsing passes
/// * `stats` - Execution statistics used for heat classification
/// * `config` - Cosmetic settings, defaults when `None`
///
/// # Returns
/// The complete DOT description. An empty graph still renders the legend.
pub fn render_dot(graph: &GraphModel, stats: &ExecStats, config: Option<&DotConfig>) -> String {
    let config = config.cloned().unwrap_or_default();
    info!("Rendering {} blocks to DOT", graph.block_count());

    let mut out = String::new();
    out.push_str(&format!("digraph \"{}\" {{\n", escape_quoted(&config.name)));
    if let Some(title) = &config.title {
        out.push_str(&format!("  label=\"{}\";\n", escape_quoted(title)));
        out.push_str("  labelloc=\"t\";\n");
    }
    out.push_str(&format!("  rankdir={};\n", checked_rankdir(&config.rankdir)));
    out.push_str(&format!(
        "  node [shape=plaintext, fontname=\"{}\"];\n",
        escape_quoted(&config.font)
    ));
    out.push_str(&format!("  edge [fontname=\"{}\"];\n", escape_quoted(&config.font)));

    for block in graph.blocks() {
        out.push('\n');
        render_block(graph, block, stats.classify_block(block), &mut out);
        render_control_edges(graph, block, &mut out);
    }

    let emitted = render_dataflow_edges(graph, &mut out);
    render_legend(&mut out);

    out.push_str("}\n");

    info!(
        "DOT rendered ({} bytes, {} data-flow edges)",
        out.len(),
        emitted
    );
    out
}

fn render_block(graph: &GraphModel, block: &BasicBlock, heat: Heat, out: &mut String) {
    let (header_color, branch_color) = heat_colors(heat);

    out.push_str(&format!("  \"{}\" [label=<\n", node_name(block)));
    out.push_str("<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\" CELLPADDING=\"4\">\n");
    out.push_str(&format!(
        "<TR><TD PORT=\"header\" COLSPAN=\"2\" BGCOLOR=\"{}\">BasicBlock {} in {}<BR/>Exec num: {}</TD></TR>\n",
        header_color,
        block.id,
        escape_html(&block.function),
        block.exec_count
    ));

    for instr in graph.block_instructions(block) {
        out.push_str(&format!(
            "<TR><TD PORT=\"i{:x}\" COLSPAN=\"2\" ALIGN=\"LEFT\">{}</TD></TR>\n",
            instr.id,
            escape_html(&instruction_text(instr))
        ));
    }

    if block.is_conditional() {
        out.push_str(&format!(
            "<TR><TD PORT=\"true\" BGCOLOR=\"{0}\">True</TD><TD PORT=\"false\" BGCOLOR=\"{0}\">False</TD></TR>\n",
            branch_color
        ));
    }

    out.push_str("</TABLE>>];\n");
}

/// Instruction row text, with the binop average appended
pub fn instruction_text(instr: &Instruction) -> String {
    match instr.binop {
        Some(stats) => format!("{} = {}", instr.disassembly, stats.average()),
        None => instr.disassembly.clone(),
    }
}

fn render_control_edges(graph: &GraphModel, block: &BasicBlock, out: &mut String) {
    for successor in &block.successors {
        if !graph.contains_block(*successor) {
            warn!("Block {} has successor {} which is not in the graph", block.id, successor);
        }
    }

    let from = node_name(block);
    match block.successors.as_slice() {
        [] => {}
        [target] => {
            out.push_str(&format!("  \"{}\" -> \"bb_{:x}\" [style=\"solid\"];\n", from, target));
        }
        [on_true, on_false] => {
            out.push_str(&format!(
                "  \"{}\":\"true\":s -> \"bb_{:x}\" [style=\"solid\", label=\"True\"];\n",
                from, on_true
            ));
            out.push_str(&format!(
                "  \"{}\":\"false\":s -> \"bb_{:x}\" [style=\"solid\", label=\"False\"];\n",
                from, on_false
            ));
        }
        targets => {
            // not produced by the instrumentation pass, but keep every edge
            warn!("Block {} has {} successors", block.id, targets.len());
            for target in targets {
                out.push_str(&format!("  \"{}\" -> \"bb_{:x}\" [style=\"solid\"];\n", from, target));
            }
        }
    }
}

/// Emit one dashed edge per use-edge, in block then instruction order
///
/// # Returns
/// Number of edges emitted
fn render_dataflow_edges(graph: &GraphModel, out: &mut String) -> usize {
    let mut emitted = 0;

    for block in graph.blocks() {
        for instr in graph.block_instructions(block) {
            for edge in &instr.uses {
                let resolved = graph
                    .block(edge.block)
                    .map(|target| target.contains(edge.instr))
                    .unwrap_or(false);
                if !resolved {
                    warn!(
                        "Use-edge from instruction {} points at {}:{} which is not in the graph",
                        instr.id, edge.block, edge.instr
                    );
                }

                if emitted == 0 {
                    out.push('\n');
                }
                out.push_str(&format!(
                    "  \"bb_{:x}\":\"i{:x}\":e -> \"bb_{:x}\":\"i{:x}\":e [style=\"dashed\", color=\"{}\"];\n",
                    block.id,
                    instr.id,
                    edge.block,
                    edge.instr,
                    dataflow_color(emitted)
                ));
                emitted += 1;
            }
        }
    }

    emitted
}

fn render_legend(out: &mut String) {
    out.push_str("\n  subgraph cluster_legend {\n");
    out.push_str("    label=\"Legend\";\n");
    out.push_str("    style=\"dashed\";\n");
    out.push_str("    node [shape=plaintext, label=\"\"];\n");
    out.push_str("    legend_control_from -> legend_control_to [style=\"solid\", label=\"solid = control flow\"];\n");
    out.push_str("    legend_data_from -> legend_data_to [style=\"dashed\", label=\"dashed = data flow\"];\n");
    out.push_str("  }\n");
}

/// Escape text for an HTML-like label
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape text for a double-quoted DOT string
pub fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
