//! Visualise command implementation.
//!
//! The visualise command:
//! 1. Parses the static trace into a graph
//! 2. Applies the dynamic trace to the graph
//! 3. Computes execution statistics
//! 4. Renders the DOT description
//! 5. Writes output files

use crate::aggregator::{calculate_exec_stats, calculate_graph_summary};
use crate::graph::GraphModel;
use crate::output::{build_report, write_dot, write_report};
use crate::parser::{parse_dynamic_file, parse_static_file};
use crate::render::{generate_text_summary, render_dot, DotConfig};
use crate::utils::config::{DEFAULT_OUTPUT_FILE, VALID_RANKDIRS};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the visualise command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct VisualiseArgs {
    /// Static trace written by the instrumentation pass
    pub static_file: PathBuf,

    /// Dynamic trace written by the instrumented binary
    pub dynamic_file: PathBuf,

    /// Output path for the DOT description
    pub output: PathBuf,

    /// Output path for the JSON report (optional)
    pub report: Option<PathBuf>,

    /// Rendering configuration
    pub dot_config: DotConfig,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Render whatever was parsed when the static trace is malformed
    pub allow_partial: bool,
}

impl Default for VisualiseArgs {
    fn default() -> Self {
        Self {
            static_file: PathBuf::new(),
            dynamic_file: PathBuf::new(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            report: None,
            dot_config: DotConfig::default(),
            print_summary: false,
            allow_partial: false,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct VisualiseOutcome {
    pub graph: GraphModel,

    /// Set when the static trace was cut short and the partial graph was rendered
    pub static_fault: Option<String>,

    /// Number of dynamic events that were skipped
    pub skipped_events: usize,
}

/// Execute the visualise command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable trace files
/// * A malformed static record, unless `allow_partial` is set
/// * File write errors
pub fn execute_visualise(args: VisualiseArgs) -> Result<VisualiseOutcome> {
    let start_time = Instant::now();
    let mut graph = GraphModel::new();

    // Step 1: Static trace
    info!("Step 1/5: Parsing static trace...");
    let static_fault = match parse_static_file(&args.static_file, &mut graph) {
        Ok(summary) => {
            if summary.overwritten > 0 {
                warn!("{} block records overwrote earlier ones", summary.overwritten);
            }
            None
        }
        Err(e) if args.allow_partial => {
            error!(
                "Static trace {} is malformed: {}",
                args.static_file.display(),
                e
            );
            warn!("Continuing with {} fully parsed blocks", graph.block_count());
            Some(e.to_string())
        }
        Err(e) => {
            return Err(e).context(format!(
                "Failed to parse static trace {}",
                args.static_file.display()
            ))
        }
    };

    // Step 2: Dynamic trace
    info!("Step 2/5: Applying dynamic trace...");
    let dynamic = parse_dynamic_file(&args.dynamic_file, &mut graph).context(format!(
        "Failed to read dynamic trace {}",
        args.dynamic_file.display()
    ))?;
    if !dynamic.is_clean() {
        warn!("{} dynamic events were skipped", dynamic.issues.len());
    }

    // Step 3: Aggregation
    info!("Step 3/5: Computing execution statistics...");
    let stats = calculate_exec_stats(&graph);
    let summary = calculate_graph_summary(&graph, &stats);
    info!("Graph: {}", summary.summary());

    // Step 4: Rendering
    info!("Step 4/5: Rendering DOT...");
    let dot = render_dot(&graph, &stats, Some(&args.dot_config));
    debug!("Rendered {} lines", dot.lines().count());

    // Step 5: Outputs
    info!("Step 5/5: Writing output files...");
    write_dot(&dot, &args.output).context("Failed to write DOT output")?;
    info!("✓ Graph written to: {}", args.output.display());

    if let Some(report_path) = &args.report {
        let report = build_report(
            &graph,
            &stats,
            &dynamic,
            &args.static_file.display().to_string(),
            &args.dynamic_file.display().to_string(),
        );
        write_report(&report, report_path).context("Failed to write JSON report")?;
        info!("✓ Report written to: {}", report_path.display());
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("CFG SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Static trace:  {}", args.static_file.display());
        println!("Dynamic trace: {}", args.dynamic_file.display());
        println!("{}", summary.summary());
        println!("\n{}", generate_text_summary(&graph, &stats, 10));
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Visualisation completed in {:.2}s", elapsed.as_secs_f64());

    Ok(VisualiseOutcome {
        graph,
        static_fault,
        skipped_events: dynamic.issues.len(),
    })
}

/// Validate visualise arguments
///
/// **Public** - can be called before execute_visualise for early validation
pub fn validate_args(args: &VisualiseArgs) -> Result<()> {
    if !args.static_file.is_file() {
        anyhow::bail!("Static trace not found: {}", args.static_file.display());
    }

    if !args.dynamic_file.is_file() {
        anyhow::bail!("Dynamic trace not found: {}", args.dynamic_file.display());
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.output.is_dir() {
        anyhow::bail!("Output path is a directory: {}", args.output.display());
    }

    if args.output == args.static_file || args.output == args.dynamic_file {
        anyhow::bail!("Output path would overwrite an input trace");
    }

    if !VALID_RANKDIRS.contains(&args.dot_config.rankdir.as_str()) {
        anyhow::bail!(
            "Invalid rank direction '{}' (expected one of {})",
            args.dot_config.rankdir,
            VALID_RANKDIRS.join(", ")
        );
    }

    Ok(())
}
