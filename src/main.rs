//! CFG Visualiser CLI
//!
//! Rebuilds an annotated control-flow graph from a static and a dynamic
//! trace and writes it as a Graphviz DOT file.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use cfg_visualiser::commands::{execute_visualise, validate_args, VisualiseArgs};
use cfg_visualiser::render::DotConfig;
use cfg_visualiser::utils::config::{DEFAULT_OUTPUT_FILE, DEFAULT_RANKDIR};

/// CFG Visualiser - control-flow graph reconstruction from execution traces
#[derive(Parser, Debug)]
#[command(name = "cfg-visualiser")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Static trace file (block structure)
    static_file: PathBuf,

    /// Dynamic trace file (runtime events)
    dynamic_file: PathBuf,

    /// Output path for the DOT graph
    #[arg(default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Output path for a JSON report (optional)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Graph title
    #[arg(long)]
    title: Option<String>,

    /// Graph rank direction (TB, LR, BT, RL)
    #[arg(long, default_value = DEFAULT_RANKDIR)]
    rankdir: String,

    /// Print text summary to stdout
    #[arg(long)]
    summary: bool,

    /// Render the blocks parsed so far when the static trace is malformed
    #[arg(long)]
    allow_partial: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let mut dot_config = DotConfig::new().with_rankdir(cli.rankdir);
    if let Some(title) = cli.title {
        dot_config = dot_config.with_title(title);
    }

    let args = VisualiseArgs {
        static_file: cli.static_file,
        dynamic_file: cli.dynamic_file,
        output: cli.output,
        report: cli.report,
        dot_config,
        print_summary: cli.summary,
        allow_partial: cli.allow_partial,
    };

    // Validate args first
    validate_args(&args)?;

    execute_visualise(args)?;

    Ok(())
}
