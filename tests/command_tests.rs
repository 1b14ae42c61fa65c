use cfg_visualiser::aggregator::Heat;
use cfg_visualiser::commands::{execute_visualise, validate_args, VisualiseArgs};
use cfg_visualiser::graph::BlockId;
use cfg_visualiser::output::read_report;
use std::fs;
use std::path::Path;

const STATIC_TRACE: &str = "\
0 2 main 2 1 2
{
10 0 %1 = add i32 %a, %b
11 1 0 10 %c = icmp sgt i32 %1, 0
}

1 1 main 0
{
20 0 ret i32 1
}

2 1 main 0
{
30 0 ret i32 0
}

";

const DYNAMIC_TRACE: &str = "exec 0\nbinop 0 10 2\nexec 0\nbinop 0 10 4\nexec 1\nexec 9\n";

fn write_inputs(dir: &Path, static_src: &str, dynamic_src: &str) -> VisualiseArgs {
    let static_file = dir.join("run.pcno");
    let dynamic_file = dir.join("run.pcda");
    fs::write(&static_file, static_src).unwrap();
    fs::write(&dynamic_file, dynamic_src).unwrap();

    VisualiseArgs {
        static_file,
        dynamic_file,
        output: dir.join("out/cfg.dot"),
        ..Default::default()
    }
}

#[test]
fn test_visualise_writes_dot() {
    let dir = tempfile::tempdir().unwrap();
    let args = write_inputs(dir.path(), STATIC_TRACE, DYNAMIC_TRACE);
    validate_args(&args).unwrap();

    let outcome = execute_visualise(args.clone()).unwrap();

    assert!(outcome.static_fault.is_none());
    assert_eq!(outcome.skipped_events, 1);
    assert_eq!(outcome.graph.block(BlockId(0)).unwrap().exec_count, 2);

    let dot = fs::read_to_string(&args.output).unwrap();
    assert!(dot.starts_with("digraph \"CFG\" {"));
    assert!(dot.contains(">%1 = add i32 %a, %b = 3</TD>"));
    assert!(dot.contains("label=\"True\""));
    assert!(dot.contains("label=\"False\""));
    assert_eq!(dot.matches("style=\"dashed\", color=").count(), 1);
}

#[test]
fn test_visualise_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.json");
    let args = VisualiseArgs {
        report: Some(report_path.clone()),
        ..write_inputs(dir.path(), STATIC_TRACE, DYNAMIC_TRACE)
    };

    execute_visualise(args).unwrap();
    let report = read_report(&report_path).unwrap();

    assert_eq!(report.total_execs, 3);
    assert_eq!(report.mean_exec, Some(1.0));
    assert_eq!(report.blocks.len(), 3);
    assert_eq!(report.blocks[0].id, "0");
    assert_eq!(report.blocks[0].heat, Heat::Hot);
    assert_eq!(report.blocks[0].successors, vec!["1", "2"]);
    assert_eq!(report.blocks[0].binops[0].samples, 2);
    assert_eq!(report.blocks[0].binops[0].average, 3.0);
    assert_eq!(report.blocks[2].heat, Heat::Cold);
    assert_eq!(report.issues.len(), 1);
}

#[test]
fn test_malformed_static_trace_fails_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let broken = format!("{}3 0 main 0\n<\n}}\n", STATIC_TRACE);
    let args = write_inputs(dir.path(), &broken, DYNAMIC_TRACE);

    let err = execute_visualise(args.clone()).unwrap_err();

    assert!(format!("{:#}", err).contains("Malformed record"));
    assert!(!args.output.exists());
}

#[test]
fn test_malformed_static_trace_with_allow_partial() {
    let dir = tempfile::tempdir().unwrap();
    let broken = format!("{}3 0 main 0\n<\n}}\n", STATIC_TRACE);
    let args = VisualiseArgs {
        allow_partial: true,
        ..write_inputs(dir.path(), &broken, DYNAMIC_TRACE)
    };

    let outcome = execute_visualise(args.clone()).unwrap();

    assert!(outcome.static_fault.is_some());
    assert_eq!(outcome.graph.block_count(), 3);
    assert!(args.output.exists());
}

#[test]
fn test_empty_dynamic_trace() {
    let dir = tempfile::tempdir().unwrap();
    let args = write_inputs(dir.path(), STATIC_TRACE, "");

    let outcome = execute_visualise(args.clone()).unwrap();

    assert_eq!(outcome.skipped_events, 0);
    let dot = fs::read_to_string(&args.output).unwrap();
    assert!(!dot.contains("BGCOLOR=\"gold\""));
}

#[test]
fn test_missing_dynamic_trace() {
    let dir = tempfile::tempdir().unwrap();
    let args = VisualiseArgs {
        dynamic_file: dir.path().join("missing.pcda"),
        ..write_inputs(dir.path(), STATIC_TRACE, "")
    };

    assert!(validate_args(&args).is_err());
    assert!(execute_visualise(args).is_err());
}
