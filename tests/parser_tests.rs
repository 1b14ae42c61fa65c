use cfg_visualiser::graph::{BlockId, GraphModel, InstrId, UseEdge};
use cfg_visualiser::parser::{parse_dynamic_trace, parse_static_trace, DynamicEvent};
use cfg_visualiser::utils::error::{DynamicTraceError, ParseError, ReferenceKind};
use pretty_assertions::assert_eq;

const TWO_BLOCKS: &str = "\
0 2 main 1 1
{
10 0 %1 = add i32 %a, %b
11 1 1 20 %2 = icmp slt i32 %1, 10
}

1 1 main 0
{
20 1 0 10 ret i32 %1
}

";

fn two_block_graph() -> GraphModel {
    let mut graph = GraphModel::new();
    parse_static_trace(TWO_BLOCKS, &mut graph).unwrap();
    graph
}

#[test]
fn test_static_trace_builds_blocks() {
    let graph = two_block_graph();

    assert_eq!(graph.block_count(), 2);
    assert_eq!(graph.instruction_count(), 3);

    let entry = graph.block(BlockId(0)).unwrap();
    assert_eq!(entry.function, "main");
    assert_eq!(entry.instructions, vec![InstrId(0x10), InstrId(0x11)]);
    assert_eq!(entry.successors, vec![BlockId(1)]);
    assert_eq!(entry.exec_count, 0);

    let cmp = graph.instruction(InstrId(0x11)).unwrap();
    assert_eq!(cmp.disassembly, "%2 = icmp slt i32 %1, 10");
    assert_eq!(cmp.uses, vec![UseEdge::new(BlockId(1), InstrId(0x20))]);
}

#[test]
fn test_pass_layout_one_field_per_line() {
    // the layout the instrumentation pass writes: every field on its own line
    let src = "0x5581a0\n1\nmain\n2\n0x5581b0\n0x5581c0\n{\n0x5581a8 1\n0x5581b0 0x5581b8\n  br i1 %c, label %t, label %f\n}\n\n";
    let mut graph = GraphModel::new();
    let summary = parse_static_trace(src, &mut graph).unwrap();

    assert_eq!(summary.records, 1);
    assert_eq!(summary.use_edges, 1);
    let block = graph.block(BlockId(0x5581a0)).unwrap();
    assert_eq!(block.successors, vec![BlockId(0x5581b0), BlockId(0x5581c0)]);
    assert_eq!(
        graph.instruction(InstrId(0x5581a8)).unwrap().disassembly,
        "br i1 %c, label %t, label %f"
    );
}

#[test]
fn test_malformed_record_keeps_earlier_blocks() {
    let src = format!("{}2 0 main 0\n(\n}}\n\n", TWO_BLOCKS);
    let mut graph = GraphModel::new();

    let err = parse_static_trace(&src, &mut graph).unwrap_err();

    assert!(matches!(err, ParseError::MalformedRecord { .. }));
    assert_eq!(graph.block_count(), 2);
    assert!(graph.block(BlockId(2)).is_none());
}

#[test]
fn test_missing_close_brace() {
    let src = "0 1 main 0\n{\n1 0 ret\n2 0 ret\n}\n\n";
    let mut graph = GraphModel::new();

    let err = parse_static_trace(src, &mut graph).unwrap_err();

    match err {
        ParseError::MalformedRecord { line, found, .. } => {
            assert_eq!(line, 4);
            assert_eq!(found, "'2'");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(graph.is_empty());
}

#[test]
fn test_oversized_instruction_count_is_a_parse_fault() {
    let src = format!("{}2 99999999999999 main 0\n{{\n}}\n\n", TWO_BLOCKS);
    let mut graph = GraphModel::new();

    let err = parse_static_trace(&src, &mut graph).unwrap_err();

    assert!(matches!(err, ParseError::MalformedRecord { line: 14, .. }));
    assert_eq!(graph.block_count(), 2);
}

#[test]
fn test_oversized_use_count_is_a_parse_fault() {
    let src = format!("{}2 1 main 0\n{{\n1 99999999999999 0 1\n}}\n\n", TWO_BLOCKS);
    let mut graph = GraphModel::new();

    let err = parse_static_trace(&src, &mut graph).unwrap_err();

    // the closing brace is read as the next use-edge block id
    assert!(matches!(err, ParseError::InvalidNumber { line: 15, .. }));
    assert_eq!(graph.block_count(), 2);
}

#[test]
fn test_invalid_hex_id() {
    let mut graph = GraphModel::new();
    let err = parse_static_trace("xyz 0 main 0\n{\n}\n", &mut graph).unwrap_err();
    assert!(matches!(err, ParseError::InvalidNumber { line: 1, .. }));
}

#[test]
fn test_duplicate_block_overwrites() {
    let src = "0 1 f 0\n{\n1 0 ret\n}\n\n0 1 g 1 5\n{\n2 0 br label %x\n}\n\n";
    let mut graph = GraphModel::new();
    let summary = parse_static_trace(src, &mut graph).unwrap();

    assert_eq!(summary.records, 2);
    assert_eq!(summary.overwritten, 1);
    let block = graph.block(BlockId(0)).unwrap();
    assert_eq!(block.function, "g");
    assert_eq!(block.successors, vec![BlockId(5)]);
    assert_eq!(block.instructions, vec![InstrId(2)]);
}

#[test]
fn test_exec_events_count_per_block() {
    let mut graph = two_block_graph();
    let report = parse_dynamic_trace("exec 0\nexec 0\nexec 1\n", &mut graph);

    assert!(report.is_clean());
    assert_eq!(report.exec_events, 3);
    assert_eq!(graph.block(BlockId(0)).unwrap().exec_count, 2);
    assert_eq!(graph.block(BlockId(1)).unwrap().exec_count, 1);
    assert_eq!(graph.total_execs(), 3);
}

#[test]
fn test_binop_events_fold_into_average() {
    let mut graph = two_block_graph();
    let report = parse_dynamic_trace("binop 0 10 2\nbinop 0 10 4\nbinop 0 10 6\n", &mut graph);

    assert_eq!(report.binop_events, 3);
    let instr = graph.instruction(InstrId(0x10)).unwrap();
    let stats = instr.binop.unwrap();
    assert_eq!(stats.count(), 3);
    assert_eq!(stats.sum(), 12);
    assert_eq!(instr.average(), 4.0);
}

#[test]
fn test_instruction_without_samples_averages_zero() {
    let graph = two_block_graph();
    let instr = graph.instruction(InstrId(0x20)).unwrap();
    assert!(!instr.is_binop());
    assert_eq!(instr.average(), 0.0);
}

#[test]
fn test_unknown_references_are_skipped() {
    let mut graph = two_block_graph();
    let src = "exec 0\nexec 9\nbinop 0 99 1\nbinop 1 10 1\nbinop 0 10 8\n";
    let report = parse_dynamic_trace(src, &mut graph);

    assert_eq!(report.exec_events, 1);
    assert_eq!(report.binop_events, 1);
    assert_eq!(
        report.issues,
        vec![
            DynamicTraceError::UnknownReference { line: 2, kind: ReferenceKind::Block, id: 9 },
            DynamicTraceError::UnknownReference { line: 3, kind: ReferenceKind::Instruction, id: 0x99 },
            // instruction 10 lives in block 0, not block 1
            DynamicTraceError::UnknownReference { line: 4, kind: ReferenceKind::Instruction, id: 0x10 },
        ]
    );
    assert_eq!(graph.total_execs(), 1);
    assert_eq!(graph.instruction(InstrId(0x10)).unwrap().average(), 8.0);
}

#[test]
fn test_malformed_events_are_skipped() {
    let mut graph = two_block_graph();
    let report = parse_dynamic_trace("\nexec\nhello 0\n\nexec 1\n", &mut graph);

    assert_eq!(report.lines, 3);
    assert_eq!(report.exec_events, 1);
    assert_eq!(report.issues.len(), 2);
    assert!(matches!(
        report.issues[0],
        DynamicTraceError::MalformedEvent { line: 2, .. }
    ));
}

#[test]
fn test_event_lines_round_trip_through_parser() {
    let mut graph = two_block_graph();
    let events = [
        DynamicEvent::Exec { block: BlockId(1) },
        DynamicEvent::BinOp { block: BlockId(0), instr: InstrId(0x10), result: -7 },
    ];
    let log: String = events.iter().map(|e| format!("{e}\n")).collect();

    let report = parse_dynamic_trace(&log, &mut graph);

    assert_eq!(report.applied(), 2);
    assert_eq!(graph.instruction(InstrId(0x10)).unwrap().average(), -7.0);
}
