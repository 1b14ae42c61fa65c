//! Dynamic trace parser.
//!
//! The dynamic trace is an append-only event log written by the runtime
//! loggers of the instrumented binary, one event per line:
//!
//! ```text
//! exec <blockId:hex>
//! binop <blockId:hex> <instrId:hex> <result:dec>
//! ```
//!
//! Events that cannot be applied are reported and skipped; the pass always
//! runs to the end of the input.

use crate::graph::{BlockId, GraphModel, InstrId};
use crate::parser::lexer::parse_hex;
use crate::utils::config::{BINOP_TAG, EXEC_TAG};
use crate::utils::error::{DynamicTraceError, ParseError, ReferenceKind};
use log::{debug, info, warn};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One runtime event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicEvent {
    /// A block started executing
    Exec { block: BlockId },

    /// A binary operation produced `result`
    BinOp {
        block: BlockId,
        instr: InstrId,
        result: i64,
    },
}

impl FromStr for DynamicEvent {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split_whitespace();
        let tag = fields.next().ok_or_else(|| "empty event".to_string())?;

        let event = match tag {
            EXEC_TAG => DynamicEvent::Exec {
                block: BlockId(hex_field(fields.next(), "block id")?),
            },
            BINOP_TAG => {
                let block = BlockId(hex_field(fields.next(), "block id")?);
                let instr = InstrId(hex_field(fields.next(), "instruction id")?);
                let raw = fields.next().ok_or_else(|| "missing result".to_string())?;
                let result = raw
                    .parse::<i64>()
                    .map_err(|e| format!("invalid result '{}': {}", raw, e))?;
                DynamicEvent::BinOp { block, instr, result }
            }
            other => return Err(format!("unknown event tag '{}'", other)),
        };

        if let Some(extra) = fields.next() {
            return Err(format!("unexpected trailing field '{}'", extra));
        }

        Ok(event)
    }
}

impl fmt::Display for DynamicEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicEvent::Exec { block } => write!(f, "{} {:x}", EXEC_TAG, block),
            DynamicEvent::BinOp { block, instr, result } => {
                write!(f, "{} {:x} {:x} {}", BINOP_TAG, block, instr, result)
            }
        }
    }
}

fn hex_field(field: Option<&str>, name: &str) -> Result<u64, String> {
    let raw = field.ok_or_else(|| format!("missing {}", name))?;
    parse_hex(raw).ok_or_else(|| format!("invalid {} '{}'", name, raw))
}

/// Outcome of one dynamic pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicTraceReport {
    /// Non-blank lines seen
    pub lines: usize,

    pub exec_events: u64,

    pub binop_events: u64,

    /// Events that were reported and skipped
    pub issues: Vec<DynamicTraceError>,
}

impl DynamicTraceReport {
    pub fn applied(&self) -> u64 {
        self.exec_events + self.binop_events
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Apply one event to the graph
///
/// **Public** - used by `parse_dynamic_trace`, handy for replaying events
///
/// A binop must name an instruction of the block it names.
///
/// # Errors
/// * `DynamicTraceError::UnknownReference` - block or instruction not in the graph
pub fn apply_event(
    graph: &mut GraphModel,
    event: &DynamicEvent,
    line: usize,
) -> Result<(), DynamicTraceError> {
    match *event {
        DynamicEvent::Exec { block } => {
            if !graph.record_exec(block) {
                return Err(DynamicTraceError::UnknownReference {
                    line,
                    kind: ReferenceKind::Block,
                    id: block.0,
                });
            }
        }
        DynamicEvent::BinOp { block, instr, result } => {
            let member = graph
                .block(block)
                .ok_or(DynamicTraceError::UnknownReference {
                    line,
                    kind: ReferenceKind::Block,
                    id: block.0,
                })?
                .contains(instr);

            let instruction = graph
                .instruction_mut(instr)
                .filter(|_| member)
                .ok_or(DynamicTraceError::UnknownReference {
                    line,
                    kind: ReferenceKind::Instruction,
                    id: instr.0,
                })?;
            instruction.record_binop(result);
        }
    }
    Ok(())
}

/// Parse dynamic trace text, updating `graph` in place
///
/// **Public** - main entry point for the dynamic pass
///
/// # Returns
/// Event counts and every skipped event
pub fn parse_dynamic_trace(src: &str, graph: &mut GraphModel) -> DynamicTraceReport {
    let mut report = DynamicTraceReport::default();

    for (index, raw) in src.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }
        report.lines += 1;

        let event = match raw.parse::<DynamicEvent>() {
            Ok(event) => event,
            Err(reason) => {
                let issue = DynamicTraceError::MalformedEvent { line, reason };
                warn!("{}", issue);
                report.issues.push(issue);
                continue;
            }
        };

        match apply_event(graph, &event, line) {
            Ok(()) => match event {
                DynamicEvent::Exec { .. } => report.exec_events += 1,
                DynamicEvent::BinOp { .. } => report.binop_events += 1,
            },
            Err(issue) => {
                warn!("{}, event skipped", issue);
                report.issues.push(issue);
            }
        }
    }

    debug!(
        "Dynamic pass: {} exec, {} binop, {} skipped",
        report.exec_events,
        report.binop_events,
        report.issues.len()
    );

    report
}

/// Read and parse a dynamic trace file into `graph`
///
/// **Public** - used by the visualise command
///
/// # Errors
/// * `ParseError::Io` - the file cannot be read
pub fn parse_dynamic_file(
    path: impl AsRef<Path>,
    graph: &mut GraphModel,
) -> Result<DynamicTraceReport, ParseError> {
    let path = path.as_ref();
    info!("Reading dynamic trace: {}", path.display());
    let src = std::fs::read_to_string(path)?;
    let report = parse_dynamic_trace(&src, graph);
    info!(
        "Dynamic trace: {} events applied, {} skipped",
        report.applied(),
        report.issues.len()
    );
    Ok(report)
}
